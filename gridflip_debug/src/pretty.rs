// Copyright 2026 the Gridflip Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Times are
//! printed in milliseconds of logical time.

use std::io::Write;

use gridflip_core::tile::{Placement, TileStep};
use gridflip_core::trace::{
    CellAssignedEvent, CellMaterializedEvent, CellRevealedEvent, GeometryEvent, PassBeginEvent,
    PassCompleteEvent, RejectedStepEvent, ResizeEvent, StaleActionEvent, TraceSink, TriggerEvent,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    cells: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("cells", &self.cells)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self::with_writer(writer)
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            cells: true,
        }
    }

    /// Leaves out the per-cell materialize and reveal lines.
    #[must_use]
    pub fn without_cells(mut self) -> Self {
        self.cells = false;
        self
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn step_name(step: TileStep) -> &'static str {
    match step {
        TileStep::Materialize => "materialize",
        TileStep::Reveal => "reveal",
    }
}

fn placement_name(placement: Placement) -> &'static str {
    match placement {
        Placement::Insert => "insert",
        Placement::Replace => "replace",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        let _ = write!(
            self.writer,
            "[pass] {} at {:.1}ms viewport={}x{}",
            e.pass,
            e.at.as_millis_f64(),
            e.viewport.width,
            e.viewport.height,
        );
        if let Some(old) = e.superseded {
            let _ = write!(self.writer, " supersedes={old}");
        }
        let _ = writeln!(self.writer);
    }

    fn on_geometry(&mut self, e: &GeometryEvent) {
        let g = &e.geometry;
        let _ = writeln!(
            self.writer,
            "[geometry] {} columns={} rows={} cells={} container={}x{} slices={}",
            e.pass,
            g.columns,
            g.rows,
            g.cell_count,
            g.container.width,
            g.container.height,
            e.slice_count,
        );
    }

    fn on_cell_assigned(&mut self, e: &CellAssignedEvent) {
        if !self.cells {
            return;
        }
        let _ = writeln!(
            self.writer,
            "[cell] {} cell={} slice={} due={:.1}ms",
            e.pass,
            e.cell,
            e.slice,
            e.due.as_millis_f64(),
        );
    }

    fn on_cell_materialized(&mut self, e: &CellMaterializedEvent) {
        if !self.cells {
            return;
        }
        let _ = writeln!(
            self.writer,
            "[materialize] {} cell={} slice={} {} at {:.1}ms{}",
            e.pass,
            e.cell,
            e.slice,
            placement_name(e.placement),
            e.at.as_millis_f64(),
            if e.flipped { " flipped" } else { "" },
        );
    }

    fn on_cell_revealed(&mut self, e: &CellRevealedEvent) {
        if !self.cells {
            return;
        }
        let _ = writeln!(
            self.writer,
            "[reveal] {} cell={} at {:.1}ms ({}/{})",
            e.pass,
            e.cell,
            e.at.as_millis_f64(),
            e.revealed,
            e.cell_count,
        );
    }

    fn on_pass_complete(&mut self, e: &PassCompleteEvent) {
        let _ = writeln!(
            self.writer,
            "[complete] {} cells={} at {:.1}ms elapsed={}ms",
            e.pass,
            e.cell_count,
            e.at.as_millis_f64(),
            e.elapsed.as_millis(),
        );
    }

    fn on_stale_action(&mut self, e: &StaleActionEvent) {
        let _ = writeln!(
            self.writer,
            "[stale] {} {} cell={} at {:.1}ms current={}",
            e.pass,
            step_name(e.step),
            e.cell,
            e.at.as_millis_f64(),
            e.current,
        );
    }

    fn on_rejected_step(&mut self, e: &RejectedStepEvent) {
        let _ = writeln!(
            self.writer,
            "[rejected] {} cell={} at {:.1}ms: {}",
            e.pass,
            e.cell,
            e.at.as_millis_f64(),
            e.error,
        );
    }

    fn on_resize(&mut self, e: &ResizeEvent) {
        let _ = writeln!(
            self.writer,
            "[resize] at {:.1}ms viewport={}x{} hidden={} redraw={:.1}ms{}",
            e.at.as_millis_f64(),
            e.viewport.width,
            e.viewport.height,
            e.hidden,
            e.until.as_millis_f64(),
            if e.rescheduled { " (rescheduled)" } else { "" },
        );
    }

    fn on_trigger(&mut self, e: &TriggerEvent) {
        let _ = writeln!(
            self.writer,
            "[trigger] at {:.1}ms viewport={}x{}",
            e.at.as_millis_f64(),
            e.viewport.width,
            e.viewport.height,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridflip_core::reveal::PassToken;
    use gridflip_core::time::LogicalTime;
    use kurbo::Size;

    #[test]
    fn pretty_print_pass_begin() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_pass_begin(&PassBeginEvent {
            pass: PassToken::FIRST.next(),
            superseded: Some(PassToken::FIRST),
            at: LogicalTime::from_millis(12),
            viewport: Size::new(800.0, 600.0),
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(output, "[pass] #2 at 12.0ms viewport=800x600 supersedes=#1\n");
    }

    #[test]
    fn cell_lines_can_be_left_out() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new()).without_cells();
        sink.on_cell_revealed(&CellRevealedEvent {
            pass: PassToken::FIRST,
            cell: 3,
            at: LogicalTime::from_millis(715),
            revealed: 4,
            cell_count: 51,
        });
        sink.on_trigger(&TriggerEvent {
            at: LogicalTime::from_millis(300),
            viewport: Size::new(600.0, 300.0),
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert!(!output.contains("[reveal]"), "got: {output}");
        assert!(output.contains("[trigger] at 300.0ms"), "got: {output}");
    }
}
