// Copyright 2026 the Gridflip Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! Each pass gets its own track (`tid` = pass token). A cell shows up as a
//! complete span from materialize to reveal, so the stagger reads as a
//! staircase in the viewer.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::collections::HashMap;
use std::io::{self, Write};

use serde_json::{Value, json};

use gridflip_core::time::LogicalTime;

use crate::recorder::{RecordedEvent, decode};

/// Track that resize and trigger instants are placed on.
const VIEWPORT_TID: u64 = 0;

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
/// A materialized cell whose reveal never arrives (its pass was superseded)
/// is exported without a span.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();
    // (pass, cell) → materialize time
    let mut open: HashMap<(u64, u32), LogicalTime> = HashMap::new();
    // Geometry has no time of its own; it sits at its pass's start.
    let mut pass_ts = 0.0;

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::PassBegin(e) => {
                pass_ts = e.at.as_millis_f64() * 1000.0;
                events.push(json!({
                    "ph": "i",
                    "name": "PassBegin",
                    "cat": "Pass",
                    "ts": pass_ts,
                    "pid": 0,
                    "tid": e.pass.get(),
                    "s": "g",
                    "args": {
                        "pass": e.pass.get(),
                        "superseded": e.superseded.map(|p| p.get()),
                        "viewport": [e.viewport.width, e.viewport.height],
                    }
                }));
            }
            RecordedEvent::Geometry(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Geometry",
                    "cat": "Pass",
                    "ts": pass_ts,
                    "pid": 0,
                    "tid": e.pass.get(),
                    "s": "t",
                    "args": {
                        "columns": e.geometry.columns,
                        "rows": e.geometry.rows,
                        "cells": e.geometry.cell_count,
                        "slices": e.slice_count,
                    }
                }));
            }
            RecordedEvent::CellAssigned(_) => {}
            RecordedEvent::CellMaterialized(e) => {
                open.insert((e.pass.get(), e.cell), e.at);
            }
            RecordedEvent::CellRevealed(e) => {
                let Some(start) = open.remove(&(e.pass.get(), e.cell)) else {
                    continue;
                };
                events.push(json!({
                    "ph": "X",
                    "name": format!("cell {}", e.cell),
                    "cat": "Cell",
                    "ts": start.as_millis_f64() * 1000.0,
                    "dur": e.at.saturating_since(start).micros(),
                    "pid": 0,
                    "tid": e.pass.get(),
                    "args": {
                        "cell": e.cell,
                        "revealed": e.revealed,
                        "cell_count": e.cell_count,
                    }
                }));
            }
            RecordedEvent::PassComplete(e) => {
                let start = LogicalTime(e.at.micros().saturating_sub(e.elapsed.micros()));
                events.push(json!({
                    "ph": "X",
                    "name": "Pass",
                    "cat": "Pass",
                    "ts": start.as_millis_f64() * 1000.0,
                    "dur": e.elapsed.micros(),
                    "pid": 0,
                    "tid": e.pass.get(),
                    "args": {
                        "pass": e.pass.get(),
                        "cell_count": e.cell_count,
                    }
                }));
            }
            RecordedEvent::StaleAction(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "StaleAction",
                    "cat": "Pass",
                    "ts": e.at.as_millis_f64() * 1000.0,
                    "pid": 0,
                    "tid": e.pass.get(),
                    "s": "t",
                    "args": {
                        "cell": e.cell,
                        "step": format!("{:?}", e.step),
                        "current": e.current.get(),
                    }
                }));
            }
            RecordedEvent::RejectedStep(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "RejectedStep",
                    "cat": "Cell",
                    "ts": e.at.as_millis_f64() * 1000.0,
                    "pid": 0,
                    "tid": e.pass.get(),
                    "s": "t",
                    "args": {
                        "cell": e.cell,
                        "error": e.error.to_string(),
                    }
                }));
            }
            RecordedEvent::Resize(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Resize",
                    "cat": "Viewport",
                    "ts": e.at.as_millis_f64() * 1000.0,
                    "pid": 0,
                    "tid": VIEWPORT_TID,
                    "s": "p",
                    "args": {
                        "viewport": [e.viewport.width, e.viewport.height],
                        "hidden": e.hidden,
                        "until": e.until.as_millis_f64(),
                        "rescheduled": e.rescheduled,
                    }
                }));
            }
            RecordedEvent::Trigger(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Trigger",
                    "cat": "Viewport",
                    "ts": e.at.as_millis_f64() * 1000.0,
                    "pid": 0,
                    "tid": VIEWPORT_TID,
                    "s": "p",
                    "args": {
                        "viewport": [e.viewport.width, e.viewport.height],
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use gridflip_core::atlas::ImageAtlas;
    use gridflip_core::config::GridConfig;
    use gridflip_core::grid::Grid;
    use gridflip_core::trace::Tracer;
    use kurbo::Size;

    fn ms(v: u64) -> LogicalTime {
        LogicalTime::from_millis(v)
    }

    #[test]
    fn export_produces_cell_spans() {
        let mut rec = RecorderSink::new();
        let atlas = ImageAtlas::new("t.jpg", 640, 128).unwrap();
        let mut grid = Grid::new(GridConfig::staggered().with_debug(true), atlas).unwrap();
        grid.draw_traced(ms(10), Size::new(200.0, 100.0), &mut Tracer::new(&mut rec));
        grid.advance_traced(ms(1000), &mut Tracer::new(&mut rec));

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&String::from_utf8(out).unwrap()).unwrap();

        // begin + geometry + 3 cell spans + pass span
        assert_eq!(parsed.len(), 6);
        assert_eq!(parsed[0]["name"], "PassBegin");
        assert_eq!(parsed[1]["name"], "Geometry");
        assert_eq!(parsed[1]["ts"], parsed[0]["ts"]);

        let cells: Vec<_> = parsed.iter().filter(|e| e["cat"] == "Cell").collect();
        assert_eq!(cells.len(), 3);
        assert!(cells.iter().all(|e| e["ph"] == "X" && e["dur"] == 700_000));
        assert_eq!(cells[1]["ts"], 15_000.0);

        let pass = parsed.last().unwrap();
        assert_eq!(pass["name"], "Pass");
        assert_eq!(pass["ts"], 10_000.0);
        assert_eq!(pass["dur"], 710_000);
    }

    #[test]
    fn superseded_cells_have_no_span() {
        let mut rec = RecorderSink::new();
        let atlas = ImageAtlas::new("t.jpg", 640, 128).unwrap();
        let mut grid = Grid::new(GridConfig::staggered().with_debug(true), atlas).unwrap();
        let viewport = Size::new(200.0, 100.0);
        grid.draw_traced(ms(0), viewport, &mut Tracer::new(&mut rec));
        grid.advance_traced(ms(100), &mut Tracer::new(&mut rec));
        grid.draw_traced(ms(100), viewport, &mut Tracer::new(&mut rec));
        grid.advance_traced(ms(2000), &mut Tracer::new(&mut rec));

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&String::from_utf8(out).unwrap()).unwrap();

        let stale = parsed.iter().filter(|e| e["name"] == "StaleAction").count();
        assert_eq!(stale, 3);
        let first_pass_cells = parsed
            .iter()
            .filter(|e| e["cat"] == "Cell" && e["tid"] == 1)
            .count();
        assert_eq!(first_pass_cells, 0);
        let completions: Vec<_> = parsed.iter().filter(|e| e["name"] == "Pass").collect();
        assert_eq!(completions.len(), 1);
        assert_eq!(completions[0]["tid"], 2);
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert!(parsed.is_empty());
    }
}
