// Copyright 2026 the Gridflip Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated grid timeline that exercises the tracing and diagnostics pipeline.
//!
//! Draws a pass, interrupts it with a burst of resizes, and lets the
//! debounced redraw run to completion on a [`ManualClock`]. Events go to
//! both a [`PrettyPrintSink`](gridflip_debug::pretty::PrettyPrintSink) and a
//! [`RecorderSink`](gridflip_debug::recorder::RecorderSink), and the
//! recording is exported as a Chrome trace JSON file.

use std::fs::File;
use std::io::BufWriter;

use gridflip_core::atlas::ImageAtlas;
use gridflip_core::clock::{Clock, ManualClock};
use gridflip_core::config::GridConfig;
use gridflip_core::events::LifecycleEvent;
use gridflip_core::grid::Grid;
use gridflip_core::time::{Delay, LogicalTime};
use gridflip_core::trace::{
    CellAssignedEvent, CellMaterializedEvent, CellRevealedEvent, GeometryEvent, PassBeginEvent,
    PassCompleteEvent, RejectedStepEvent, ResizeEvent, StaleActionEvent, TraceSink, Tracer,
    TriggerEvent,
};
use kurbo::Size;

use gridflip_debug::pretty::PrettyPrintSink;
use gridflip_debug::recorder::RecorderSink;

/// Viewport of the first pass.
const DESKTOP: Size = Size::new(1280.0, 720.0);

/// Viewports reported by the resize burst, 50ms apart.
const BURST: [Size; 3] = [
    Size::new(1100.0, 720.0),
    Size::new(900.0, 700.0),
    Size::new(768.0, 1024.0),
];

/// Sends every event to two sinks.
struct Tee<'a> {
    a: &'a mut dyn TraceSink,
    b: &'a mut dyn TraceSink,
}

impl TraceSink for Tee<'_> {
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        self.a.on_pass_begin(e);
        self.b.on_pass_begin(e);
    }

    fn on_geometry(&mut self, e: &GeometryEvent) {
        self.a.on_geometry(e);
        self.b.on_geometry(e);
    }

    fn on_cell_assigned(&mut self, e: &CellAssignedEvent) {
        self.a.on_cell_assigned(e);
        self.b.on_cell_assigned(e);
    }

    fn on_cell_materialized(&mut self, e: &CellMaterializedEvent) {
        self.a.on_cell_materialized(e);
        self.b.on_cell_materialized(e);
    }

    fn on_cell_revealed(&mut self, e: &CellRevealedEvent) {
        self.a.on_cell_revealed(e);
        self.b.on_cell_revealed(e);
    }

    fn on_pass_complete(&mut self, e: &PassCompleteEvent) {
        self.a.on_pass_complete(e);
        self.b.on_pass_complete(e);
    }

    fn on_stale_action(&mut self, e: &StaleActionEvent) {
        self.a.on_stale_action(e);
        self.b.on_stale_action(e);
    }

    fn on_rejected_step(&mut self, e: &RejectedStepEvent) {
        self.a.on_rejected_step(e);
        self.b.on_rejected_step(e);
    }

    fn on_resize(&mut self, e: &ResizeEvent) {
        self.a.on_resize(e);
        self.b.on_resize(e);
    }

    fn on_trigger(&mut self, e: &TriggerEvent) {
        self.a.on_trigger(e);
        self.b.on_trigger(e);
    }
}

/// Runs everything due up to `until`, one wakeup at a time.
fn run_until(grid: &mut Grid, clock: &ManualClock, until: LogicalTime, sink: &mut dyn TraceSink) {
    while let Some(t) = grid.next_wakeup().filter(|&t| t <= until) {
        clock.set(t);
        grid.advance_traced(clock.now(), &mut Tracer::new(sink));
        let _ = grid.evaluate();
    }
    clock.set(until);
}

fn main() {
    // -- sinks -------------------------------------------------------------
    let mut pretty = PrettyPrintSink::new(Box::new(std::io::stdout())).without_cells();
    let mut recorder = RecorderSink::new();

    // -- grid --------------------------------------------------------------
    let atlas =
        ImageAtlas::with_default_slicing("tiles.jpg").expect("default atlas slicing is valid");
    let config = GridConfig::staggered().with_debug(true);
    let mut grid = Grid::new(config, atlas).expect("stock configuration is valid");
    for event in [LifecycleEvent::DrawStart, LifecycleEvent::DrawComplete] {
        grid.events_mut().on(event, |event, pass| println!("<{event}> {pass}"));
    }

    let clock = ManualClock::new(LogicalTime::ZERO);
    {
        let mut tee = Tee {
            a: &mut pretty,
            b: &mut recorder,
        };

        // 1. First pass, interrupted partway through its stagger.
        grid.draw_traced(clock.now(), DESKTOP, &mut Tracer::new(&mut tee));
        run_until(&mut grid, &clock, LogicalTime::from_millis(300), &mut tee);

        // 2. Resize burst; only the last viewport is drawn.
        for viewport in BURST {
            let _ = grid.resize_traced(clock.now(), viewport, &mut Tracer::new(&mut tee));
            clock.advance(Delay::from_millis(50));
        }

        // 3. The debounced redraw supersedes the first pass and completes.
        while !grid.is_complete() || grid.redraw_pending() {
            let Some(t) = grid.next_wakeup() else {
                break;
            };
            run_until(&mut grid, &clock, t, &mut tee);
        }
    }

    // -- export Chrome trace -----------------------------------------------
    let path = "trace.json";
    let file = File::create(path).expect("failed to create trace.json");
    let mut writer = BufWriter::new(file);
    gridflip_debug::chrome::export(recorder.as_bytes(), &mut writer)
        .expect("failed to write Chrome trace");

    println!(
        "Wrote {path} ({} passes, finished at {:.1}ms)",
        grid.current_pass().get(),
        clock.now().as_millis_f64()
    );
}
