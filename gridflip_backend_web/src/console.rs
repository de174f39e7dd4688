// Copyright 2026 the Gridflip Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser console diagnostics.

use alloc::format;
use alloc::string::String;

use gridflip_core::trace::{
    CellAssignedEvent, GeometryEvent, PassBeginEvent, PassCompleteEvent, RejectedStepEvent,
    ResizeEvent, StaleActionEvent, TraceSink, TriggerEvent,
};
use wasm_bindgen::JsValue;

/// A [`TraceSink`] that writes one `console.log` line per event.
///
/// Per-cell reveal and materialize events are left out; geometry and cell
/// assignment are what a grid in debug mode reports.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    /// Logs the atlas a mount is about to draw from.
    pub fn atlas(&mut self, url: &str, slice_count: u32, width: u32) {
        log(&format!(
            "[gridflip] images url={url} total={slice_count} totalWidth={width}"
        ));
    }
}

fn log(line: &str) {
    web_sys::console::log_1(&JsValue::from_str(line));
}

fn viewport(w: f64, h: f64) -> String {
    format!("{w}x{h}")
}

impl TraceSink for ConsoleSink {
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        match e.superseded {
            Some(old) => log(&format!(
                "[gridflip] draw {} at {:.1}ms viewport={} (supersedes {})",
                e.pass,
                e.at.as_millis_f64(),
                viewport(e.viewport.width, e.viewport.height),
                old
            )),
            None => log(&format!(
                "[gridflip] draw {} at {:.1}ms viewport={}",
                e.pass,
                e.at.as_millis_f64(),
                viewport(e.viewport.width, e.viewport.height)
            )),
        }
    }

    fn on_geometry(&mut self, e: &GeometryEvent) {
        log(&format!(
            "[gridflip] dimensions columns={} rows={} cells={}",
            e.geometry.columns, e.geometry.rows, e.geometry.cell_count
        ));
    }

    fn on_cell_assigned(&mut self, e: &CellAssignedEvent) {
        log(&format!(
            "[gridflip] drawn cell={} image={}",
            e.cell, e.slice
        ));
    }

    fn on_pass_complete(&mut self, e: &PassCompleteEvent) {
        log(&format!(
            "[gridflip] complete {} cells={} in {}ms",
            e.pass,
            e.cell_count,
            e.elapsed.as_millis()
        ));
    }

    fn on_stale_action(&mut self, e: &StaleActionEvent) {
        log(&format!(
            "[gridflip] stale {:?} cell={} from {} (current {})",
            e.step, e.cell, e.pass, e.current
        ));
    }

    fn on_rejected_step(&mut self, e: &RejectedStepEvent) {
        log(&format!("[gridflip] cell={}: {}", e.cell, e.error));
    }

    fn on_resize(&mut self, e: &ResizeEvent) {
        log(&format!(
            "[gridflip] resize viewport={} hidden={} redraw at {:.1}ms",
            viewport(e.viewport.width, e.viewport.height),
            e.hidden,
            e.until.as_millis_f64()
        ));
    }

    fn on_trigger(&mut self, e: &TriggerEvent) {
        log(&format!(
            "[gridflip] redraw viewport={}",
            viewport(e.viewport.width, e.viewport.height)
        ));
    }
}
