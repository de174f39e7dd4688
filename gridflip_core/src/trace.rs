// Copyright 2026 the Gridflip Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for draw passes.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! grid calls as a pass unfolds. All method bodies default to no-ops, so
//! implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. The grid hands events
//! to it only when [`GridConfig::debug`](crate::config::GridConfig::debug)
//! is set; tracing never changes timing or layout.

use kurbo::Size;

use crate::geometry::GridGeometry;
use crate::reveal::PassToken;
use crate::tile::{Placement, TileStep, TransitionError};
use crate::time::{Delay, LogicalTime};

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a draw pass starts.
#[derive(Clone, Copy, Debug)]
pub struct PassBeginEvent {
    /// Token of the new pass.
    pub pass: PassToken,
    /// Pass that was superseded, if one was still in flight.
    pub superseded: Option<PassToken>,
    /// Time the pass started.
    pub at: LogicalTime,
    /// Viewport the pass lays out for.
    pub viewport: Size,
}

/// Emitted once the pass geometry is known.
#[derive(Clone, Copy, Debug)]
pub struct GeometryEvent {
    /// Pass the geometry belongs to.
    pub pass: PassToken,
    /// Computed grid.
    pub geometry: GridGeometry,
    /// Slices available in the atlas.
    pub slice_count: u32,
}

/// Emitted for every cell submitted to the scheduler.
#[derive(Clone, Copy, Debug)]
pub struct CellAssignedEvent {
    /// Pass the cell belongs to.
    pub pass: PassToken,
    /// Cell index.
    pub cell: u32,
    /// Atlas slice assigned.
    pub slice: u32,
    /// When the cell will materialize.
    pub due: LogicalTime,
}

/// Emitted when a cell's tile is created.
#[derive(Clone, Copy, Debug)]
pub struct CellMaterializedEvent {
    /// Pass the cell belongs to.
    pub pass: PassToken,
    /// Cell index.
    pub cell: u32,
    /// Atlas slice shown.
    pub slice: u32,
    /// Time the step was due.
    pub at: LogicalTime,
    /// How the tile entered the container.
    pub placement: Placement,
    /// Whether the tile starts out flipped.
    pub flipped: bool,
}

/// Emitted when a cell is revealed.
#[derive(Clone, Copy, Debug)]
pub struct CellRevealedEvent {
    /// Pass the cell belongs to.
    pub pass: PassToken,
    /// Cell index.
    pub cell: u32,
    /// Time the step was due.
    pub at: LogicalTime,
    /// Revealed count after this step.
    pub revealed: u32,
    /// Cells in the pass.
    pub cell_count: u32,
}

/// Emitted once per pass, when the last cell is revealed.
#[derive(Clone, Copy, Debug)]
pub struct PassCompleteEvent {
    /// The completed pass.
    pub pass: PassToken,
    /// Time of the final reveal.
    pub at: LogicalTime,
    /// Cells revealed.
    pub cell_count: u32,
    /// Time from pass start to completion.
    pub elapsed: Delay,
}

/// Emitted when an action from a superseded pass fires and is ignored.
#[derive(Clone, Copy, Debug)]
pub struct StaleActionEvent {
    /// Pass the action was scheduled for.
    pub pass: PassToken,
    /// Pass current when it fired.
    pub current: PassToken,
    /// Target cell.
    pub cell: u32,
    /// Step that was skipped.
    pub step: TileStep,
    /// Time the action was due.
    pub at: LogicalTime,
}

/// Emitted when a step does not apply to a cell's state.
#[derive(Clone, Copy, Debug)]
pub struct RejectedStepEvent {
    /// Pass the action belongs to.
    pub pass: PassToken,
    /// Target cell.
    pub cell: u32,
    /// The refused transition.
    pub error: TransitionError,
    /// Time the action was due.
    pub at: LogicalTime,
}

/// Emitted for every resize notification.
#[derive(Clone, Copy, Debug)]
pub struct ResizeEvent {
    /// Time of the notification.
    pub at: LogicalTime,
    /// Reported viewport.
    pub viewport: Size,
    /// When the redraw is now due.
    pub until: LogicalTime,
    /// Whether an already pending redraw was pushed back.
    pub rescheduled: bool,
    /// Tiles hidden by this notification.
    pub hidden: usize,
}

/// Emitted when the debounced redraw fires.
#[derive(Clone, Copy, Debug)]
pub struct TriggerEvent {
    /// Time the trigger was polled.
    pub at: LogicalTime,
    /// Viewport the redraw uses.
    pub viewport: Size,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the grid.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a draw pass starts.
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        _ = e;
    }

    /// Called with the geometry of a new pass.
    fn on_geometry(&mut self, e: &GeometryEvent) {
        _ = e;
    }

    /// Called for each cell submitted to the scheduler.
    fn on_cell_assigned(&mut self, e: &CellAssignedEvent) {
        _ = e;
    }

    /// Called when a cell's tile is created.
    fn on_cell_materialized(&mut self, e: &CellMaterializedEvent) {
        _ = e;
    }

    /// Called when a cell is revealed.
    fn on_cell_revealed(&mut self, e: &CellRevealedEvent) {
        _ = e;
    }

    /// Called when a pass completes.
    fn on_pass_complete(&mut self, e: &PassCompleteEvent) {
        _ = e;
    }

    /// Called when an action of a superseded pass is ignored.
    fn on_stale_action(&mut self, e: &StaleActionEvent) {
        _ = e;
    }

    /// Called when a step is refused by the cell state machine.
    fn on_rejected_step(&mut self, e: &RejectedStepEvent) {
        _ = e;
    }

    /// Called for every resize notification.
    fn on_resize(&mut self, e: &ResizeEvent) {
        _ = e;
    }

    /// Called when the debounced redraw fires.
    fn on_trigger(&mut self, e: &TriggerEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// Each method checks the inner `Option` (one branch) before dispatching.
pub struct Tracer<'a> {
    sink: Option<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        Self { sink: Some(sink) }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self { sink: None }
    }

    /// Returns `true` if events reach a sink.
    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    /// Emits a [`PassBeginEvent`].
    #[inline]
    pub fn pass_begin(&mut self, e: &PassBeginEvent) {
        if let Some(s) = &mut self.sink {
            s.on_pass_begin(e);
        }
    }

    /// Emits a [`GeometryEvent`].
    #[inline]
    pub fn geometry(&mut self, e: &GeometryEvent) {
        if let Some(s) = &mut self.sink {
            s.on_geometry(e);
        }
    }

    /// Emits a [`CellAssignedEvent`].
    #[inline]
    pub fn cell_assigned(&mut self, e: &CellAssignedEvent) {
        if let Some(s) = &mut self.sink {
            s.on_cell_assigned(e);
        }
    }

    /// Emits a [`CellMaterializedEvent`].
    #[inline]
    pub fn cell_materialized(&mut self, e: &CellMaterializedEvent) {
        if let Some(s) = &mut self.sink {
            s.on_cell_materialized(e);
        }
    }

    /// Emits a [`CellRevealedEvent`].
    #[inline]
    pub fn cell_revealed(&mut self, e: &CellRevealedEvent) {
        if let Some(s) = &mut self.sink {
            s.on_cell_revealed(e);
        }
    }

    /// Emits a [`PassCompleteEvent`].
    #[inline]
    pub fn pass_complete(&mut self, e: &PassCompleteEvent) {
        if let Some(s) = &mut self.sink {
            s.on_pass_complete(e);
        }
    }

    /// Emits a [`StaleActionEvent`].
    #[inline]
    pub fn stale_action(&mut self, e: &StaleActionEvent) {
        if let Some(s) = &mut self.sink {
            s.on_stale_action(e);
        }
    }

    /// Emits a [`RejectedStepEvent`].
    #[inline]
    pub fn rejected_step(&mut self, e: &RejectedStepEvent) {
        if let Some(s) = &mut self.sink {
            s.on_rejected_step(e);
        }
    }

    /// Emits a [`ResizeEvent`].
    #[inline]
    pub fn resize(&mut self, e: &ResizeEvent) {
        if let Some(s) = &mut self.sink {
            s.on_resize(e);
        }
    }

    /// Emits a [`TriggerEvent`].
    #[inline]
    pub fn trigger(&mut self, e: &TriggerEvent) {
        if let Some(s) = &mut self.sink {
            s.on_trigger(e);
        }
    }
}
