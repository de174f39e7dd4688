// Copyright 2026 the Gridflip Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The draw orchestrator.
//!
//! [`Grid`] ties the pieces together. A draw pass:
//!
//! 1. computes the [`GridGeometry`] for the viewport,
//! 2. starts a new pass (fresh [`PassToken`], revealed count reset),
//! 3. emits [`LifecycleEvent::DrawStart`],
//! 4. records the container layout for the presenter,
//! 5. submits every cell, in ascending order, with its atlas slice.
//!
//! Nothing else happens until [`Grid::advance`] is called. `advance` is the
//! one loop over logical time: it fires the debounced redraw when it comes
//! due and every per-cell step in `(due, insertion)` order, applies them to
//! the [`TileStore`], and emits [`LifecycleEvent::DrawComplete`] when the
//! last cell of the current pass is revealed.

use kurbo::Size;

use crate::atlas::ImageAtlas;
use crate::config::{ConfigError, GridConfig};
use crate::debounce::{ResizeDebouncer, Suppress};
use crate::events::{EventBus, LifecycleEvent};
use crate::geometry::GridGeometry;
use crate::reveal::{Fired, PassToken, RevealAction, RevealScheduler};
use crate::tile::{Tile, TileChanges, TileStore};
use crate::time::LogicalTime;
use crate::timer::TimerQueue;
use crate::trace::{
    CellAssignedEvent, CellMaterializedEvent, CellRevealedEvent, GeometryEvent, PassBeginEvent,
    PassCompleteEvent, RejectedStepEvent, ResizeEvent, StaleActionEvent, TraceSink, Tracer,
    TriggerEvent,
};

/// What a call to [`Grid::advance`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Advanced {
    /// Tiles materialized.
    pub materialized: u32,
    /// Cells revealed.
    pub revealed: u32,
    /// Actions of superseded passes skipped.
    pub stale: u32,
    /// Steps refused by the cell state machine.
    pub rejected: u32,
    /// Debounced redraws started.
    pub redraws: u32,
    /// Passes completed.
    pub completions: u32,
}

impl Advanced {
    /// Total actions and triggers handled.
    #[must_use]
    pub const fn handled(&self) -> u32 {
        self.materialized + self.revealed + self.stale + self.rejected + self.redraws
    }
}

/// A responsive tile grid with a staggered flip reveal.
pub struct Grid {
    config: GridConfig,
    atlas: ImageAtlas,
    geometry: GridGeometry,
    scheduler: RevealScheduler,
    actions: TimerQueue<RevealAction>,
    debouncer: ResizeDebouncer,
    tiles: TileStore,
    events: EventBus,
    pass_started: LogicalTime,
}

impl core::fmt::Debug for Grid {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Grid")
            .field("config", &self.config)
            .field("geometry", &self.geometry)
            .field("pass", &self.scheduler.current_pass())
            .field("revealed", &self.scheduler.revealed_count())
            .field("pending_actions", &self.actions.len())
            .finish_non_exhaustive()
    }
}

impl Grid {
    /// Creates a grid over `atlas`. No pass runs until [`draw`](Self::draw).
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] from [`GridConfig::validate`].
    pub fn new(config: GridConfig, atlas: ImageAtlas) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            geometry: GridGeometry::degenerate(config.tile_size),
            debouncer: ResizeDebouncer::new(config.quiet_period),
            config,
            atlas,
            scheduler: RevealScheduler::new(),
            actions: TimerQueue::new(),
            tiles: TileStore::new(),
            events: EventBus::new(),
            pass_started: LogicalTime::ZERO,
        })
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &GridConfig {
        &self.config
    }

    /// The atlas tiles are cut from.
    #[must_use]
    pub const fn atlas(&self) -> &ImageAtlas {
        &self.atlas
    }

    /// Geometry of the current pass.
    #[must_use]
    pub const fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// Token of the current pass ([`PassToken::NONE`] before the first draw).
    #[must_use]
    pub const fn current_pass(&self) -> PassToken {
        self.scheduler.current_pass()
    }

    /// Cells revealed in the current pass.
    #[must_use]
    pub const fn revealed_count(&self) -> u32 {
        self.scheduler.revealed_count()
    }

    /// Returns `true` once the current pass has completed.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.scheduler.is_complete()
    }

    /// Returns `true` while a debounced redraw is waiting.
    #[must_use]
    pub fn redraw_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Tile at `cell`, if materialized.
    #[must_use]
    pub fn tile(&self, cell: u32) -> Option<&Tile> {
        self.tiles.get(cell)
    }

    /// All materialized tiles.
    #[must_use]
    pub const fn tiles(&self) -> &TileStore {
        &self.tiles
    }

    /// Lifecycle bus, for subscribing to `draw:start` / `draw:complete`.
    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    /// Earliest time at which [`advance`](Self::advance) has work to do.
    pub fn next_wakeup(&mut self) -> Option<LogicalTime> {
        match (self.actions.peek_due(), self.debouncer.next_due()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Starts a draw pass for `viewport` at `now`, superseding any pass in
    /// flight. Returns the new pass token.
    pub fn draw(&mut self, now: LogicalTime, viewport: Size) -> PassToken {
        self.draw_traced(now, viewport, &mut Tracer::none())
    }

    /// [`draw`](Self::draw) with diagnostics sent to `tracer` when
    /// [`GridConfig::debug`] is set.
    pub fn draw_traced(
        &mut self,
        now: LogicalTime,
        viewport: Size,
        tracer: &mut Tracer<'_>,
    ) -> PassToken {
        let mut silent = Tracer::none();
        let tracer = if self.config.debug { tracer } else { &mut silent };

        // This pass already uses the current viewport.
        self.debouncer.cancel();
        let previous = self.scheduler.current_pass();
        let superseded =
            (previous != PassToken::NONE && !self.scheduler.is_complete()).then_some(previous);

        let geometry = GridGeometry::compute(viewport, self.config.tile_size);
        let pass = self.scheduler.begin_pass(geometry.cell_count);
        self.geometry = geometry;
        self.pass_started = now;

        tracer.pass_begin(&PassBeginEvent {
            pass,
            superseded,
            at: now,
            viewport,
        });
        self.events.emit(LifecycleEvent::DrawStart, pass);

        self.tiles.begin_layout(geometry);
        tracer.geometry(&GeometryEvent {
            pass,
            geometry,
            slice_count: self.atlas.slice_count(),
        });

        for cell in 0..geometry.cell_count {
            let slice = self.atlas.slice_for(cell);
            if self
                .scheduler
                .submit(&self.config, now, cell, slice, &mut self.actions)
                .is_some()
            {
                tracer.cell_assigned(&CellAssignedEvent {
                    pass,
                    cell,
                    slice,
                    due: now.saturating_add(self.config.materialize_offset(cell)),
                });
            }
        }
        pass
    }

    /// Reports a viewport change. Hides the grid immediately and (re)arms
    /// the debounced redraw.
    pub fn resize(&mut self, now: LogicalTime, viewport: Size) -> Suppress {
        self.resize_traced(now, viewport, &mut Tracer::none())
    }

    /// [`resize`](Self::resize) with diagnostics.
    pub fn resize_traced(
        &mut self,
        now: LogicalTime,
        viewport: Size,
        tracer: &mut Tracer<'_>,
    ) -> Suppress {
        let mut silent = Tracer::none();
        let tracer = if self.config.debug { tracer } else { &mut silent };

        let suppress = self.debouncer.notify(now, viewport);
        let hidden = self.tiles.suppress_all();
        tracer.resize(&ResizeEvent {
            at: now,
            viewport,
            until: suppress.until,
            rescheduled: suppress.rescheduled,
            hidden,
        });
        suppress
    }

    /// Drops a pending debounced redraw, if any.
    pub fn cancel_redraw(&mut self) -> bool {
        self.debouncer.cancel()
    }

    /// Runs everything due at or before `now`.
    pub fn advance(&mut self, now: LogicalTime) -> Advanced {
        self.advance_traced(now, &mut Tracer::none())
    }

    /// [`advance`](Self::advance) with diagnostics.
    pub fn advance_traced(&mut self, now: LogicalTime, tracer: &mut Tracer<'_>) -> Advanced {
        let mut silent = Tracer::none();
        let tracer = if self.config.debug { tracer } else { &mut silent };

        let mut report = Advanced::default();
        loop {
            let action_due = self.actions.peek_due().filter(|&t| t <= now);
            let trigger_due = self.debouncer.next_due().filter(|&t| t <= now);
            match (trigger_due, action_due) {
                (Some(t), a) if a.is_none_or(|a| t <= a) => {
                    let Some(viewport) = self.debouncer.poll(t) else {
                        break;
                    };
                    tracer.trigger(&TriggerEvent { at: t, viewport });
                    self.draw_traced(t, viewport, tracer);
                    report.redraws += 1;
                }
                (_, Some(_)) => {
                    let Some(due) = self.actions.pop_due(now) else {
                        break;
                    };
                    self.apply(due.due, due.payload, tracer, &mut report);
                }
                _ => break,
            }
        }
        report
    }

    /// Drains accumulated tile changes for a presenter.
    pub fn evaluate(&mut self) -> TileChanges {
        self.tiles.evaluate()
    }

    /// Like [`evaluate`](Self::evaluate), reusing `changes`.
    pub fn evaluate_into(&mut self, changes: &mut TileChanges) {
        self.tiles.evaluate_into(changes);
    }

    fn apply(
        &mut self,
        at: LogicalTime,
        action: RevealAction,
        tracer: &mut Tracer<'_>,
        report: &mut Advanced,
    ) {
        let current = self.scheduler.current_pass();
        match self
            .scheduler
            .fire(&self.config, at, action, &mut self.actions)
        {
            Fired::Materialized {
                cell,
                slice,
                flipped,
            } => {
                let placement = self.tiles.materialize(current, cell, slice, flipped);
                report.materialized += 1;
                tracer.cell_materialized(&CellMaterializedEvent {
                    pass: current,
                    cell,
                    slice,
                    at,
                    placement,
                    flipped,
                });
            }
            Fired::Revealed {
                cell,
                revealed,
                completed,
            } => {
                if let Err(error) = self.tiles.reveal(cell) {
                    report.rejected += 1;
                    tracer.rejected_step(&RejectedStepEvent {
                        pass: current,
                        cell,
                        error,
                        at,
                    });
                }
                report.revealed += 1;
                tracer.cell_revealed(&CellRevealedEvent {
                    pass: current,
                    cell,
                    at,
                    revealed,
                    cell_count: self.scheduler.cell_count(),
                });
                if completed {
                    report.completions += 1;
                    tracer.pass_complete(&PassCompleteEvent {
                        pass: current,
                        at,
                        cell_count: self.scheduler.cell_count(),
                        elapsed: at.saturating_since(self.pass_started),
                    });
                    self.events.emit(LifecycleEvent::DrawComplete, current);
                }
            }
            Fired::Stale { pass } => {
                report.stale += 1;
                tracer.stale_action(&StaleActionEvent {
                    pass,
                    current,
                    cell: action.cell,
                    step: action.step,
                    at,
                });
            }
            Fired::Rejected { cell, error } => {
                report.rejected += 1;
                tracer.rejected_step(&RejectedStepEvent {
                    pass: current,
                    cell,
                    error,
                    at,
                });
            }
        }
    }
}

/// Drives `grid` to `now` with `sink` receiving diagnostics.
///
/// Convenience for hosts that keep a long-lived sink rather than a
/// [`Tracer`].
pub fn advance_with_sink(grid: &mut Grid, now: LogicalTime, sink: &mut dyn TraceSink) -> Advanced {
    grid.advance_traced(now, &mut Tracer::new(sink))
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    use super::*;
    use crate::tile::{Placement, TileState};
    use crate::time::Delay;

    fn atlas(slices: u32) -> ImageAtlas {
        ImageAtlas::new("tiles.jpg", slices * 128, 128).unwrap()
    }

    fn ms(n: u64) -> LogicalTime {
        LogicalTime::from_millis(n)
    }

    type Log = Rc<RefCell<Vec<(LifecycleEvent, PassToken)>>>;

    fn listen(grid: &mut Grid) -> Log {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        for event in [LifecycleEvent::DrawStart, LifecycleEvent::DrawComplete] {
            let log = Rc::clone(&log);
            grid.events_mut().on(event, move |e, pass| {
                log.borrow_mut().push((e, pass));
            });
        }
        log
    }

    const REFERENCE: Size = Size::new(1000.0, 500.0);

    #[test]
    fn reference_pass_runs_to_completion_once() {
        let mut grid = Grid::new(GridConfig::staggered(), atlas(5)).unwrap();
        let log = listen(&mut grid);

        let pass = grid.draw(LogicalTime::ZERO, REFERENCE);
        assert_eq!(grid.geometry().cell_count, 51);
        assert_eq!(*log.borrow(), [(LifecycleEvent::DrawStart, pass)]);

        let changes = grid.evaluate();
        let layout = changes.layout.unwrap();
        assert_eq!(layout.geometry.container, Size::new(1000.0, 500.0));
        assert!((layout.overlay_height - 500.0).abs() < f64::EPSILON);

        // Last materialize at 50 × 5 ms, last reveal 700 ms later.
        let r = grid.advance(ms(949));
        assert_eq!(r.materialized, 51);
        assert_eq!(r.revealed, 50);
        assert!(!grid.is_complete());

        let r = grid.advance(ms(950));
        assert_eq!(r.completions, 1);
        assert_eq!(grid.revealed_count(), 51);
        assert_eq!(
            *log.borrow(),
            [
                (LifecycleEvent::DrawStart, pass),
                (LifecycleEvent::DrawComplete, pass)
            ]
        );

        assert_eq!(grid.advance(ms(10_000)), Advanced::default());
        assert_eq!(log.borrow().len(), 2, "completion is signalled once");
    }

    #[test]
    fn cells_map_onto_atlas_slices_cyclically() {
        let mut grid = Grid::new(GridConfig::eager(), atlas(5)).unwrap();
        grid.draw(LogicalTime::ZERO, REFERENCE);
        grid.advance(LogicalTime::ZERO);
        for (cell, slice) in [(0, 0), (5, 0), (7, 2), (50, 0)] {
            assert_eq!(grid.tile(cell).map(|t| t.slice), Some(slice), "cell {cell}");
        }
    }

    #[test]
    fn all_at_once_materializes_together_and_reveals_after_transition() {
        let mut grid = Grid::new(GridConfig::eager(), atlas(27)).unwrap();
        grid.draw(LogicalTime::ZERO, REFERENCE);

        let r = grid.advance(LogicalTime::ZERO);
        assert_eq!(r.materialized, 51);
        assert_eq!(r.revealed, 0);
        let changes = grid.evaluate();
        assert_eq!(changes.inserted.len(), 51);
        assert!(grid.tiles().iter().all(|t| t.flipped));

        let r = grid.advance(ms(700));
        assert_eq!(r.revealed, 51);
        assert_eq!(r.completions, 1);
        assert_eq!(grid.evaluate().revealed.len(), 51);
    }

    #[test]
    fn without_flip_tiles_arrive_revealed() {
        let config = GridConfig::eager().with_flip(false);
        let mut grid = Grid::new(config, atlas(27)).unwrap();
        grid.draw(LogicalTime::ZERO, REFERENCE);

        let r = grid.advance(LogicalTime::ZERO);
        assert_eq!(r.materialized, 51);
        assert_eq!(r.completions, 1);
        assert!(grid.tiles().iter().all(|t| !t.flipped));
        assert!(
            grid.tiles()
                .iter()
                .all(|t| t.state == TileState::Revealed)
        );
        let changes = grid.evaluate();
        assert_eq!(changes.inserted.len(), 51);
        assert!(changes.revealed.is_empty(), "nothing to unflip");
    }

    #[test]
    fn redraw_supersedes_without_phantom_completion() {
        let mut grid = Grid::new(GridConfig::staggered(), atlas(27)).unwrap();
        let log = listen(&mut grid);

        let first = grid.draw(LogicalTime::ZERO, REFERENCE);
        grid.advance(ms(100));
        let second = grid.draw(ms(100), Size::new(300.0, 200.0));
        assert_eq!(grid.geometry().cell_count, 7);

        let r = grid.advance(ms(5_000));
        assert_eq!(r.completions, 1);
        assert!(r.stale > 0);
        assert_eq!(grid.revealed_count(), 7);

        let completes: Vec<_> = log
            .borrow()
            .iter()
            .filter(|(e, _)| *e == LifecycleEvent::DrawComplete)
            .map(|(_, p)| *p)
            .collect();
        assert_eq!(completes, [second]);
        assert_ne!(first, second);
    }

    #[test]
    fn second_pass_replaces_and_shrinking_removes() {
        let mut grid = Grid::new(GridConfig::eager(), atlas(27)).unwrap();
        grid.draw(LogicalTime::ZERO, Size::new(300.0, 100.0));
        grid.advance(ms(700));
        let _ = grid.evaluate();

        grid.draw(ms(1000), Size::new(200.0, 100.0));
        grid.advance(ms(1000));
        let changes = grid.evaluate();
        assert_eq!(changes.removed, [3]);
        assert_eq!(changes.replaced, [0, 1, 2]);
        assert!(changes.inserted.is_empty());
        assert_eq!(grid.tile(0).map(|t| t.placement), Some(Placement::Replace));
    }

    #[test]
    fn resize_burst_hides_then_redraws_once_with_last_viewport() {
        let mut grid = Grid::new(GridConfig::eager(), atlas(27)).unwrap();
        let log = listen(&mut grid);
        grid.draw(LogicalTime::ZERO, REFERENCE);
        grid.advance(ms(700));
        let _ = grid.evaluate();

        for (i, w) in [900.0, 800.0, 700.0, 600.0].into_iter().enumerate() {
            let s = grid.resize(ms(1000 + i as u64 * 50), Size::new(w, 300.0));
            assert_eq!(s.rescheduled, i > 0);
        }
        let changes = grid.evaluate();
        assert_eq!(changes.suppressed.len(), 51, "every tile hidden at once");
        assert!(grid.tiles().iter().all(|t| t.suppressed));
        assert!(grid.redraw_pending());

        assert_eq!(grid.advance(ms(1449)).redraws, 0);
        let r = grid.advance(ms(1450));
        assert_eq!(r.redraws, 1);
        assert_eq!(grid.geometry().columns, 6);
        assert_eq!(grid.geometry().rows, 3);
        assert!(!grid.redraw_pending());

        let starts = log
            .borrow()
            .iter()
            .filter(|(e, _)| *e == LifecycleEvent::DrawStart)
            .count();
        assert_eq!(starts, 2);

        // The redraw materializes at its due time, so the replacements are
        // visible again.
        let changes = grid.evaluate();
        assert_eq!(changes.removed.len(), 51 - 19);
        assert_eq!(changes.replaced.len(), 19);
        assert!(grid.tiles().iter().all(|t| !t.suppressed));
    }

    #[test]
    fn resize_mid_sweep_keeps_late_tiles_hidden() {
        let mut grid = Grid::new(GridConfig::staggered(), atlas(27)).unwrap();
        grid.draw(LogicalTime::ZERO, REFERENCE);
        assert_eq!(grid.advance(ms(50)).materialized, 11);
        let _ = grid.evaluate();

        let _ = grid.resize(ms(50), REFERENCE);
        // The old pass keeps sweeping until the redraw at 350 ms.
        assert_eq!(grid.advance(ms(200)).materialized, 30);
        let changes = grid.evaluate();
        assert_eq!(changes.inserted.len(), 30);
        assert_eq!(changes.suppressed.len(), 41);
        assert!(grid.tiles().iter().all(|t| t.suppressed));

        let r = grid.advance(ms(350));
        assert_eq!(r.redraws, 1);
        assert!(!grid.tiles().is_hidden());
        assert!(grid.tile(0).is_some_and(|t| !t.suppressed));
        assert!(grid.tile(1).is_some_and(|t| t.suppressed));
        assert!(grid.tile(50).is_some_and(|t| t.suppressed));
    }

    #[test]
    fn manual_draw_drops_pending_resize_redraw() {
        let mut grid = Grid::new(GridConfig::eager(), atlas(27)).unwrap();
        let log = listen(&mut grid);
        grid.draw(LogicalTime::ZERO, REFERENCE);
        let _ = grid.resize(ms(100), Size::new(600.0, 300.0));
        assert!(grid.redraw_pending());

        grid.draw(ms(200), Size::new(600.0, 300.0));
        assert!(!grid.redraw_pending());
        assert_eq!(grid.advance(ms(2000)).redraws, 0);
        let starts = log
            .borrow()
            .iter()
            .filter(|(e, _)| *e == LifecycleEvent::DrawStart)
            .count();
        assert_eq!(starts, 2);
    }

    #[test]
    fn next_wakeup_tracks_earliest_work() {
        let mut grid = Grid::new(GridConfig::staggered(), atlas(27)).unwrap();
        assert_eq!(grid.next_wakeup(), None);
        grid.draw(ms(10), Size::new(100.0, 100.0));
        assert_eq!(grid.next_wakeup(), Some(ms(10)));
        grid.advance(ms(15));
        assert_eq!(grid.next_wakeup(), Some(ms(710)));
        let _ = grid.resize(ms(20), Size::new(100.0, 100.0));
        assert_eq!(grid.next_wakeup(), Some(ms(320)));
        assert!(grid.cancel_redraw());
        assert_eq!(grid.next_wakeup(), Some(ms(710)));
    }

    #[derive(Default)]
    struct Collect {
        assigned: u32,
        stale: Vec<StaleActionEvent>,
        complete: Vec<PassCompleteEvent>,
    }

    impl TraceSink for Collect {
        fn on_cell_assigned(&mut self, _: &CellAssignedEvent) {
            self.assigned += 1;
        }

        fn on_stale_action(&mut self, e: &StaleActionEvent) {
            self.stale.push(*e);
        }

        fn on_pass_complete(&mut self, e: &PassCompleteEvent) {
            self.complete.push(*e);
        }
    }

    #[test]
    fn diagnostics_flow_only_in_debug_mode() {
        let mut sink = Collect::default();
        let mut grid = Grid::new(GridConfig::staggered(), atlas(27)).unwrap();
        grid.draw_traced(LogicalTime::ZERO, REFERENCE, &mut Tracer::new(&mut sink));
        advance_with_sink(&mut grid, ms(5_000), &mut sink);
        assert_eq!(sink.assigned, 0);
        assert!(sink.complete.is_empty());

        let mut grid = Grid::new(GridConfig::staggered().with_debug(true), atlas(27)).unwrap();
        let first = grid.draw_traced(LogicalTime::ZERO, REFERENCE, &mut Tracer::new(&mut sink));
        assert_eq!(sink.assigned, 51);
        advance_with_sink(&mut grid, ms(20), &mut sink);
        let second = grid.draw_traced(ms(20), Size::new(100.0, 100.0), &mut Tracer::new(&mut sink));
        advance_with_sink(&mut grid, ms(5_000), &mut sink);

        assert!(sink.stale.iter().all(|e| e.pass == first && e.current == second));
        assert!(!sink.stale.is_empty());
        assert_eq!(sink.complete.len(), 1);
        assert_eq!(sink.complete[0].pass, second);
        assert_eq!(sink.complete[0].elapsed, Delay::from_millis(705));
    }

    #[test]
    fn rejects_invalid_tile_size() {
        let config = GridConfig::default().with_tile_size(0.0);
        assert_eq!(
            Grid::new(config, atlas(1)).map(|_| ()),
            Err(ConfigError::InvalidTileSize)
        );
    }
}
