// Copyright 2026 the Gridflip Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Staggered reveal scheduling.
//!
//! A draw pass schedules two actions per cell on a [`TimerQueue`]:
//!
//! ```text
//!   t0 + offset(i)                 Materialize(i)   (tile created, flipped)
//!   t0 + offset(i) + reveal_delay  Reveal(i)        (flip removed, counted)
//! ```
//!
//! `offset(i)` is zero in immediate mode and `i × stagger_interval` in
//! staggered mode (see [`GridConfig::materialize_offset`]). Each cell moves
//! through the [`TileState`] machine; out-of-order steps are reported as
//! [`Fired::Rejected`] rather than panicking.
//!
//! Passes are identified by a [`PassToken`]. Starting a new pass does not
//! cancel the previous pass's actions: they stay queued and, when they fire,
//! resolve to [`Fired::Stale`] without touching any state.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use crate::config::GridConfig;
use crate::tile::{TileState, TileStep, TransitionError};
use crate::time::LogicalTime;
use crate::timer::{TimerId, TimerQueue};

/// Identity of one draw pass.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PassToken(u64);

impl PassToken {
    /// Token held before any pass has started.
    pub const NONE: Self = Self(0);

    /// Token of the first pass.
    pub const FIRST: Self = Self(1);

    /// The token following this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// Raw pass number.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Rebuilds a token from its raw number, e.g. when decoding a recording.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Debug for PassToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PassToken({})", self.0)
    }
}

impl fmt::Display for PassToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A deferred per-cell step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RevealAction {
    /// Pass that scheduled the action.
    pub pass: PassToken,
    /// Target cell.
    pub cell: u32,
    /// Atlas slice assigned to the cell.
    pub slice: u32,
    /// Which step to perform.
    pub step: TileStep,
}

/// Outcome of firing a [`RevealAction`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fired {
    /// The cell's tile should be created; its reveal has been scheduled.
    Materialized {
        /// Target cell.
        cell: u32,
        /// Atlas slice to display.
        slice: u32,
        /// Whether the tile starts out flipped.
        flipped: bool,
    },
    /// The cell was revealed.
    Revealed {
        /// Target cell.
        cell: u32,
        /// Revealed count for the pass after this step.
        revealed: u32,
        /// `true` exactly once per pass, on the reveal that completes it.
        completed: bool,
    },
    /// The action belongs to a superseded pass and was ignored.
    Stale {
        /// Pass the action was scheduled for.
        pass: PassToken,
    },
    /// The step did not apply to the cell's current state.
    Rejected {
        /// Target cell.
        cell: u32,
        /// The refused transition.
        error: TransitionError,
    },
}

/// Per-pass reveal bookkeeping.
#[derive(Clone, Debug)]
pub struct RevealScheduler {
    pass: PassToken,
    states: Vec<TileState>,
    revealed: u32,
    completed: bool,
}

impl Default for RevealScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl RevealScheduler {
    /// Creates a scheduler with no active pass.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pass: PassToken::NONE,
            states: Vec::new(),
            revealed: 0,
            completed: false,
        }
    }

    /// Starts a pass over `cell_count` cells, superseding any pass in
    /// flight, and returns its token.
    pub fn begin_pass(&mut self, cell_count: u32) -> PassToken {
        self.pass = self.pass.next();
        self.states = vec![TileState::Pending; cell_count as usize];
        self.revealed = 0;
        self.completed = false;
        self.pass
    }

    /// Token of the current pass ([`PassToken::NONE`] before the first).
    #[must_use]
    pub const fn current_pass(&self) -> PassToken {
        self.pass
    }

    /// Number of cells in the current pass.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "the state vector is sized from a u32 cell count"
    )]
    pub fn cell_count(&self) -> u32 {
        self.states.len() as u32
    }

    /// Cells revealed so far in the current pass. Never decreases within a
    /// pass.
    #[must_use]
    pub const fn revealed_count(&self) -> u32 {
        self.revealed
    }

    /// Returns `true` once every cell of the current pass is revealed.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.completed
    }

    /// State of `cell` in the current pass.
    #[must_use]
    pub fn state(&self, cell: u32) -> Option<TileState> {
        self.states.get(cell as usize).copied()
    }

    /// Schedules the materialize step for `cell` of the current pass, with
    /// `start` as the pass start time.
    ///
    /// Returns `None` if `cell` is outside the current pass.
    pub fn submit(
        &self,
        config: &GridConfig,
        start: LogicalTime,
        cell: u32,
        slice: u32,
        queue: &mut TimerQueue<RevealAction>,
    ) -> Option<TimerId> {
        if cell >= self.cell_count() {
            return None;
        }
        let due = start.saturating_add(config.materialize_offset(cell));
        Some(queue.schedule(
            due,
            RevealAction {
                pass: self.pass,
                cell,
                slice,
                step: TileStep::Materialize,
            },
        ))
    }

    /// Applies an action that came due at `at`.
    ///
    /// A materialize step schedules the matching reveal at
    /// `at + effective_reveal_delay`. With a zero delay the reveal still
    /// goes through the queue, after every action already due at `at`.
    pub fn fire(
        &mut self,
        config: &GridConfig,
        at: LogicalTime,
        action: RevealAction,
        queue: &mut TimerQueue<RevealAction>,
    ) -> Fired {
        if action.pass != self.pass {
            return Fired::Stale { pass: action.pass };
        }
        let Some(state) = self.states.get_mut(action.cell as usize) else {
            return Fired::Rejected {
                cell: action.cell,
                error: TransitionError {
                    from: TileState::Pending,
                    step: action.step,
                },
            };
        };
        match state.step(action.step) {
            Err(error) => Fired::Rejected {
                cell: action.cell,
                error,
            },
            Ok(next) => {
                *state = next;
                match action.step {
                    TileStep::Materialize => {
                        queue.schedule(
                            at.saturating_add(config.effective_reveal_delay()),
                            RevealAction {
                                step: TileStep::Reveal,
                                ..action
                            },
                        );
                        Fired::Materialized {
                            cell: action.cell,
                            slice: action.slice,
                            flipped: config.use_flip,
                        }
                    }
                    TileStep::Reveal => {
                        self.revealed += 1;
                        let completed =
                            !self.completed && self.revealed == self.cell_count();
                        self.completed |= completed;
                        Fired::Revealed {
                            cell: action.cell,
                            revealed: self.revealed,
                            completed,
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::Delay;

    struct Harness {
        config: GridConfig,
        sched: RevealScheduler,
        queue: TimerQueue<RevealAction>,
    }

    impl Harness {
        fn new(config: GridConfig) -> Self {
            Self {
                config,
                sched: RevealScheduler::new(),
                queue: TimerQueue::new(),
            }
        }

        fn start(&mut self, at: LogicalTime, cells: u32) -> PassToken {
            let pass = self.sched.begin_pass(cells);
            for cell in 0..cells {
                self.sched
                    .submit(&self.config, at, cell, cell % 5, &mut self.queue)
                    .unwrap();
            }
            pass
        }

        fn run_until(&mut self, now: LogicalTime) -> Vec<(LogicalTime, Fired)> {
            let mut out = Vec::new();
            while let Some(due) = self.queue.pop_due(now) {
                let fired = self
                    .sched
                    .fire(&self.config, due.due, due.payload, &mut self.queue);
                out.push((due.due, fired));
            }
            out
        }
    }

    fn completions(fired: &[(LogicalTime, Fired)]) -> usize {
        fired
            .iter()
            .filter(|(_, f)| matches!(f, Fired::Revealed { completed: true, .. }))
            .count()
    }

    #[test]
    fn staggered_pass_sweeps_then_reveals() {
        let mut h = Harness::new(GridConfig::staggered());
        h.start(LogicalTime::ZERO, 3);

        let fired = h.run_until(LogicalTime::from_millis(10));
        assert_eq!(
            fired.iter().map(|(t, _)| *t).collect::<Vec<_>>(),
            [
                LogicalTime::from_millis(0),
                LogicalTime::from_millis(5),
                LogicalTime::from_millis(10)
            ]
        );
        assert!(
            fired
                .iter()
                .all(|(_, f)| matches!(f, Fired::Materialized { flipped: true, .. }))
        );
        assert_eq!(h.sched.revealed_count(), 0);

        // Reveal delay is fixed, not scaled by index.
        let fired = h.run_until(LogicalTime::from_millis(709));
        assert_eq!(fired.len(), 2);
        assert_eq!(fired[1].0, LogicalTime::from_millis(705));
        assert!(!h.sched.is_complete());

        let fired = h.run_until(LogicalTime::from_millis(710));
        assert_eq!(completions(&fired), 1);
        assert!(h.sched.is_complete());
        assert_eq!(h.sched.revealed_count(), 3);
    }

    #[test]
    fn all_at_once_materializes_every_cell_at_zero() {
        let mut h = Harness::new(GridConfig::eager());
        h.start(LogicalTime::ZERO, 51);

        let fired = h.run_until(LogicalTime::ZERO);
        assert_eq!(fired.len(), 51);
        assert!(
            fired
                .iter()
                .all(|(_, f)| matches!(f, Fired::Materialized { .. }))
        );

        let fired = h.run_until(LogicalTime::from_millis(700));
        assert_eq!(fired.len(), 51);
        assert_eq!(completions(&fired), 1);
        assert_eq!(h.sched.revealed_count(), 51);
    }

    #[test]
    fn without_flip_reveal_follows_materialize_in_queue_order() {
        let mut h = Harness::new(GridConfig::eager().with_flip(false));
        h.start(LogicalTime::ZERO, 2);

        let fired = h.run_until(LogicalTime::ZERO);
        let kinds: Vec<_> = fired
            .iter()
            .map(|(_, f)| match f {
                Fired::Materialized { cell, flipped, .. } => {
                    assert!(!flipped, "tiles are created already revealed");
                    ("m", *cell)
                }
                Fired::Revealed { cell, .. } => ("r", *cell),
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(kinds, [("m", 0), ("m", 1), ("r", 0), ("r", 1)]);
        assert!(h.sched.is_complete());
    }

    #[test]
    fn superseded_pass_never_completes_the_new_one() {
        let mut h = Harness::new(GridConfig::staggered());
        let first = h.start(LogicalTime::ZERO, 4);
        h.run_until(LogicalTime::from_millis(10));

        let second = h.start(LogicalTime::from_millis(10), 2);
        assert_ne!(first, second);

        let fired = h.run_until(LogicalTime::from_millis(2000));
        let stale = fired
            .iter()
            .filter(|(_, f)| matches!(f, Fired::Stale { pass } if *pass == first))
            .count();
        // Cell 3 of the first pass never materialized before supersession,
        // so the first pass leaves 3 reveals and 1 materialize behind.
        assert_eq!(stale, 4);
        assert_eq!(completions(&fired), 1);
        assert_eq!(h.sched.revealed_count(), 2);
        assert_eq!(h.sched.current_pass(), second);
    }

    #[test]
    fn duplicate_steps_are_rejected_not_double_counted() {
        let mut h = Harness::new(GridConfig::eager().with_flip(false));
        let pass = h.start(LogicalTime::ZERO, 1);
        h.run_until(LogicalTime::ZERO);
        assert!(h.sched.is_complete());

        let replay = RevealAction {
            pass,
            cell: 0,
            slice: 0,
            step: TileStep::Reveal,
        };
        let fired = h
            .sched
            .fire(&h.config, LogicalTime::ZERO, replay, &mut h.queue);
        assert!(matches!(fired, Fired::Rejected { cell: 0, .. }));
        assert_eq!(h.sched.revealed_count(), 1);
    }

    #[test]
    fn submit_outside_pass_is_refused() {
        let mut h = Harness::new(GridConfig::default());
        h.sched.begin_pass(2);
        assert!(
            h.sched
                .submit(&h.config, LogicalTime::ZERO, 2, 0, &mut h.queue)
                .is_none()
        );
        assert!(h.queue.is_empty());
    }

    #[test]
    fn offsets_use_configured_interval() {
        let config = GridConfig {
            stagger_interval: Delay::from_millis(20),
            ..GridConfig::staggered()
        };
        let mut h = Harness::new(config);
        h.start(LogicalTime::from_millis(100), 3);
        assert_eq!(h.queue.peek_due(), Some(LogicalTime::from_millis(100)));
        h.run_until(LogicalTime::from_millis(139));
        assert_eq!(h.sched.state(1), Some(TileState::Materialized));
        assert_eq!(h.sched.state(2), Some(TileState::Pending));
    }
}
