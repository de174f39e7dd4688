// Copyright 2026 the Gridflip Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tiles and their reconciliation against the previous pass.
//!
//! A *tile* is the materialized content of one grid cell: which atlas slice
//! it shows and whether it has been revealed. Tiles are keyed by cell index.
//!
//! Placing a tile is split in two:
//!
//! 1. [`Placement::decide`] — a pure decision: insert a new tile, or replace
//!    the one a previous pass left at this cell.
//! 2. [`TileStore::materialize`] — the single side-effecting apply step,
//!    which records the tile and marks it dirty.
//!
//! Presenters never inspect the store wholesale. They call
//! [`TileStore::evaluate`] (through [`Grid::evaluate`](crate::grid::Grid::evaluate))
//! and apply the returned [`TileChanges`].

use alloc::vec::Vec;
use core::fmt;

use understory_dirty::{CycleHandling, DirtyTracker};

use crate::dirty;
use crate::geometry::GridGeometry;
use crate::reveal::PassToken;

/// Reveal progress of a cell within a pass.
///
/// ```text
///   Pending ──materialize──► Materialized ──reveal──► Revealed
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TileState {
    /// Scheduled, not yet created.
    Pending,
    /// Created and inserted, possibly still flipped.
    Materialized,
    /// Fully shown.
    Revealed,
}

impl TileState {
    /// Returns the state after `step`, or an error if `step` does not apply.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] when the step is out of order (revealing a
    /// pending cell, materializing twice, and so on).
    pub const fn step(self, step: TileStep) -> Result<Self, TransitionError> {
        match (self, step) {
            (Self::Pending, TileStep::Materialize) => Ok(Self::Materialized),
            (Self::Materialized, TileStep::Reveal) => Ok(Self::Revealed),
            (from, step) => Err(TransitionError { from, step }),
        }
    }
}

/// A transition in the per-cell state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TileStep {
    /// Create the tile and insert it at its cell.
    Materialize,
    /// Remove the flip; the tile counts as shown.
    Reveal,
}

/// An out-of-order step for a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransitionError {
    /// State the cell was in.
    pub from: TileState,
    /// Step that was attempted.
    pub step: TileStep,
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot {:?} a tile in state {:?}", self.step, self.from)
    }
}

impl core::error::Error for TransitionError {}

/// How a materialized tile enters the container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Placement {
    /// No tile occupies the cell; append a new one.
    Insert,
    /// A tile from an earlier pass occupies the cell; swap it out in place.
    Replace,
}

impl Placement {
    /// Decides how a tile for a cell is placed given what currently occupies
    /// it.
    #[must_use]
    pub const fn decide(existing: Option<&Tile>) -> Self {
        match existing {
            Some(_) => Self::Replace,
            None => Self::Insert,
        }
    }
}

/// Materialized content of one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tile {
    /// Cell index (row-major).
    pub cell: u32,
    /// Atlas slice displayed.
    pub slice: u32,
    /// Reveal progress; never [`TileState::Pending`] once stored.
    pub state: TileState,
    /// Whether the tile currently shows its back face.
    pub flipped: bool,
    /// Hidden while a resize settles.
    pub suppressed: bool,
    /// How the tile was placed when last materialized.
    pub placement: Placement,
    /// Pass that materialized this tile.
    pub pass: PassToken,
}

/// Container-level layout to apply before tile changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutChange {
    /// Geometry of the new pass.
    pub geometry: GridGeometry,
    /// Height the overlay mirrors (same as the container height).
    pub overlay_height: f64,
}

/// Everything that changed since the last [`TileStore::evaluate`].
///
/// All lists hold cell indices in ascending order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TileChanges {
    /// New container size, if a pass started.
    pub layout: Option<LayoutChange>,
    /// Cells whose tile was removed because the grid shrank.
    pub removed: Vec<u32>,
    /// Cells whose tile was newly appended.
    pub inserted: Vec<u32>,
    /// Cells whose tile replaced an earlier one in place.
    pub replaced: Vec<u32>,
    /// Cells whose tile was revealed.
    pub revealed: Vec<u32>,
    /// Cells whose tile was hidden pending a redraw.
    pub suppressed: Vec<u32>,
}

impl TileChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.layout = None;
        self.removed.clear();
        self.inserted.clear();
        self.replaced.clear();
        self.revealed.clear();
        self.suppressed.clear();
    }

    /// Returns `true` when there is nothing to apply.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layout.is_none()
            && self.removed.is_empty()
            && self.inserted.is_empty()
            && self.replaced.is_empty()
            && self.revealed.is_empty()
            && self.suppressed.is_empty()
    }
}

/// Tiles keyed by cell index, with dirty tracking.
pub struct TileStore {
    tiles: Vec<Option<Tile>>,
    dirty: DirtyTracker<u32>,
    pending_layout: Option<LayoutChange>,
    pending_removed: Vec<u32>,
    /// Set by [`suppress_all`](TileStore::suppress_all) until the next
    /// layout; tiles materialized meanwhile start out hidden.
    hidden: bool,
}

impl fmt::Debug for TileStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TileStore")
            .field("slots", &self.tiles.len())
            .field("live", &self.len())
            .field("pending_layout", &self.pending_layout)
            .field("hidden", &self.hidden)
            .finish_non_exhaustive()
    }
}

impl Default for TileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TileStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tiles: Vec::new(),
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            pending_layout: None,
            pending_removed: Vec::new(),
            hidden: false,
        }
    }

    /// Tile at `cell`, if one has been materialized.
    #[must_use]
    pub fn get(&self, cell: u32) -> Option<&Tile> {
        self.tiles.get(cell as usize).and_then(Option::as_ref)
    }

    /// Number of materialized tiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.iter().flatten().count()
    }

    /// Returns `true` when no tile is materialized.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.iter().all(Option::is_none)
    }

    /// Iterates over materialized tiles in cell order.
    pub fn iter(&self) -> impl Iterator<Item = &Tile> + '_ {
        self.tiles.iter().flatten()
    }

    /// Returns `true` between [`suppress_all`](Self::suppress_all) and the
    /// next [`begin_layout`](Self::begin_layout).
    #[must_use]
    pub const fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Records the layout of a new pass and drops tiles past its cell count.
    /// Ends any suppression started by [`suppress_all`](Self::suppress_all).
    pub fn begin_layout(&mut self, geometry: GridGeometry) {
        self.hidden = false;
        self.pending_layout = Some(LayoutChange {
            geometry,
            overlay_height: geometry.overlay_height(),
        });
        let keep = geometry.cell_count as usize;
        if self.tiles.len() > keep {
            for (cell, slot) in self.tiles.iter_mut().enumerate().skip(keep) {
                if slot.take().is_some() {
                    #[expect(
                        clippy::cast_possible_truncation,
                        reason = "slots are indexed by u32 cell numbers"
                    )]
                    let cell = cell as u32;
                    self.dirty.remove_key(cell);
                    self.pending_removed.push(cell);
                }
            }
            self.tiles.truncate(keep);
        }
    }

    /// Places a freshly materialized tile at `cell`, replacing whatever an
    /// earlier pass left there. Returns the placement that was applied.
    ///
    /// While the store is hidden the new tile is suppressed too.
    pub fn materialize(
        &mut self,
        pass: PassToken,
        cell: u32,
        slice: u32,
        flipped: bool,
    ) -> Placement {
        let placement = Placement::decide(self.get(cell));
        let slot = cell as usize;
        if self.tiles.len() <= slot {
            self.tiles.resize_with(slot + 1, || None);
        }
        self.tiles[slot] = Some(Tile {
            cell,
            slice,
            state: TileState::Materialized,
            flipped,
            suppressed: self.hidden,
            placement,
            pass,
        });
        self.dirty.mark(cell, dirty::CONTENT);
        if self.hidden {
            self.dirty.mark(cell, dirty::VISIBILITY);
        }
        placement
    }

    /// Marks the tile at `cell` revealed and removes its flip.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] if there is no materialized tile at `cell`.
    pub fn reveal(&mut self, cell: u32) -> Result<(), TransitionError> {
        let Some(tile) = self.tiles.get_mut(cell as usize).and_then(Option::as_mut) else {
            return Err(TransitionError {
                from: TileState::Pending,
                step: TileStep::Reveal,
            });
        };
        tile.state = tile.state.step(TileStep::Reveal)?;
        let was_flipped = core::mem::replace(&mut tile.flipped, false);
        if was_flipped {
            self.dirty.mark(cell, dirty::FLIP);
        }
        Ok(())
    }

    /// Hides every tile currently shown, and every tile materialized before
    /// the next layout. Returns how many shown tiles were hidden.
    pub fn suppress_all(&mut self) -> usize {
        self.hidden = true;
        let mut hidden = 0;
        for tile in self.tiles.iter_mut().flatten() {
            if !tile.suppressed {
                tile.suppressed = true;
                self.dirty.mark(tile.cell, dirty::VISIBILITY);
                hidden += 1;
            }
        }
        hidden
    }

    /// Drains all dirty channels and returns the accumulated changes.
    pub fn evaluate(&mut self) -> TileChanges {
        let mut changes = TileChanges::default();
        self.evaluate_into(&mut changes);
        changes
    }

    /// Like [`evaluate`](Self::evaluate), but reuses a caller-provided
    /// buffer.
    pub fn evaluate_into(&mut self, changes: &mut TileChanges) {
        changes.clear();
        changes.layout = self.pending_layout.take();
        core::mem::swap(&mut self.pending_removed, &mut changes.removed);
        changes.removed.sort_unstable();

        let content: Vec<u32> = self
            .dirty
            .drain(dirty::CONTENT)
            .deterministic()
            .run()
            .collect();
        for cell in content {
            match self.get(cell).map(|t| t.placement) {
                Some(Placement::Insert) => changes.inserted.push(cell),
                Some(Placement::Replace) => changes.replaced.push(cell),
                None => {}
            }
        }

        changes.revealed = self
            .dirty
            .drain(dirty::FLIP)
            .deterministic()
            .run()
            .filter(|&cell| self.get(cell).is_some())
            .collect();

        // A tile hidden and then re-materialized in the same frame is
        // visible again; only report tiles that are still suppressed.
        changes.suppressed = self
            .dirty
            .drain(dirty::VISIBILITY)
            .deterministic()
            .run()
            .filter(|&cell| self.get(cell).is_some_and(|t| t.suppressed))
            .collect();

        changes.inserted.sort_unstable();
        changes.replaced.sort_unstable();
        changes.revealed.sort_unstable();
        changes.suppressed.sort_unstable();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Size;

    const PASS: PassToken = PassToken::FIRST;

    #[test]
    fn state_machine_accepts_only_forward_steps() {
        assert_eq!(
            TileState::Pending.step(TileStep::Materialize),
            Ok(TileState::Materialized)
        );
        assert_eq!(
            TileState::Materialized.step(TileStep::Reveal),
            Ok(TileState::Revealed)
        );
        assert!(TileState::Pending.step(TileStep::Reveal).is_err());
        assert!(TileState::Materialized.step(TileStep::Materialize).is_err());
        assert!(TileState::Revealed.step(TileStep::Reveal).is_err());
    }

    #[test]
    fn placement_is_a_pure_decision() {
        let tile = Tile {
            cell: 0,
            slice: 0,
            state: TileState::Revealed,
            flipped: false,
            suppressed: false,
            placement: Placement::Insert,
            pass: PASS,
        };
        assert_eq!(Placement::decide(None), Placement::Insert);
        assert_eq!(Placement::decide(Some(&tile)), Placement::Replace);
    }

    #[test]
    fn first_materialize_inserts_second_replaces() {
        let mut store = TileStore::new();
        assert_eq!(store.materialize(PASS, 3, 3, true), Placement::Insert);
        let changes = store.evaluate();
        assert_eq!(changes.inserted, [3]);
        assert!(changes.replaced.is_empty());

        assert_eq!(store.materialize(PASS.next(), 3, 1, true), Placement::Replace);
        let changes = store.evaluate();
        assert!(changes.inserted.is_empty());
        assert_eq!(changes.replaced, [3]);
        assert_eq!(store.get(3).map(|t| t.slice), Some(1));
    }

    #[test]
    fn reveal_clears_flip_once() {
        let mut store = TileStore::new();
        store.materialize(PASS, 0, 0, true);
        store.evaluate();

        assert_eq!(store.reveal(0), Ok(()));
        assert_eq!(store.evaluate().revealed, [0]);
        assert!(store.reveal(0).is_err(), "already revealed");
        assert!(store.evaluate().revealed.is_empty());
    }

    #[test]
    fn unflipped_reveal_has_nothing_to_present() {
        let mut store = TileStore::new();
        store.materialize(PASS, 0, 0, false);
        store.evaluate();
        assert_eq!(store.reveal(0), Ok(()));
        assert!(store.evaluate().revealed.is_empty());
        assert_eq!(store.get(0).map(|t| t.state), Some(TileState::Revealed));
    }

    #[test]
    fn revealing_a_missing_tile_is_rejected() {
        let mut store = TileStore::new();
        assert_eq!(
            store.reveal(9),
            Err(TransitionError {
                from: TileState::Pending,
                step: TileStep::Reveal,
            })
        );
    }

    #[test]
    fn suppression_is_undone_by_rematerializing() {
        let mut store = TileStore::new();
        store.materialize(PASS, 0, 0, true);
        store.materialize(PASS, 1, 1, true);
        store.evaluate();

        assert_eq!(store.suppress_all(), 2);
        store.begin_layout(GridGeometry::compute(Size::new(200.0, 100.0), 100.0));
        assert!(!store.is_hidden());
        store.materialize(PASS.next(), 1, 1, true);
        let changes = store.evaluate();
        assert_eq!(changes.suppressed, [0]);
        assert_eq!(changes.replaced, [1]);
    }

    #[test]
    fn tiles_materialized_while_hidden_start_suppressed() {
        let mut store = TileStore::new();
        store.materialize(PASS, 0, 0, true);
        store.evaluate();

        assert_eq!(store.suppress_all(), 1);
        assert!(store.is_hidden());
        store.materialize(PASS, 1, 1, true);
        assert!(store.get(1).is_some_and(|t| t.suppressed));

        let changes = store.evaluate();
        assert_eq!(changes.inserted, [1]);
        assert_eq!(changes.suppressed, [0, 1]);
        assert_eq!(store.suppress_all(), 0, "nothing left to hide");
    }

    #[test]
    fn shrinking_layout_removes_trailing_tiles() {
        let mut store = TileStore::new();
        for cell in 0..6 {
            store.materialize(PASS, cell, cell, false);
        }
        store.evaluate();

        let geometry = GridGeometry::compute(Size::new(200.0, 100.0), 100.0);
        assert_eq!(geometry.cell_count, 3);
        store.begin_layout(geometry);
        let changes = store.evaluate();
        assert_eq!(changes.removed, [3, 4, 5]);
        assert_eq!(changes.layout.map(|l| l.overlay_height), Some(100.0));
        assert_eq!(store.len(), 3);
    }
}
