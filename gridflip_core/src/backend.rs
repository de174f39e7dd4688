// Copyright 2026 the Gridflip Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend contract for platform integrations.
//!
//! Gridflip keeps layout and scheduling in `gridflip_core` and leaves the
//! platform glue to backend crates. A backend provides:
//!
//! - **Time** — a [`Clock`](crate::clock::Clock) over the platform's
//!   monotonic timer, read before every call into the grid.
//! - **Pump** — something that calls [`Grid::advance`] often enough (e.g.
//!   `requestAnimationFrame`), using [`Grid::next_wakeup`] to idle when
//!   nothing is due.
//! - **Resize source** — a subscription that forwards viewport changes to
//!   [`Grid::resize`] and can be disposed.
//! - **Presenter** — implements [`Presenter`] to apply [`TileChanges`] to a
//!   native tree (DOM elements on the web).
//!
//! [`Grid::advance`]: crate::grid::Grid::advance
//! [`Grid::next_wakeup`]: crate::grid::Grid::next_wakeup
//! [`Grid::resize`]: crate::grid::Grid::resize

use crate::grid::Grid;
use crate::tile::TileChanges;

/// Applies evaluated tile changes to a platform-native presentation tree.
///
/// # Frame loop pseudocode
///
/// ```rust,ignore
/// fn on_frame() {
///     let now = clock.now();
///
///     // Fire every due step: debounced redraws, materializes, reveals.
///     grid.advance(now);
///
///     // Evaluate: drain dirty channels into incremental changes.
///     let changes = grid.evaluate();
///
///     // Present: apply them to the native tree.
///     presenter.apply(&grid, &changes);
/// }
/// ```
pub trait Presenter {
    /// Applies `changes`, reading tile contents and geometry from `grid` as
    /// needed.
    fn apply(&mut self, grid: &Grid, changes: &TileChanges);
}
