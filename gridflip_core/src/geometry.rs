// Copyright 2026 the Gridflip Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Viewport → grid geometry.
//!
//! [`GridGeometry::compute`] turns a viewport size and a square tile size
//! into a row-major grid that always over-covers the viewport: columns and
//! rows are rounded up, never down, so no gap shows at the right or bottom
//! edge. One extra cell ([`OVERSHOOT_CELLS`]) is queued beyond exact coverage.
//!
//! ```text
//!   columns    = ceil(vw / s)
//!   rows       = ceil(vh / s)
//!   cell_count = columns * rows + OVERSHOOT_CELLS
//!   container  = (columns * s, rows * s)
//! ```

use kurbo::{Point, Rect, Size};

/// Cells queued beyond `columns × rows`.
///
/// The extra cell wraps onto a row below the container and guarantees at
/// least one tile is always scheduled, even for an empty viewport.
pub const OVERSHOOT_CELLS: u32 = 1;

/// Row-major grid dimensions for one draw pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridGeometry {
    /// Number of tile columns.
    pub columns: u32,
    /// Number of tile rows.
    pub rows: u32,
    /// Number of cells to schedule (`columns × rows + OVERSHOOT_CELLS`).
    pub cell_count: u32,
    /// Edge length of a tile, in CSS pixels.
    pub tile_size: f64,
    /// Pixel size of the grid container (`columns × s` by `rows × s`).
    pub container: Size,
}

impl GridGeometry {
    /// The grid produced for an empty or degenerate viewport.
    #[must_use]
    pub const fn degenerate(tile_size: f64) -> Self {
        Self {
            columns: 0,
            rows: 0,
            cell_count: OVERSHOOT_CELLS,
            tile_size,
            container: Size::ZERO,
        }
    }

    /// Computes the grid covering `viewport` with square tiles of edge
    /// `tile_size`.
    ///
    /// Non-positive or non-finite viewport extents yield zero columns/rows.
    /// A non-positive tile size is a caller error (see
    /// [`GridConfig::validate`](crate::config::GridConfig::validate)); it
    /// produces the [`degenerate`](Self::degenerate) grid.
    #[must_use]
    pub fn compute(viewport: Size, tile_size: f64) -> Self {
        if !(tile_size.is_finite() && tile_size > 0.0) {
            return Self::degenerate(tile_size);
        }
        let columns = tiles_along(viewport.width, tile_size);
        let rows = tiles_along(viewport.height, tile_size);
        Self {
            columns,
            rows,
            cell_count: columns.saturating_mul(rows).saturating_add(OVERSHOOT_CELLS),
            tile_size,
            container: Size::new(
                f64::from(columns) * tile_size,
                f64::from(rows) * tile_size,
            ),
        }
    }

    /// Number of cells that exactly tile the container.
    #[must_use]
    pub const fn covered_cells(&self) -> u32 {
        self.columns.saturating_mul(self.rows)
    }

    /// Returns `true` if the container reaches the viewport's right and
    /// bottom edges.
    #[must_use]
    pub fn covers(&self, viewport: Size) -> bool {
        self.container.width >= viewport.width && self.container.height >= viewport.height
    }

    /// Height the full-bleed overlay mirrors.
    #[must_use]
    pub fn overlay_height(&self) -> f64 {
        self.container.height
    }

    /// Row-major `(column, row)` of `cell`.
    ///
    /// Cells past `columns × rows` continue onto the rows below. With zero
    /// columns every cell sits at column 0.
    #[must_use]
    pub const fn cell_position(&self, cell: u32) -> (u32, u32) {
        if self.columns == 0 {
            return (0, cell);
        }
        (cell % self.columns, cell / self.columns)
    }

    /// Top-left corner of `cell` inside the container.
    #[must_use]
    pub fn cell_origin(&self, cell: u32) -> Point {
        let (col, row) = self.cell_position(cell);
        Point::new(
            f64::from(col) * self.tile_size,
            f64::from(row) * self.tile_size,
        )
    }

    /// Bounds of `cell` inside the container.
    #[must_use]
    pub fn cell_rect(&self, cell: u32) -> Rect {
        Rect::from_origin_size(
            self.cell_origin(cell),
            Size::new(self.tile_size, self.tile_size),
        )
    }
}

/// `ceil(extent / tile_size)`, with degenerate extents mapping to zero.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "value is finite, non-negative and clamped to u32::MAX before the cast"
)]
fn tiles_along(extent: f64, tile_size: f64) -> u32 {
    if !(extent.is_finite() && extent > 0.0) {
        return 0;
    }
    let exact = Size::new(extent / tile_size, 0.0).ceil().width;
    exact.min(f64::from(u32::MAX)) as u32
}
