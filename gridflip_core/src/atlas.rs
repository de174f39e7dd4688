// Copyright 2026 the Gridflip Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Image atlas slicing.
//!
//! The source image is one wide strip cut into fixed-width, non-overlapping
//! slices. A grid usually has more cells than the atlas has slices, so cells
//! wrap around the atlas cyclically with [`slice_for_cell`].

use alloc::string::String;

use crate::config::ConfigError;

/// Slice width of the stock atlas, in pixels.
pub const DEFAULT_SLICE_WIDTH: u32 = 128;

/// Width of the stock atlas, in pixels.
pub const DEFAULT_ATLAS_WIDTH: u32 = 3456;

/// Maps a cell index onto one of `slice_count` atlas slices.
///
/// Cells below `slice_count` map to themselves; later cells wrap around, so
/// the result is always in `[0, slice_count)` and repeats with period
/// `slice_count`.
///
/// # Panics
///
/// Panics if `slice_count` is zero. [`ImageAtlas::new`] refuses atlases with
/// no slices, so counts taken from an atlas are always valid.
#[inline]
#[must_use]
pub const fn slice_for_cell(cell: u32, slice_count: u32) -> u32 {
    assert!(slice_count != 0, "atlas must have at least one slice");
    if cell < slice_count {
        cell
    } else {
        cell - (cell / slice_count) * slice_count
    }
}

/// A loaded, horizontally sliced source image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageAtlas {
    url: String,
    width: u32,
    slice_width: u32,
    slice_count: u32,
}

impl ImageAtlas {
    /// Describes an atlas of `width` pixels cut into `slice_width` slices.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroSliceWidth`] for a zero slice width and
    /// [`ConfigError::NoSlices`] when the atlas is narrower than one slice.
    pub fn new(url: impl Into<String>, width: u32, slice_width: u32) -> Result<Self, ConfigError> {
        if slice_width == 0 {
            return Err(ConfigError::ZeroSliceWidth);
        }
        let slice_count = width / slice_width;
        if slice_count == 0 {
            return Err(ConfigError::NoSlices {
                atlas_width: width,
                slice_width,
            });
        }
        Ok(Self {
            url: url.into(),
            width,
            slice_width,
            slice_count,
        })
    }

    /// The stock 3456px atlas with 128px slices (27 slices).
    ///
    /// # Errors
    ///
    /// Never fails for the stock dimensions; the signature matches
    /// [`new`](Self::new).
    pub fn with_default_slicing(url: impl Into<String>) -> Result<Self, ConfigError> {
        Self::new(url, DEFAULT_ATLAS_WIDTH, DEFAULT_SLICE_WIDTH)
    }

    /// Source URL of the image.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Atlas width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Width of one slice in pixels.
    #[must_use]
    pub const fn slice_width(&self) -> u32 {
        self.slice_width
    }

    /// Number of whole slices (`floor(width / slice_width)`).
    #[must_use]
    pub const fn slice_count(&self) -> u32 {
        self.slice_count
    }

    /// Slice shown by `cell`.
    #[must_use]
    pub const fn slice_for(&self, cell: u32) -> u32 {
        slice_for_cell(cell, self.slice_count)
    }

    /// Horizontal background offset, in pixels, that brings `slice` into
    /// view (always `<= 0`).
    #[must_use]
    pub fn background_offset(&self, slice: u32) -> f64 {
        // Subtract from zero so slice 0 yields +0.0 rather than -0.0.
        0.0 - f64::from(slice) * f64::from(self.slice_width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_mapping() {
        assert_eq!(slice_for_cell(0, 5), 0);
        assert_eq!(slice_for_cell(5, 5), 0);
        assert_eq!(slice_for_cell(7, 5), 2);
        assert_eq!(slice_for_cell(50, 5), 0);
    }

    #[test]
    fn mapping_is_bounded_and_periodic() {
        for n in 1..=30 {
            for c in 0..200 {
                let s = slice_for_cell(c, n);
                assert!(s < n, "cell {c} with {n} slices mapped to {s}");
                assert_eq!(s, slice_for_cell(c + n, n), "period {n} broken at {c}");
            }
        }
    }

    #[test]
    #[should_panic(expected = "atlas must have at least one slice")]
    fn zero_slices_is_a_precondition_violation() {
        let _ = slice_for_cell(3, 0);
    }

    #[test]
    fn stock_atlas_has_27_slices() {
        let atlas = ImageAtlas::with_default_slicing("tiles.jpg").unwrap();
        assert_eq!(atlas.slice_count(), 27);
        assert_eq!(atlas.slice_for(27), 0);
        assert_eq!(atlas.slice_for(30), 3);
        assert!((atlas.background_offset(3) + 384.0).abs() < f64::EPSILON);
        assert!(
            atlas.background_offset(0).is_sign_positive(),
            "slice 0 must not render as -0px"
        );
    }

    #[test]
    fn rejects_sliceless_atlases() {
        assert_eq!(
            ImageAtlas::new("a.png", 100, 0),
            Err(ConfigError::ZeroSliceWidth)
        );
        assert_eq!(
            ImageAtlas::new("a.png", 100, 128),
            Err(ConfigError::NoSlices {
                atlas_width: 100,
                slice_width: 128,
            })
        );
    }
}
