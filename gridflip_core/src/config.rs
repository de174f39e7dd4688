// Copyright 2026 the Gridflip Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Grid configuration.
//!
//! [`GridConfig`] carries the three user-facing switches (`all_at_once`,
//! `use_flip`, `debug`) together with the fixed sizes and delays that shape a
//! draw pass. Presets mirror the two timing modes.

use core::fmt;

use crate::time::Delay;

/// Default edge length of a square tile, in CSS pixels.
pub const DEFAULT_TILE_SIZE: f64 = 100.0;

/// Default per-cell stagger in staggered mode.
pub const DEFAULT_STAGGER_INTERVAL: Delay = Delay::from_millis(5);

/// Default flip transition between materialize and reveal.
pub const DEFAULT_REVEAL_DELAY: Delay = Delay::from_millis(700);

/// Default resize quiet period.
pub const DEFAULT_QUIET_PERIOD: Delay = Delay::from_millis(300);

/// How materialize steps are spread over time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimingMode {
    /// Every cell materializes at delay zero.
    Immediate,
    /// Cell `i` materializes after `i × stagger_interval`.
    Staggered,
}

/// Configuration for a [`Grid`](crate::grid::Grid).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridConfig {
    /// Show every tile at once instead of sweeping.
    pub all_at_once: bool,
    /// Materialize tiles flipped (hidden) and reveal them after
    /// [`reveal_delay`](Self::reveal_delay).
    pub use_flip: bool,
    /// Route geometry and per-cell diagnostics to the trace sink.
    pub debug: bool,
    /// Edge length of a square tile, in CSS pixels.
    pub tile_size: f64,
    /// Offset between consecutive materialize steps in staggered mode.
    pub stagger_interval: Delay,
    /// Fixed flip transition from materialize to reveal. Not scaled by cell
    /// index.
    pub reveal_delay: Delay,
    /// Quiet period after the last resize before a redraw fires.
    pub quiet_period: Delay,
}

impl GridConfig {
    /// Sequential sweep with flip animation. This is the default.
    #[must_use]
    pub const fn staggered() -> Self {
        Self {
            all_at_once: false,
            use_flip: true,
            debug: false,
            tile_size: DEFAULT_TILE_SIZE,
            stagger_interval: DEFAULT_STAGGER_INTERVAL,
            reveal_delay: DEFAULT_REVEAL_DELAY,
            quiet_period: DEFAULT_QUIET_PERIOD,
        }
    }

    /// Everything shows up immediately, for low-motion or eager loading.
    #[must_use]
    pub const fn eager() -> Self {
        Self {
            all_at_once: true,
            ..Self::staggered()
        }
    }

    /// Sets [`all_at_once`](Self::all_at_once).
    #[must_use]
    pub const fn with_all_at_once(mut self, all_at_once: bool) -> Self {
        self.all_at_once = all_at_once;
        self
    }

    /// Sets [`use_flip`](Self::use_flip).
    #[must_use]
    pub const fn with_flip(mut self, use_flip: bool) -> Self {
        self.use_flip = use_flip;
        self
    }

    /// Sets [`debug`](Self::debug).
    #[must_use]
    pub const fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Sets [`tile_size`](Self::tile_size).
    #[must_use]
    pub const fn with_tile_size(mut self, tile_size: f64) -> Self {
        self.tile_size = tile_size;
        self
    }

    /// Returns the timing mode selected by [`all_at_once`](Self::all_at_once).
    #[must_use]
    pub const fn timing_mode(&self) -> TimingMode {
        if self.all_at_once {
            TimingMode::Immediate
        } else {
            TimingMode::Staggered
        }
    }

    /// Materialize offset for `cell` under the current timing mode.
    #[must_use]
    pub const fn materialize_offset(&self, cell: u32) -> Delay {
        match self.timing_mode() {
            TimingMode::Immediate => Delay::ZERO,
            TimingMode::Staggered => self.stagger_interval.saturating_mul(cell as u64),
        }
    }

    /// Delay between a cell materializing and being revealed.
    ///
    /// Without the flip there is no hidden intermediate state, so the reveal
    /// follows the materialize step immediately.
    #[must_use]
    pub const fn effective_reveal_delay(&self) -> Delay {
        if self.use_flip {
            self.reveal_delay
        } else {
            Delay::ZERO
        }
    }

    /// Checks the preconditions a draw pass relies on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTileSize`] if the tile size is not a
    /// positive finite number.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tile_size.is_finite() && self.tile_size > 0.0) {
            return Err(ConfigError::InvalidTileSize);
        }
        Ok(())
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self::staggered()
    }
}

/// A configuration that a draw pass cannot run with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Tile size is zero, negative, or not finite.
    InvalidTileSize,
    /// Atlas slice width is zero.
    ZeroSliceWidth,
    /// The atlas is narrower than a single slice.
    NoSlices {
        /// Atlas width in pixels.
        atlas_width: u32,
        /// Slice width in pixels.
        slice_width: u32,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTileSize => write!(f, "tile size must be a positive finite number"),
            Self::ZeroSliceWidth => write!(f, "atlas slice width must be non-zero"),
            Self::NoSlices {
                atlas_width,
                slice_width,
            } => write!(
                f,
                "atlas of width {atlas_width}px holds no {slice_width}px slice"
            ),
        }
    }
}

impl core::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_staggered_preset() {
        let cfg = GridConfig::default();
        assert!(!cfg.all_at_once);
        assert!(cfg.use_flip);
        assert!(!cfg.debug);
        assert_eq!(cfg.timing_mode(), TimingMode::Staggered);
    }

    #[test]
    fn staggered_offsets_scale_with_index() {
        let cfg = GridConfig::staggered();
        assert_eq!(cfg.materialize_offset(0), Delay::ZERO);
        assert_eq!(cfg.materialize_offset(10), Delay::from_millis(50));
        assert_eq!(cfg.effective_reveal_delay(), Delay::from_millis(700));
    }

    #[test]
    fn eager_collapses_stagger_but_keeps_flip_transition() {
        let cfg = GridConfig::eager();
        assert_eq!(cfg.materialize_offset(50), Delay::ZERO);
        assert_eq!(cfg.effective_reveal_delay(), Delay::from_millis(700));
    }

    #[test]
    fn no_flip_reveals_immediately() {
        let cfg = GridConfig::staggered().with_flip(false);
        assert_eq!(cfg.effective_reveal_delay(), Delay::ZERO);
        assert_eq!(cfg.materialize_offset(3), Delay::from_millis(15));
    }

    #[test]
    fn validate_rejects_bad_tile_sizes() {
        assert_eq!(GridConfig::default().validate(), Ok(()));
        for bad in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            assert_eq!(
                GridConfig::default().with_tile_size(bad).validate(),
                Err(ConfigError::InvalidTileSize),
                "tile size {bad} should be rejected"
            );
        }
    }
}
