// Copyright 2026 the Gridflip Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web backend for gridflip.
//!
//! This crate provides integration with browser APIs:
//!
//! - [`RafLoop`]: `requestAnimationFrame` pump that runs the grid's
//!   `advance` loop
//! - [`DomPresenter`]: DOM element management for tiles
//! - [`ResizeSubscription`]: a disposable `resize` listener per grid
//! - [`ConsoleSink`]: `console.log` diagnostics for debug mode
//! - [`GridMount`]: finds the source image, builds the container, grid and
//!   overlay elements, and wires everything together

#![no_std]

extern crate alloc;

mod console;
mod mount;
mod presenter;
mod raf;
mod subscription;

pub use console::ConsoleSink;
pub use gridflip_core::backend::Presenter;
pub use mount::{CONTAINER_CLASS, GRID_CLASS, GridMount, IMAGE_SELECTOR, OVERLAY_CLASS};
pub use presenter::{BOX_CLASS, DomPresenter, FLIPPED_CLASS};
pub use raf::RafLoop;
pub use subscription::{EventSubscription, ResizeSubscription, viewport};

use core::fmt;

use gridflip_core::clock::Clock;
use gridflip_core::config::ConfigError;
use gridflip_core::time::LogicalTime;

/// Returns the current time from `performance.now()`.
#[must_use]
pub fn now() -> LogicalTime {
    LogicalTime::from_millis_f64(raf::performance_now())
}

/// [`Clock`] over `performance.now()`.
#[derive(Clone, Copy, Debug, Default)]
pub struct WebClock;

impl Clock for WebClock {
    fn now(&self) -> LogicalTime {
        now()
    }
}

/// A collaborator the mount needs is missing or refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MountError {
    /// No global `window`.
    NoWindow,
    /// No document to create elements in.
    NoDocument,
    /// No `<img>` matching [`IMAGE_SELECTOR`].
    MissingImage,
    /// The document refused to create or insert an element.
    CreateElement(&'static str),
    /// `addEventListener` failed for the named event.
    Listener(&'static str),
    /// The grid configuration or atlas is invalid.
    Config(ConfigError),
}

impl fmt::Display for MountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoWindow => write!(f, "no global window"),
            Self::NoDocument => write!(f, "no document"),
            Self::MissingImage => write!(f, "no image element matches `{IMAGE_SELECTOR}`"),
            Self::CreateElement(what) => write!(f, "failed to create the {what} element"),
            Self::Listener(event) => write!(f, "failed to listen for `{event}`"),
            Self::Config(err) => write!(f, "invalid grid configuration: {err}"),
        }
    }
}

impl core::error::Error for MountError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for MountError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn mount_errors_describe_the_missing_piece() {
        assert_eq!(
            MountError::MissingImage.to_string(),
            "no image element matches `.gridflip-image`"
        );
        assert_eq!(
            MountError::CreateElement("overlay").to_string(),
            "failed to create the overlay element"
        );
        let err = MountError::from(ConfigError::ZeroSliceWidth);
        assert_eq!(
            err.to_string(),
            "invalid grid configuration: atlas slice width must be non-zero"
        );
        assert!(core::error::Error::source(&err).is_some());
    }

    #[test]
    fn web_clock_serves_as_the_mount_clock() {
        fn clock_of<C: Clock + Copy + Default>() -> C {
            C::default()
        }
        let clock: WebClock = clock_of();
        let _: &dyn Clock = &clock;
    }
}
