// Copyright 2026 the Gridflip Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Logical time for the reveal timeline.
//!
//! [`LogicalTime`] is a point on a monotonic timeline measured in microsecond
//! ticks. The host decides where the timeline comes from: the web backend
//! feeds `performance.now()`, tests and simulations feed a
//! [`ManualClock`](crate::clock::ManualClock).
//!
//! [`Delay`] is a span on the same timeline. All reveal timing (stagger
//! interval, flip transition, resize quiet period) is expressed as delays so
//! the scheduler never talks to a real timer.

use core::fmt;
use core::ops::{Add, Sub};

const MICROS_PER_MILLI: u64 = 1_000;

/// A point on the logical timeline, in microsecond ticks.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LogicalTime(pub u64);

impl LogicalTime {
    /// The start of the timeline.
    pub const ZERO: Self = Self(0);

    /// Returns the raw microsecond tick value.
    #[inline]
    #[must_use]
    pub const fn micros(self) -> u64 {
        self.0
    }

    /// Creates a time from whole milliseconds.
    #[inline]
    #[must_use]
    pub const fn from_millis(ms: u64) -> Self {
        Self(ms.saturating_mul(MICROS_PER_MILLI))
    }

    /// Creates a time from a fractional millisecond timestamp such as a
    /// `DOMHighResTimeStamp`. Negative and non-finite inputs clamp to zero.
    #[inline]
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "host timestamps are small positive f64; µs fits in u64"
    )]
    pub fn from_millis_f64(ms: f64) -> Self {
        if ms.is_finite() && ms > 0.0 {
            Self((ms * MICROS_PER_MILLI as f64) as u64)
        } else {
            Self::ZERO
        }
    }

    /// Returns the time as fractional milliseconds.
    #[inline]
    #[must_use]
    pub fn as_millis_f64(self) -> f64 {
        self.0 as f64 / MICROS_PER_MILLI as f64
    }

    /// Adds a delay, saturating at the end of the timeline.
    #[inline]
    #[must_use]
    pub const fn saturating_add(self, delay: Delay) -> Self {
        Self(self.0.saturating_add(delay.0))
    }

    /// Returns the delay elapsed since `earlier`, or zero if `earlier` is
    /// after `self`.
    #[inline]
    #[must_use]
    pub const fn saturating_since(self, earlier: Self) -> Delay {
        Delay(self.0.saturating_sub(earlier.0))
    }
}

impl Add<Delay> for LogicalTime {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Delay) -> Self {
        self.saturating_add(rhs)
    }
}

impl Sub for LogicalTime {
    type Output = Delay;

    #[inline]
    fn sub(self, rhs: Self) -> Delay {
        self.saturating_since(rhs)
    }
}

impl fmt::Debug for LogicalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LogicalTime({}µs)", self.0)
    }
}

/// A span of logical time, in microsecond ticks.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Delay(pub u64);

impl Delay {
    /// No delay: the action is due immediately.
    pub const ZERO: Self = Self(0);

    /// Creates a delay from whole milliseconds.
    #[inline]
    #[must_use]
    pub const fn from_millis(ms: u64) -> Self {
        Self(ms.saturating_mul(MICROS_PER_MILLI))
    }

    /// Returns the raw microsecond tick value.
    #[inline]
    #[must_use]
    pub const fn micros(self) -> u64 {
        self.0
    }

    /// Returns the delay in whole milliseconds (truncating).
    #[inline]
    #[must_use]
    pub const fn as_millis(self) -> u64 {
        self.0 / MICROS_PER_MILLI
    }

    /// Returns `true` for a zero-length delay.
    #[inline]
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Scales the delay by `n`, saturating on overflow.
    ///
    /// Used for the per-cell stagger offset (`cell × interval`).
    #[inline]
    #[must_use]
    pub const fn saturating_mul(self, n: u64) -> Self {
        Self(self.0.saturating_mul(n))
    }
}

impl Add for Delay {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl fmt::Debug for Delay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Delay({}µs)", self.0)
    }
}
