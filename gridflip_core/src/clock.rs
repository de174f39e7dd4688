// Copyright 2026 the Gridflip Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Clock sources for the logical timeline.
//!
//! The grid never reads time on its own; every entry point takes a
//! [`LogicalTime`]. A [`Clock`] is the thing the host asks for "now" before
//! calling in. Backends implement it over a platform timer, and
//! [`ManualClock`] lets tests and simulations step time explicitly.

use core::cell::Cell;

use crate::time::{Delay, LogicalTime};

/// A source of monotonic logical time.
pub trait Clock {
    /// Returns the current time on the logical timeline.
    fn now(&self) -> LogicalTime;
}

/// A clock that only moves when told to.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Cell<LogicalTime>,
}

impl ManualClock {
    /// Creates a clock reading `start`.
    #[must_use]
    pub fn new(start: LogicalTime) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    /// Moves the clock forward by `delay` and returns the new time.
    pub fn advance(&self, delay: Delay) -> LogicalTime {
        let next = self.now.get() + delay;
        self.now.set(next);
        next
    }

    /// Jumps the clock to `t`. Earlier times are ignored so the clock stays
    /// monotonic.
    pub fn set(&self, t: LogicalTime) {
        if t > self.now.get() {
            self.now.set(t);
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> LogicalTime {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_accumulates() {
        let clock = ManualClock::new(LogicalTime::from_millis(10));
        clock.advance(Delay::from_millis(5));
        assert_eq!(clock.now(), LogicalTime::from_millis(15));
    }

    #[test]
    fn set_never_goes_backwards() {
        let clock = ManualClock::new(LogicalTime::from_millis(10));
        clock.set(LogicalTime::from_millis(3));
        assert_eq!(clock.now(), LogicalTime::from_millis(10));
        clock.set(LogicalTime::from_millis(30));
        assert_eq!(clock.now(), LogicalTime::from_millis(30));
    }
}
