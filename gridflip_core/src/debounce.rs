// Copyright 2026 the Gridflip Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resize debouncing.
//!
//! A burst of resize notifications collapses into one redraw, fired once
//! the viewport has been quiet for [`GridConfig::quiet_period`]. Every
//! notification pushes the trigger back and replaces the viewport it will
//! carry, so the redraw always sees the last size reported.
//!
//! The visible grid is hidden as soon as a resize starts; the caller acts on
//! the [`Suppress`] returned by [`ResizeDebouncer::notify`].
//!
//! [`GridConfig::quiet_period`]: crate::config::GridConfig::quiet_period

use kurbo::Size;

use crate::time::{Delay, LogicalTime};
use crate::timer::{TimerId, TimerQueue};

/// Instruction to hide the grid until the pending redraw runs.
#[derive(Clone, Copy, Debug, PartialEq)]
#[must_use = "the grid should be hidden while a resize settles"]
pub struct Suppress {
    /// Time the pending redraw is now due.
    pub until: LogicalTime,
    /// Whether this notification replaced an already pending trigger.
    pub rescheduled: bool,
}

/// Collapses resize bursts into a single trigger.
#[derive(Debug)]
pub struct ResizeDebouncer {
    quiet: Delay,
    timers: TimerQueue<Size>,
    pending: Option<TimerId>,
}

impl ResizeDebouncer {
    /// Creates a debouncer that waits `quiet` after the last notification.
    #[must_use]
    pub fn new(quiet: Delay) -> Self {
        Self {
            quiet,
            timers: TimerQueue::new(),
            pending: None,
        }
    }

    /// Quiet period in effect.
    #[must_use]
    pub const fn quiet_period(&self) -> Delay {
        self.quiet
    }

    /// Records a resize to `viewport` at `now`, replacing any pending
    /// trigger with one due at `now + quiet`.
    pub fn notify(&mut self, now: LogicalTime, viewport: Size) -> Suppress {
        let rescheduled = self.pending.take().is_some_and(|id| self.timers.cancel(id));
        let until = now.saturating_add(self.quiet);
        self.pending = Some(self.timers.schedule(until, viewport));
        Suppress { until, rescheduled }
    }

    /// Returns the viewport of the trigger if it is due at `now`. Yields each
    /// trigger exactly once.
    pub fn poll(&mut self, now: LogicalTime) -> Option<Size> {
        let due = self.timers.pop_due(now)?;
        self.pending = None;
        Some(due.payload)
    }

    /// Due time of the pending trigger.
    pub fn next_due(&mut self) -> Option<LogicalTime> {
        self.timers.peek_due()
    }

    /// Returns `true` while a trigger is waiting.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drops the pending trigger, if any. Returns whether one was dropped.
    pub fn cancel(&mut self) -> bool {
        let dropped = self.pending.take().is_some_and(|id| self.timers.cancel(id));
        self.timers.clear();
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUIET: Delay = Delay::from_millis(300);

    fn ms(n: u64) -> LogicalTime {
        LogicalTime::from_millis(n)
    }

    #[test]
    fn burst_collapses_to_one_trigger_with_last_viewport() {
        let mut d = ResizeDebouncer::new(QUIET);
        let sizes = [
            Size::new(800.0, 600.0),
            Size::new(820.0, 600.0),
            Size::new(900.0, 640.0),
            Size::new(1024.0, 768.0),
        ];
        let mut triggers = 0;
        for (i, size) in sizes.into_iter().enumerate() {
            let now = ms(i as u64 * 100);
            let s = d.notify(now, size);
            assert_eq!(s.until, ms(i as u64 * 100 + 300));
            assert_eq!(s.rescheduled, i > 0);
            triggers += usize::from(d.poll(now).is_some());
        }
        assert_eq!(triggers, 0, "no trigger inside the quiet window");

        assert_eq!(d.poll(ms(599)), None);
        assert_eq!(d.poll(ms(600)), Some(Size::new(1024.0, 768.0)));
        assert_eq!(d.poll(ms(10_000)), None, "trigger fires exactly once");
        assert!(!d.is_pending());
    }

    #[test]
    fn separate_bursts_trigger_separately() {
        let mut d = ResizeDebouncer::new(QUIET);
        let _ = d.notify(ms(0), Size::new(1.0, 1.0));
        assert_eq!(d.poll(ms(300)), Some(Size::new(1.0, 1.0)));
        let s = d.notify(ms(1000), Size::new(2.0, 2.0));
        assert!(!s.rescheduled);
        assert_eq!(d.next_due(), Some(ms(1300)));
        assert_eq!(d.poll(ms(1300)), Some(Size::new(2.0, 2.0)));
    }

    #[test]
    fn cancel_drops_pending_trigger() {
        let mut d = ResizeDebouncer::new(QUIET);
        let _ = d.notify(ms(0), Size::new(5.0, 5.0));
        assert!(d.cancel());
        assert!(!d.cancel());
        assert_eq!(d.poll(ms(1000)), None);
        assert_eq!(d.next_due(), None);
    }
}
