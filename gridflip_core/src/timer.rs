// Copyright 2026 the Gridflip Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deferred actions on the logical timeline.
//!
//! [`TimerQueue`] is the shared timer facility every deferred step goes
//! through: staggered materialize steps, flip reveals, and the debounced
//! redraw. Nothing here reads a clock; the owner pops whatever is due at the
//! time it is told, which keeps "what happens at time T" separate from "how
//! the host wakes us up".
//!
//! Entries fire in `(due, insertion)` order, so two actions due at the same
//! instant run in the order they were scheduled.

use alloc::collections::{BTreeSet, BinaryHeap};
use core::cmp::Ordering;
use core::fmt;

use crate::time::LogicalTime;

/// Handle to a scheduled entry, used for cancellation.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

impl fmt::Debug for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimerId({})", self.0)
    }
}

/// An entry that has come due.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Due<T> {
    /// Handle the entry was scheduled under.
    pub id: TimerId,
    /// Time the entry was scheduled for (may be earlier than the pop time).
    pub due: LogicalTime,
    /// The deferred action.
    pub payload: T,
}

struct Entry<T> {
    due: LogicalTime,
    seq: u64,
    payload: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    // Reversed so the max-heap yields the earliest entry first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// A min-queue of deferred actions keyed by due time.
pub struct TimerQueue<T> {
    heap: BinaryHeap<Entry<T>>,
    pending: BTreeSet<u64>,
    next_seq: u64,
}

impl<T> fmt::Debug for TimerQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerQueue")
            .field("pending", &self.pending.len())
            .field("next_due", &self.next_due())
            .finish_non_exhaustive()
    }
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            pending: BTreeSet::new(),
            next_seq: 0,
        }
    }

    /// Schedules `payload` to fire at `due`.
    pub fn schedule(&mut self, due: LogicalTime, payload: T) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry { due, seq, payload });
        self.pending.insert(seq);
        TimerId(seq)
    }

    /// Cancels a pending entry. Returns `false` if it already fired or was
    /// cancelled before.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.pending.remove(&id.0)
    }

    /// Returns `true` if `id` is still waiting to fire.
    #[must_use]
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.contains(&id.0)
    }

    /// Removes and returns the earliest entry due at or before `now`.
    pub fn pop_due(&mut self, now: LogicalTime) -> Option<Due<T>> {
        loop {
            let head = self.heap.peek()?;
            if head.due > now {
                return None;
            }
            let entry = self.heap.pop()?;
            if self.pending.remove(&entry.seq) {
                return Some(Due {
                    id: TimerId(entry.seq),
                    due: entry.due,
                    payload: entry.payload,
                });
            }
            // Cancelled; drop it and keep looking.
        }
    }

    /// Due time of the earliest live entry, discarding cancelled entries at
    /// the head of the queue on the way.
    pub fn peek_due(&mut self) -> Option<LogicalTime> {
        while let Some(head) = self.heap.peek() {
            if self.pending.contains(&head.seq) {
                return Some(head.due);
            }
            self.heap.pop();
        }
        None
    }

    /// Due time of the earliest live entry.
    #[must_use]
    pub fn next_due(&self) -> Option<LogicalTime> {
        // Cancelled entries linger in the heap until popped, so scan in order.
        self.heap
            .iter()
            .filter(|e| self.pending.contains(&e.seq))
            .map(|e| e.due)
            .min()
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` when nothing is scheduled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.heap.clear();
        self.pending.clear();
    }
}
