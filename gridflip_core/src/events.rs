// Copyright 2026 the Gridflip Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lifecycle notifications.
//!
//! The grid announces the start and end of every draw pass on an
//! [`EventBus`]. Delivery is synchronous, in registration order, from inside
//! [`Grid::draw`](crate::grid::Grid::draw) and
//! [`Grid::advance`](crate::grid::Grid::advance).

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use crate::reveal::PassToken;

/// A lifecycle event of the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    /// A draw pass is starting.
    DrawStart,
    /// Every cell of a draw pass has been revealed.
    DrawComplete,
}

impl LifecycleEvent {
    /// Wire name of the event.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::DrawStart => "draw:start",
            Self::DrawComplete => "draw:complete",
        }
    }

    /// Parses a wire name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "draw:start" => Some(Self::DrawStart),
            "draw:complete" => Some(Self::DrawComplete),
            _ => None,
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Handle returned by [`EventBus::on`], used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Handler = Box<dyn FnMut(LifecycleEvent, PassToken)>;

struct Listener {
    id: ListenerId,
    event: LifecycleEvent,
    once: bool,
    handler: Handler,
}

/// Synchronous publish/subscribe for [`LifecycleEvent`]s.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Listener>,
    next_id: u64,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl EventBus {
    /// Creates a bus with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls `handler` every time `event` is emitted.
    pub fn on(
        &mut self,
        event: LifecycleEvent,
        handler: impl FnMut(LifecycleEvent, PassToken) + 'static,
    ) -> ListenerId {
        self.register(event, false, Box::new(handler))
    }

    /// Calls `handler` the next time `event` is emitted, then forgets it.
    pub fn once(
        &mut self,
        event: LifecycleEvent,
        handler: impl FnMut(LifecycleEvent, PassToken) + 'static,
    ) -> ListenerId {
        self.register(event, true, Box::new(handler))
    }

    /// Removes a listener. Returns `false` if it was already gone.
    pub fn off(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        self.listeners.len() != before
    }

    /// Number of listeners registered for `event`.
    #[must_use]
    pub fn listener_count(&self, event: LifecycleEvent) -> usize {
        self.listeners.iter().filter(|l| l.event == event).count()
    }

    /// Delivers `event` for `pass` to its listeners in registration order.
    /// Returns how many were called.
    pub fn emit(&mut self, event: LifecycleEvent, pass: PassToken) -> usize {
        let mut called = 0;
        for listener in self.listeners.iter_mut().filter(|l| l.event == event) {
            (listener.handler)(event, pass);
            called += 1;
        }
        self.listeners.retain(|l| !(l.once && l.event == event));
        called
    }

    fn register(&mut self, event: LifecycleEvent, once: bool, handler: Handler) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push(Listener {
            id,
            event,
            once,
            handler,
        });
        id
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::RefCell;

    use super::*;

    fn log() -> Rc<RefCell<Vec<(&'static str, u64)>>> {
        Rc::new(RefCell::new(Vec::new()))
    }

    #[test]
    fn names_round_trip() {
        for e in [LifecycleEvent::DrawStart, LifecycleEvent::DrawComplete] {
            assert_eq!(LifecycleEvent::from_name(e.name()), Some(e));
        }
        assert_eq!(LifecycleEvent::from_name("draw:end"), None);
    }

    #[test]
    fn delivers_in_registration_order() {
        let seen = log();
        let mut bus = EventBus::new();
        for tag in ["a", "b"] {
            let seen = Rc::clone(&seen);
            bus.on(LifecycleEvent::DrawStart, move |_, pass| {
                seen.borrow_mut().push((tag, pass.get()));
            });
        }
        let seen_c = Rc::clone(&seen);
        bus.on(LifecycleEvent::DrawComplete, move |_, pass| {
            seen_c.borrow_mut().push(("complete", pass.get()));
        });

        assert_eq!(bus.emit(LifecycleEvent::DrawStart, PassToken::FIRST), 2);
        assert_eq!(*seen.borrow(), vec![("a", 1), ("b", 1)]);
    }

    #[test]
    fn once_listeners_fire_a_single_time() {
        let seen = log();
        let mut bus = EventBus::new();
        let s = Rc::clone(&seen);
        bus.once(LifecycleEvent::DrawComplete, move |e, pass| {
            s.borrow_mut().push((e.name(), pass.get()));
        });

        bus.emit(LifecycleEvent::DrawStart, PassToken::FIRST);
        assert_eq!(bus.listener_count(LifecycleEvent::DrawComplete), 1);
        bus.emit(LifecycleEvent::DrawComplete, PassToken::FIRST);
        bus.emit(LifecycleEvent::DrawComplete, PassToken::FIRST.next());
        assert_eq!(*seen.borrow(), vec![("draw:complete", 1)]);
        assert_eq!(bus.listener_count(LifecycleEvent::DrawComplete), 0);
    }

    #[test]
    fn off_unsubscribes() {
        let seen = log();
        let mut bus = EventBus::new();
        let s = Rc::clone(&seen);
        let id = bus.on(LifecycleEvent::DrawStart, move |_, _| {
            s.borrow_mut().push(("x", 0));
        });
        assert!(bus.off(id));
        assert!(!bus.off(id));
        assert_eq!(bus.emit(LifecycleEvent::DrawStart, PassToken::FIRST), 0);
        assert!(seen.borrow().is_empty());
    }
}
