// Copyright 2026 the Gridflip Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DOM event subscriptions with explicit disposal.
//!
//! Each grid registers its own listeners with `addEventListener` and removes
//! them again with [`dispose`](EventSubscription::dispose) (or on drop).
//! Nothing is written to `window.onresize`, so several grids on one page
//! never replace each other's handler.

use alloc::boxed::Box;

use kurbo::Size;
use wasm_bindgen::JsCast as _;
use wasm_bindgen::closure::Closure;
use web_sys::{Event, EventTarget, Window};

use crate::MountError;

type Listener = Closure<dyn FnMut(Event)>;

/// A listener registered on an [`EventTarget`], removed on dispose or drop.
pub struct EventSubscription {
    target: EventTarget,
    event: &'static str,
    closure: Option<Listener>,
}

impl core::fmt::Debug for EventSubscription {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventSubscription")
            .field("event", &self.event)
            .field("active", &self.is_active())
            .finish_non_exhaustive()
    }
}

impl EventSubscription {
    /// Registers `handler` for `event` on `target`.
    ///
    /// # Errors
    ///
    /// Returns [`MountError::Listener`] if the browser refuses the listener.
    pub fn new(
        target: &EventTarget,
        event: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, MountError> {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        target
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .map_err(|_| MountError::Listener(event))?;
        Ok(Self {
            target: target.clone(),
            event,
            closure: Some(closure),
        })
    }

    /// Returns `true` until the subscription is disposed.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.closure.is_some()
    }

    /// Removes the listener. Idempotent.
    pub fn dispose(&mut self) {
        if let Some(closure) = self.closure.take() {
            let _ = self
                .target
                .remove_event_listener_with_callback(self.event, closure.as_ref().unchecked_ref());
        }
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Forwards window resizes, with the new viewport, to a callback.
#[derive(Debug)]
pub struct ResizeSubscription {
    inner: EventSubscription,
}

impl ResizeSubscription {
    /// Subscribes `on_resize` to `resize` events on `window`.
    ///
    /// # Errors
    ///
    /// Returns [`MountError::Listener`] if the listener cannot be added.
    pub fn new(
        window: &Window,
        mut on_resize: impl FnMut(Size) + 'static,
    ) -> Result<Self, MountError> {
        let source = window.clone();
        let inner = EventSubscription::new(window.as_ref(), "resize", move |_event| {
            on_resize(viewport(&source));
        })?;
        Ok(Self { inner })
    }

    /// Returns `true` until the subscription is disposed.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.inner.is_active()
    }

    /// Stops forwarding resizes. Idempotent.
    pub fn dispose(&mut self) {
        self.inner.dispose();
    }
}

/// Current `innerWidth` × `innerHeight` of `window`, or zero if unavailable.
#[must_use]
pub fn viewport(window: &Window) -> Size {
    let read = |v: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>| {
        v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
    };
    Size::new(read(window.inner_width()), read(window.inner_height()))
}
