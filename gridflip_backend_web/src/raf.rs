// Copyright 2026 the Gridflip Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `requestAnimationFrame` pump.
//!
//! [`RafLoop`] calls back once per animation frame with the frame's
//! [`DOMHighResTimeStamp`][mdn] converted to a [`LogicalTime`]. The mount
//! uses it to run [`Grid::advance`](gridflip_core::grid::Grid::advance) and
//! present the resulting tile changes.
//!
//! [mdn]: https://developer.mozilla.org/en-US/docs/Web/API/DOMHighResTimeStamp

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};

use wasm_bindgen::JsCast as _;
use wasm_bindgen::prelude::{Closure, JsValue, wasm_bindgen};

use gridflip_core::time::LogicalTime;

// Bound as globals so a frame never has to look up `window` or
// `window.performance` first.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = performance, js_name = "now")]
    pub(crate) fn performance_now() -> f64;

    #[wasm_bindgen(js_name = "requestAnimationFrame")]
    fn request_animation_frame(callback: &JsValue) -> i32;

    #[wasm_bindgen(js_name = "cancelAnimationFrame")]
    fn cancel_animation_frame(id: i32);
}

/// A `requestAnimationFrame` loop that reports each frame's time.
///
/// Create with [`RafLoop::new`], then call [`start`](Self::start). Every
/// delivered frame books the next one until [`stop`](Self::stop) is called
/// or the `RafLoop` is dropped.
pub struct RafLoop {
    shared: Rc<FramePump>,
}

type FrameHandler = Closure<dyn FnMut(f64)>;

struct FramePump {
    /// JS-side handler, created on the first `start()` and reused after.
    handler: RefCell<Option<FrameHandler>>,
    on_frame: RefCell<Box<dyn FnMut(LogicalTime)>>,
    delivered: Cell<u64>,
    active: Cell<bool>,
    /// Handle of the outstanding frame request.
    request: Cell<i32>,
}

impl FramePump {
    /// Books the next frame if the handler exists.
    fn book(&self) {
        if let Some(handler) = self.handler.borrow().as_ref() {
            self.request
                .set(request_animation_frame(handler.as_ref().unchecked_ref()));
        }
    }

    fn deliver(&self, timestamp_ms: f64) {
        if !self.active.get() {
            return;
        }
        self.delivered.set(self.delivered.get() + 1);
        (self.on_frame.borrow_mut())(LogicalTime::from_millis_f64(timestamp_ms));
        // The callback may have stopped the loop.
        if self.active.get() {
            self.book();
        }
    }
}

impl RafLoop {
    /// Creates a loop that is **not yet running**.
    pub fn new(on_frame: impl FnMut(LogicalTime) + 'static) -> Self {
        Self {
            shared: Rc::new(FramePump {
                handler: RefCell::new(None),
                on_frame: RefCell::new(Box::new(on_frame)),
                delivered: Cell::new(0),
                active: Cell::new(false),
                request: Cell::new(0),
            }),
        }
    }

    /// Starts the loop. No-op if already running.
    pub fn start(&self) {
        if self.shared.active.replace(true) {
            return;
        }
        if self.shared.handler.borrow().is_none() {
            let pump = Rc::clone(&self.shared);
            let handler: FrameHandler =
                Closure::new(move |timestamp_ms: f64| pump.deliver(timestamp_ms));
            self.shared.handler.replace(Some(handler));
        }
        self.shared.book();
    }

    /// Stops the loop and cancels the outstanding frame request. Can be
    /// restarted with [`start`](Self::start).
    pub fn stop(&self) {
        if self.shared.active.replace(false) {
            cancel_animation_frame(self.shared.request.get());
        }
    }

    /// Whether frames are being delivered.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shared.active.get()
    }

    /// Frames delivered so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.shared.delivered.get()
    }
}

impl Drop for RafLoop {
    fn drop(&mut self) {
        self.stop();
        // The handler holds an `Rc` to the pump; release the cycle.
        self.shared.handler.replace(None);
    }
}

impl core::fmt::Debug for RafLoop {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RafLoop")
            .field("active", &self.shared.active.get())
            .field("delivered", &self.shared.delivered.get())
            .finish()
    }
}
