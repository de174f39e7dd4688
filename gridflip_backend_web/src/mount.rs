// Copyright 2026 the Gridflip Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mounting a grid onto a page.
//!
//! ```text
//!   <img class="gridflip-image">           (source strip, found by selector)
//!   <div class="gridflip-container">       (inserted after the image)
//!     <div class="gridflip"> .box … </div> (tiles)
//!   </div>
//!   <div class="gridflip-overlay">         (height mirrors the grid)
//! ```
//!
//! The first pass is drawn once the image has loaded. Afterwards the
//! [`RafLoop`] pumps [`Grid::advance`] every frame and a
//! [`ResizeSubscription`] feeds [`Grid::resize`].

use alloc::rc::Rc;
use core::cell::RefCell;

use gridflip_core::atlas::{DEFAULT_ATLAS_WIDTH, DEFAULT_SLICE_WIDTH, ImageAtlas};
use gridflip_core::backend::Presenter;
use gridflip_core::clock::Clock as _;
use gridflip_core::config::GridConfig;
use gridflip_core::events::{LifecycleEvent, ListenerId};
use gridflip_core::grid::Grid;
use gridflip_core::reveal::PassToken;
use gridflip_core::tile::TileChanges;
use gridflip_core::time::LogicalTime;
use gridflip_core::trace::Tracer;
use wasm_bindgen::JsCast as _;
use web_sys::{Document, HtmlElement, HtmlImageElement, Window};

use crate::console::ConsoleSink;
use crate::presenter::DomPresenter;
use crate::raf::RafLoop;
use crate::subscription::{EventSubscription, ResizeSubscription, viewport};
use crate::{MountError, WebClock};

/// Selector of the source image.
pub const IMAGE_SELECTOR: &str = ".gridflip-image";

/// Class of the element wrapping the grid.
pub const CONTAINER_CLASS: &str = "gridflip-container";

/// Class of the grid element holding the tiles.
pub const GRID_CLASS: &str = "gridflip";

/// Class of the full-bleed overlay.
pub const OVERLAY_CLASS: &str = "gridflip-overlay";

struct Shared {
    window: Window,
    grid: Grid,
    presenter: DomPresenter,
    changes: TileChanges,
    console: ConsoleSink,
    clock: WebClock,
}

impl Shared {
    fn draw(&mut self) {
        let at = self.clock.now();
        let size = viewport(&self.window);
        self.grid
            .draw_traced(at, size, &mut Tracer::new(&mut self.console));
    }

    fn frame(&mut self, at: LogicalTime) {
        self.grid
            .advance_traced(at, &mut Tracer::new(&mut self.console));
        self.grid.evaluate_into(&mut self.changes);
        if !self.changes.is_empty() {
            self.presenter.apply(&self.grid, &self.changes);
        }
    }
}

/// A grid mounted on the page.
///
/// Lifecycle handlers registered with [`on`](Self::on) run inside the frame
/// callback; they must not call back into the mount synchronously.
pub struct GridMount {
    shared: Rc<RefCell<Shared>>,
    raf: RafLoop,
    resize: ResizeSubscription,
    load: Option<EventSubscription>,
}

impl core::fmt::Debug for GridMount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GridMount")
            .field("raf", &self.raf)
            .field("resize", &self.resize)
            .finish_non_exhaustive()
    }
}

impl GridMount {
    /// Mounts a grid over the stock 3456px strip of 128px slices.
    ///
    /// # Errors
    ///
    /// See [`mount_with_atlas`](Self::mount_with_atlas).
    pub fn mount(config: GridConfig) -> Result<Self, MountError> {
        Self::mount_with_atlas(config, DEFAULT_ATLAS_WIDTH, DEFAULT_SLICE_WIDTH)
    }

    /// Mounts a grid over an atlas `atlas_width` pixels wide, cut into
    /// `slice_width` slices.
    ///
    /// # Errors
    ///
    /// Returns a [`MountError`] if the window, document or source image is
    /// missing, if an element or listener cannot be created, or if the
    /// configuration is invalid.
    pub fn mount_with_atlas(
        config: GridConfig,
        atlas_width: u32,
        slice_width: u32,
    ) -> Result<Self, MountError> {
        let window = web_sys::window().ok_or(MountError::NoWindow)?;
        let document = window.document().ok_or(MountError::NoDocument)?;
        let image: HtmlImageElement = document
            .query_selector(IMAGE_SELECTOR)
            .ok()
            .flatten()
            .ok_or(MountError::MissingImage)?
            .dyn_into()
            .map_err(|_| MountError::MissingImage)?;

        let container = element(&document, CONTAINER_CLASS, "container")?;
        image
            .insert_adjacent_element("afterend", &container)
            .map_err(|_| MountError::CreateElement("container"))?;
        let grid_el = element(&document, GRID_CLASS, "grid")?;
        container
            .append_child(&grid_el)
            .map_err(|_| MountError::CreateElement("grid"))?;
        let overlay = element(&document, OVERLAY_CLASS, "overlay")?;
        container
            .insert_adjacent_element("afterend", &overlay)
            .map_err(|_| MountError::CreateElement("overlay"))?;

        let atlas = ImageAtlas::new(image.src(), atlas_width, slice_width)?;
        let mut console = ConsoleSink;
        if config.debug {
            console.atlas(atlas.url(), atlas.slice_count(), atlas.width());
        }
        let grid = Grid::new(config, atlas)?;
        let presenter = DomPresenter::new(grid_el, overlay)?;

        let shared = Rc::new(RefCell::new(Shared {
            window: window.clone(),
            grid,
            presenter,
            changes: TileChanges::default(),
            console,
            clock: WebClock,
        }));

        let frame_shared = Rc::clone(&shared);
        let raf = RafLoop::new(move |at| {
            if let Ok(mut s) = frame_shared.try_borrow_mut() {
                s.frame(at);
            }
        });

        let resize_shared = Rc::clone(&shared);
        let resize = ResizeSubscription::new(&window, move |size| {
            if let Ok(mut s) = resize_shared.try_borrow_mut() {
                let s = &mut *s;
                let _ = s
                    .grid
                    .resize_traced(s.clock.now(), size, &mut Tracer::new(&mut s.console));
            }
        })?;

        let load = if image.complete() {
            shared.borrow_mut().draw();
            None
        } else {
            let load_shared = Rc::clone(&shared);
            Some(EventSubscription::new(image.as_ref(), "load", move |_| {
                if let Ok(mut s) = load_shared.try_borrow_mut()
                    && s.grid.current_pass() == PassToken::NONE
                {
                    s.draw();
                }
            })?)
        };

        raf.start();
        Ok(Self {
            shared,
            raf,
            resize,
            load,
        })
    }

    /// Subscribes to a lifecycle event.
    pub fn on(
        &self,
        event: LifecycleEvent,
        handler: impl FnMut(LifecycleEvent, PassToken) + 'static,
    ) -> Option<ListenerId> {
        let mut s = self.shared.try_borrow_mut().ok()?;
        Some(s.grid.events_mut().on(event, handler))
    }

    /// Subscribes to the next occurrence of a lifecycle event.
    pub fn once(
        &self,
        event: LifecycleEvent,
        handler: impl FnMut(LifecycleEvent, PassToken) + 'static,
    ) -> Option<ListenerId> {
        let mut s = self.shared.try_borrow_mut().ok()?;
        Some(s.grid.events_mut().once(event, handler))
    }

    /// Removes a lifecycle listener.
    pub fn off(&self, id: ListenerId) -> bool {
        self.shared
            .try_borrow_mut()
            .is_ok_and(|mut s| s.grid.events_mut().off(id))
    }

    /// Starts a new pass for the current viewport right away. A resize
    /// redraw still waiting out its quiet period is dropped.
    pub fn redraw(&self) -> Option<PassToken> {
        let mut s = self.shared.try_borrow_mut().ok()?;
        s.draw();
        Some(s.grid.current_pass())
    }

    /// Returns `true` once the current pass has completed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.shared.try_borrow().is_ok_and(|s| s.grid.is_complete())
    }

    /// Stops the frame loop and removes every listener. The elements stay
    /// in the page.
    pub fn dispose(&mut self) {
        self.raf.stop();
        self.resize.dispose();
        if let Some(mut load) = self.load.take() {
            load.dispose();
        }
        if let Ok(mut s) = self.shared.try_borrow_mut() {
            s.grid.cancel_redraw();
        }
    }
}

impl Drop for GridMount {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn element(
    document: &Document,
    class: &str,
    what: &'static str,
) -> Result<HtmlElement, MountError> {
    let el: HtmlElement = document
        .create_element("div")
        .map_err(|_| MountError::CreateElement(what))?
        .unchecked_into();
    el.set_class_name(class);
    Ok(el)
}
