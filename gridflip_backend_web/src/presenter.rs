// Copyright 2026 the Gridflip Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DOM element management.
//!
//! Translates tile state into `.box` elements inside the grid element by
//! applying incremental updates from [`TileChanges`]. Each box has the
//! markup
//!
//! ```html
//! <div class="box flipped">
//!   <div class="images"><div class="front"></div><div class="back"></div></div>
//! </div>
//! ```
//!
//! and the page stylesheet supplies the flip transition on `.flipped`.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use gridflip_core::backend::Presenter;
use gridflip_core::grid::Grid;
use gridflip_core::tile::{Tile, TileChanges};
use wasm_bindgen::JsCast as _;
use web_sys::{Document, HtmlElement};

use crate::MountError;

/// Class of a tile element.
pub const BOX_CLASS: &str = "box";

/// Class carried by a tile while it shows its back face.
pub const FLIPPED_CLASS: &str = "flipped";

/// Maps grid tiles to live DOM elements.
///
/// The presenter owns the grid element, to which tile `<div>`s are added,
/// replaced and removed, and the overlay, whose height tracks the grid.
pub struct DomPresenter {
    document: Document,
    grid: HtmlElement,
    overlay: HtmlElement,
    elements: Vec<Option<HtmlElement>>,
}

impl core::fmt::Debug for DomPresenter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DomPresenter")
            .field("grid", &"HtmlElement")
            .field("overlay", &"HtmlElement")
            .field("elements_len", &self.elements.len())
            .finish_non_exhaustive()
    }
}

impl DomPresenter {
    /// Creates a presenter that manages the children of `grid`.
    ///
    /// # Errors
    ///
    /// Returns [`MountError::NoDocument`] if `grid` is not attached to a
    /// document.
    pub fn new(grid: HtmlElement, overlay: HtmlElement) -> Result<Self, MountError> {
        let document = grid.owner_document().ok_or(MountError::NoDocument)?;
        Ok(Self {
            document,
            grid,
            overlay,
            elements: Vec::new(),
        })
    }

    /// The grid element.
    #[must_use]
    pub fn grid_element(&self) -> &HtmlElement {
        &self.grid
    }

    /// Returns the DOM element for `cell`, if it exists.
    #[must_use]
    pub fn get_element(&self, cell: u32) -> Option<&HtmlElement> {
        self.elements
            .get(cell as usize)
            .and_then(|slot| slot.as_ref())
    }

    fn take_element(&mut self, cell: u32) -> Option<HtmlElement> {
        self.elements.get_mut(cell as usize)?.take()
    }

    fn put_element(&mut self, cell: u32, el: HtmlElement) {
        let slot = cell as usize;
        if self.elements.len() <= slot {
            self.elements.resize_with(slot + 1, || None);
        }
        self.elements[slot] = Some(el);
    }

    fn div(&self, class: &str) -> Option<HtmlElement> {
        let el: HtmlElement = self.document.create_element("div").ok()?.unchecked_into();
        el.set_class_name(class);
        Some(el)
    }

    /// Builds the element for `tile`. `None` if the document refuses to
    /// create elements.
    fn build_box(&self, grid: &Grid, tile: &Tile) -> Option<HtmlElement> {
        let size = px(grid.geometry().tile_size);
        let el = self.div(&box_class(tile.flipped))?;
        let images = self.div("images")?;
        let front = self.div("front")?;
        let back = self.div("back")?;

        let atlas = grid.atlas();
        let fs = front.style();
        let _ = fs.set_property("background-image", &format!("url({})", atlas.url()));
        let _ = fs.set_property(
            "background-position",
            &background_position(atlas.background_offset(tile.slice)),
        );
        for part in [&el, &front, &back] {
            let _ = part.style().set_property("width", &size);
            let _ = part.style().set_property("height", &size);
        }
        if tile.suppressed {
            let _ = el.style().set_property("display", "none");
        }
        let _ = images.append_child(&front);
        let _ = images.append_child(&back);
        let _ = el.append_child(&images);
        Some(el)
    }
}

impl Presenter for DomPresenter {
    fn apply(&mut self, grid: &Grid, changes: &TileChanges) {
        // 1. Container and overlay size
        if let Some(layout) = &changes.layout {
            let s = self.grid.style();
            let _ = s.set_property("width", &px(layout.geometry.container.width));
            let _ = s.set_property("height", &px(layout.geometry.container.height));
            let _ = self
                .overlay
                .style()
                .set_property("height", &px(layout.overlay_height));
        }

        // 2. Removals
        for &cell in &changes.removed {
            if let Some(el) = self.take_element(cell) {
                el.remove();
            }
        }

        // 3. Insertions and in-place replacements
        for &cell in changes.inserted.iter().chain(&changes.replaced) {
            let Some(tile) = grid.tile(cell) else {
                continue;
            };
            let Some(el) = self.build_box(grid, tile) else {
                continue;
            };
            match self.take_element(cell) {
                Some(old) => {
                    let _ = old.replace_with_with_node_1(&el);
                }
                None => {
                    let _ = self.grid.append_child(&el);
                }
            }
            self.put_element(cell, el);
        }

        // 4. Reveals
        for &cell in &changes.revealed {
            if let Some(el) = self.get_element(cell) {
                let _ = el.class_list().remove_1(FLIPPED_CLASS);
            }
        }

        // 5. Suppression while a resize settles
        for &cell in &changes.suppressed {
            if let Some(el) = self.get_element(cell) {
                let _ = el.style().set_property("display", "none");
            }
        }
    }
}

/// CSS pixel length.
fn px(v: f64) -> String {
    format!("{v}px")
}

/// `class` attribute of a tile element.
fn box_class(flipped: bool) -> String {
    if flipped {
        format!("{BOX_CLASS} {FLIPPED_CLASS}")
    } else {
        String::from(BOX_CLASS)
    }
}

/// `background-position` bringing a slice into view. Both axes are set
/// because some engines reject `background-position-x` alone.
fn background_position(offset: f64) -> String {
    format!("{offset}px 0")
}
