// Copyright 2026 the Gridflip Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web example: a full-viewport flip-reveal grid.
//!
//! Mounts a [`GridMount`] over the `.gridflip-image` in `index.html` and logs
//! the lifecycle events to the console. Append `?eager`, `?noflip` or
//! `?debug` to the page URL to switch the corresponding options on.
//!
//! Build with: `wasm-pack build --target web demos/web_grid`
//!
//! Then serve `demos/web_grid/` (with a `tiles.jpg` strip next to
//! `index.html`) and open it in a browser.

// This crate only runs in the browser; suppress dead-code warnings when
// cargo-checking on a native host target.
#![no_std]
#![cfg_attr(
    not(target_arch = "wasm32"),
    allow(dead_code, reason = "this crate only runs in the browser")
)]

extern crate alloc;

use alloc::format;
use alloc::string::String;

use wasm_bindgen::prelude::*;

use gridflip_backend_web::GridMount;
use gridflip_core::config::GridConfig;
use gridflip_core::events::LifecycleEvent;

/// Builds the configuration from URL query flags.
fn config_from_query(query: &str) -> GridConfig {
    let mut config = GridConfig::staggered();
    for flag in query.trim_start_matches('?').split('&') {
        match flag {
            "eager" => config = config.with_all_at_once(true),
            "noflip" => config = config.with_flip(false),
            "debug" => config = config.with_debug(true),
            _ => {}
        }
    }
    config
}

fn query() -> String {
    web_sys::window()
        .and_then(|w| w.location().search().ok())
        .unwrap_or_default()
}

/// Entry point, called automatically by `wasm_bindgen(start)`.
#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    let config = config_from_query(&query());
    let mount = GridMount::mount(config).map_err(|e| JsValue::from_str(&format!("{e}")))?;

    for event in [LifecycleEvent::DrawStart, LifecycleEvent::DrawComplete] {
        mount.on(event, |event, pass| {
            web_sys::console::log_1(&JsValue::from_str(&format!("{event} {pass}")));
        });
    }

    // The grid lives as long as the page.
    core::mem::forget(mount);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_flags_toggle_options() {
        assert_eq!(config_from_query(""), GridConfig::staggered());
        let c = config_from_query("?eager&debug");
        assert!(c.all_at_once);
        assert!(c.debug);
        assert!(c.use_flip);
        assert!(!config_from_query("?noflip").use_flip);
    }
}
