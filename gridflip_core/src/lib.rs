// Copyright 2026 the Gridflip Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout, scheduling and reconciliation for a responsive flip-reveal tile
//! grid.
//!
//! `gridflip_core` covers a viewport with square tiles cut from a single
//! image strip and reveals them one by one (or all at once) with a flip
//! transition. It is `no_std` compatible (with `alloc`) and never reads a
//! clock itself: every entry point takes a [`LogicalTime`](time::LogicalTime),
//! so a whole pass can be stepped deterministically in tests.
//!
//! # Architecture
//!
//! ```text
//!   Backend (clock, resize source, frame pump)
//!       │
//!       ├── resize ──► ResizeDebouncer ──(quiet period)──┐
//!       │                                                 ▼
//!       ├── draw ───► GridGeometry ──► RevealScheduler ──► TimerQueue
//!       │                                                 │
//!       └── advance ◄─────────────── due actions ─────────┘
//!               │
//!               ▼
//!   TileStore::materialize / reveal ──► evaluate() ──► TileChanges
//!               │                                          │
//!               ▼                                          ▼
//!   EventBus (draw:start, draw:complete)          Presenter::apply()
//! ```
//!
//! **[`geometry`]** — Viewport to rows, columns and cell count, with the
//! one-cell overshoot policy.
//!
//! **[`atlas`]** — Cyclic mapping from cells to image slices.
//!
//! **[`reveal`]** — Per-pass reveal bookkeeping: pass tokens, the per-cell
//! state machine, completion detection.
//!
//! **[`debounce`]** — Collapses resize bursts into one redraw.
//!
//! **[`grid`]** — The [`Grid`](grid::Grid) orchestrator and its single
//! `advance` loop.
//!
//! **[`tile`]** — Tile store with pure placement decisions and dirty
//! tracking via `understory_dirty` (channels in [`dirty`]).
//!
//! **[`timer`]** — Deferred actions on the logical timeline.
//!
//! **[`events`]** — `draw:start` / `draw:complete` lifecycle bus.
//!
//! **[`backend`]** — The [`Presenter`](backend::Presenter) trait.
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) trait and event types,
//! with the [`Tracer`](trace::Tracer) wrapper used by the grid in debug mode.
//!
//! **[`config`]**, **[`time`]**, **[`clock`]** — Configuration presets,
//! logical time types, and injectable clocks.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod atlas;
pub mod backend;
pub mod clock;
pub mod config;
pub mod debounce;
pub mod dirty;
pub mod events;
pub mod geometry;
pub mod grid;
pub mod reveal;
pub mod tile;
pub mod time;
pub mod timer;
pub mod trace;
