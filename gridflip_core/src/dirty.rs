// Copyright 2026 the Gridflip Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants for tiles.
//!
//! Tile mutations mark one of these channels (via [`understory_dirty`]) keyed
//! by cell index. None of them propagate: a tile's presentation never depends
//! on another tile's.
//!
//! - [`CONTENT`] — a tile was inserted or replaced (new slice, new flip state).
//! - [`FLIP`] — a tile was revealed (flip removed).
//! - [`VISIBILITY`] — a tile was suppressed while a resize settles.
//!
//! [`TileStore::evaluate`](crate::tile::TileStore::evaluate) drains all
//! channels into [`TileChanges`](crate::tile::TileChanges) for presenters.

use understory_dirty::Channel;

/// Tile inserted or replaced.
pub const CONTENT: Channel = Channel::new(0);

/// Tile revealed.
pub const FLIP: Channel = Channel::new(1);

/// Tile hidden pending a redraw.
pub const VISIBILITY: Channel = Channel::new(2);
