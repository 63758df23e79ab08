// Copyright 2025 the Interkey Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interkey Tree: the structure keyboard routing runs over.
//!
//! A [`SinkTree`] holds heterogeneous hosts ("Sinks") in a generational arena.
//! Each Sink owns an ordered tab sequence of [`Slot`]s, its own focus stops
//! interleaved with nested child Sinks, plus an accelerator table, override
//! layers, and a mnemonic set. Attaching a child installs a [`Site`] in it: the
//! edge record the child uses to hand tab overflow back to its parent.
//!
//! - [`SinkId`]: generational handle of a Sink.
//! - [`FocusStopId`]: handle of a focus stop, minted by its owning Sink.
//! - [`SinkKind`]: the closed set of host kinds and which may host which.
//! - [`SinkOptions`]: construction-time configuration.
//! - [`AttachmentError`] / [`TreeError`]: construction failures.
//!
//! The tree records which single stop is focused. It answers the containment
//! queries routing needs ([`SinkTree::has_focus_within`],
//! [`SinkTree::child_sink_with_focus`], [`SinkTree::focus_path`]) but makes no
//! routing decisions itself.
//!
//! ## Features
//!
//! - `std` (default): forwards `std` to `tracing`, `thiserror`, and the sibling crates.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod error;
mod tree;
mod types;

pub use error::{AttachmentError, TreeError};
pub use tree::{DepthFirst, SinkTree};
pub use types::{FocusStopId, SinkId, SinkKind, SinkOptions, Site, Slot};
