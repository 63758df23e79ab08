// Copyright 2025 the Interkey Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interkey Marshal: routing calls into a Sink tree owned by another thread.
//!
//! Hosts that own UI state on a dedicated thread cannot be routed into
//! directly from elsewhere. Instead the tree and its [`ScenarioContext`] are
//! moved onto a host thread with [`HostThread::spawn`], and every call becomes
//! a [`Request`] sent over a channel. The caller blocks on the matching
//! [`Response`]. Requests from any number of callers are served one at a time,
//! in arrival order.
//!
//! ```rust
//! use interkey_input::KeyMessage;
//! use interkey_marshal::HostThread;
//! use interkey_oracle::ScenarioContext;
//! use interkey_tree::{SinkKind, SinkOptions, SinkTree};
//!
//! let mut tree = SinkTree::new();
//! let root = tree.insert_root(SinkOptions::new(SinkKind::Managed).with_stops(2));
//! let host = HostThread::spawn("ui", tree, ScenarioContext::new()).unwrap();
//!
//! host.set_focus_to_first_child(root, true).unwrap();
//! assert!(host.route(root, KeyMessage::tab(false)).unwrap().handled());
//! assert_eq!(host.snapshot(root).unwrap().tab.recorded_tab_stops, 1);
//!
//! let (tree, _ctx) = host.shutdown().unwrap();
//! assert!(tree.focused().is_some());
//! ```
//!
//! This crate requires `std`.
//!
//! [`ScenarioContext`]: interkey_oracle::ScenarioContext

mod error;
mod host;
mod message;

pub use error::MarshalError;
pub use host::{HostHandle, HostThread};
pub use message::{Request, Response, Snapshot};
