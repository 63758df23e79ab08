// Copyright 2025 the Interkey Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interkey Input: keyboard vocabulary shared by every Sink.
//!
//! This crate defines the raw data a host hands to the router and the
//! per-Sink binding tables the router consults:
//!
//! - [`KeyMessage`]: a message kind, a [`Key`], and [`Modifiers`].
//! - [`Chord`]: the modifier+key unit accelerators bind to. Matching is exact on modifiers.
//! - [`AcceleratorTable`]: ordered, chord-unique [`Binding`]s plus the owner's [`PrecedenceMode`].
//! - [`MnemonicSet`]: case-insensitive Alt+letter shortcuts.
//!
//! ## Minimal example
//!
//! ```rust
//! use interkey_input::{
//!     AcceleratorTable, Chord, CommandId, MnemonicSet, Modifiers, PrecedenceMode,
//! };
//!
//! let mut table = AcceleratorTable::with_precedence(PrecedenceMode::ParentFirst);
//! table.bind(Chord::ctrl('w'), CommandId(0xFF)).unwrap();
//!
//! let mut mnemonics = MnemonicSet::new();
//! mnemonics.add('p', Modifiers::ALT).unwrap();
//! assert!(mnemonics.matches('P', Modifiers::ALT));
//! ```
//!
//! ## Features
//!
//! - `std` (default): implements `std::error::Error` for [`BindingError`] through `thiserror`.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod error;
mod mnemonic;
mod table;
mod types;

pub use error::BindingError;
pub use mnemonic::{Mnemonic, MnemonicSet};
pub use table::{AcceleratorTable, Binding};
pub use types::{Chord, CommandId, Key, KeyMessage, MessageKind, Modifiers, PrecedenceMode};
