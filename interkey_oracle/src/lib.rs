// Copyright 2025 the Interkey Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interkey Oracle: observation logs for keyboard-routing scenarios.
//!
//! Routing callbacks write into a [`ScenarioContext`]; a verification harness
//! reads it back. Two halves:
//!
//! - **Recorded** state ([`AcceleratorTestState`], [`TabTestState`], mnemonic
//!   counters, and the per-event [`Visit`] trace): what routing did. Zeroed by
//!   [`ScenarioContext::reset`].
//! - **Expected** state ([`ExpectedAccelTestState`], [`ExpectedTabTestState`]):
//!   what the scenario is configured to test. Applying it to a tree selects the
//!   precedence mode, Site policies, and TAB handling.
//!
//! The context is an ordinary value passed by `&mut` into every routing call.
//! Two scenarios running side by side each own their own context.
//!
//! ## Features
//!
//! - `std` (default): forwards `std` to `tracing` and the sibling crates.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod context;
mod expected;
mod recorded;

pub use context::ScenarioContext;
pub use expected::{AccelTestType, ExpectedAccelTestState, ExpectedTabTestState, TabTestType};
pub use recorded::{AcceleratorTestState, TabTestState, Visit};
