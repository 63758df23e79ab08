// Copyright 2025 the Interkey Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Accelerator precedence and override shadowing.
//!
//! A native root hosts a managed child. Both bind Ctrl+A. The child holds
//! focus. Each scenario configures the tree through the oracle's expectations,
//! presses Ctrl+A once, and reports which Sink's counter moved.
//!
//! Run:
//! - `RUST_LOG=trace cargo run -p interkey_demos --example accelerator_precedence`

use std::error::Error;

use interkey_input::{Chord, CommandId, Key, KeyMessage, Modifiers};
use interkey_oracle::{AccelTestType, ExpectedAccelTestState, ScenarioContext};
use interkey_router::{dispatch_for, route, set_focus_to_first_child};
use interkey_tree::{SinkKind, SinkOptions, SinkTree};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut tree = SinkTree::new();
    let root = tree.insert_root(SinkOptions::new(SinkKind::Native).with_stops(1));
    let child = tree.add_child(root, SinkOptions::new(SinkKind::Managed).with_stops(1))?;
    tree.bind_accelerator(root, Chord::ctrl('a'), CommandId(1))?;
    tree.bind_accelerator(child, Chord::ctrl('a'), CommandId(2))?;

    let mut ctx = ScenarioContext::new();
    set_focus_to_first_child(&mut tree, child, &mut ctx, true);
    let press = KeyMessage::key_down(Key::char('a'), Modifiers::CONTROL);

    for test_type in [AccelTestType::ChildOverride, AccelTestType::ParentFirst] {
        ctx.reset();
        ctx.set_expected_accelerator_state(ExpectedAccelTestState::new(test_type));
        ctx.configure(&mut tree);
        info!(?test_type, sequence = ?dispatch_for(&tree, root), "dispatch sequence");

        let routed = route(&mut tree, root, &mut ctx, &press);
        println!(
            "{test_type:?}: {routed:?}; root fired {}, child fired {}",
            ctx.recorded_accelerator_state(root).sum_command,
            ctx.recorded_accelerator_state(child).sum_command
        );
    }

    // A stop override wins even when the root is parent-first.
    let focused = tree.focused().ok_or("focus was seeded")?;
    tree.bind_override(focused, Chord::ctrl('a'), CommandId(3))?;
    ctx.reset();
    route(&mut tree, root, &mut ctx, &press);
    println!(
        "stop override under ParentFirst: child command 3 fired {} time(s)",
        ctx.recorded_accelerator_state(child).count(CommandId(3))
    );
    Ok(())
}
