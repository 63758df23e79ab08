// Copyright 2025 the Interkey Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tab navigation across a managed root, an embedded child, and a nested grandchild.
//!
//! The same tree is walked twice: once with a `Stop` root Site, where the last
//! tab leaves the tree, and once with a `Loop` root Site, where it wraps.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p interkey_demos --example tab_overflow`

use std::error::Error;

use interkey_focus::TabPolicy;
use interkey_input::KeyMessage;
use interkey_oracle::ScenarioContext;
use interkey_router::{Routed, route, set_focus_to_first_child};
use interkey_tree::{SinkId, SinkKind, SinkOptions, SinkTree};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn build(root_policy: TabPolicy) -> Result<(SinkTree, SinkId), Box<dyn Error>> {
    let mut tree = SinkTree::new();
    let root = tree.insert_root(SinkOptions::new(SinkKind::Managed).with_stops(1));
    tree.install_root_site(root, root_policy)?;
    let child = tree.add_child(root, SinkOptions::new(SinkKind::Embedded).with_stops(2))?;
    tree.add_child(child, SinkOptions::new(SinkKind::Managed).with_stops(1))?;
    tree.add_stop(root)?;
    Ok((tree, root))
}

fn walk(root_policy: TabPolicy) -> Result<(), Box<dyn Error>> {
    let (mut tree, root) = build(root_policy)?;
    let mut ctx = ScenarioContext::new();
    set_focus_to_first_child(&mut tree, root, &mut ctx, true);
    info!(?root_policy, start = ?tree.focused(), "walking forward");

    for step in 1..=6 {
        let routed = route(&mut tree, root, &mut ctx, &KeyMessage::tab(false));
        match routed {
            Routed::Navigation(outcome) => {
                println!("{root_policy:?} tab {step}: {outcome:?}");
            }
            other => println!("{root_policy:?} tab {step}: unexpected {other:?}"),
        }
    }
    println!(
        "{root_policy:?}: {} tab landings, root overflowed {} time(s)",
        ctx.total_tab_stops(),
        ctx.recorded_tab_state(root).overflows
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    walk(TabPolicy::Stop)?;
    walk(TabPolicy::Loop)?;
    Ok(())
}
