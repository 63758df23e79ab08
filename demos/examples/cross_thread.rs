// Copyright 2025 the Interkey Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Routing into a tree owned by another thread.
//!
//! The tree lives on a host thread. Two caller threads press keys at it
//! through the request channel; every call blocks until the host replies.
//!
//! Run:
//! - `RUST_LOG=interkey_marshal=debug cargo run -p interkey_demos --example cross_thread`

use std::error::Error;
use std::thread;

use interkey_focus::TabPolicy;
use interkey_input::{Chord, CommandId, Key, KeyMessage, Modifiers};
use interkey_marshal::{HostThread, Request, Response};
use interkey_oracle::{ExpectedAccelTestState, ExpectedTabTestState, ScenarioContext, TabTestType};
use interkey_tree::{SinkKind, SinkOptions, SinkTree};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_thread_names(true)
        .init();

    let mut tree = SinkTree::new();
    let root = tree.insert_root(SinkOptions::new(SinkKind::ForeignToolkit).with_stops(1));
    tree.install_root_site(root, TabPolicy::Stop)?;
    let host = HostThread::spawn("foreign-ui", tree, ScenarioContext::new())?;

    let Response::Sink(panel) = host.call(Request::AddChild {
        parent: root,
        options: SinkOptions::new(SinkKind::Managed).with_stops(2),
    })?
    else {
        return Err("host did not return a sink".into());
    };
    host.call(Request::BindAccelerator {
        sink: panel,
        chord: Chord::ctrl('r'),
        command: CommandId(42),
    })?;
    host.configure(
        ExpectedAccelTestState::default(),
        ExpectedTabTestState::new(TabTestType::Loop, 3),
    )?;
    host.set_focus_to_first_child(root, true)?;

    let refresh = KeyMessage::key_down(Key::char('r'), Modifiers::CONTROL);
    thread::scope(|s| {
        s.spawn(|| {
            for _ in 0..4 {
                if let Ok(routed) = host.route(root, KeyMessage::tab(false)) {
                    println!("tab: {routed:?}");
                }
            }
        });
        s.spawn(|| {
            for _ in 0..2 {
                if let Ok(routed) = host.route(root, refresh) {
                    println!("ctrl+r: {routed:?}");
                }
            }
        });
    });

    let snapshot = host.snapshot(panel)?;
    println!(
        "panel: {} of {} expected tab landings, command 42 fired {} time(s)",
        snapshot.tab.recorded_tab_stops,
        snapshot.expected_tab_stops,
        snapshot.accelerator.count(CommandId(42))
    );
    let (_, ctx) = host.shutdown()?;
    println!("total commands recorded: {}", ctx.total_commands());
    Ok(())
}
