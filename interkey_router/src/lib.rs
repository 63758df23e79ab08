// Copyright 2025 the Interkey Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interkey Router: keyboard routing over a [`SinkTree`].
//!
//! Three protocols run over the same tree, each reporting what it did into a
//! [`ScenarioContext`]:
//!
//! - **Accelerators** ([`translate_accelerator`]): a chord resolves along the
//!   focus path. Override layers win innermost first; ordinary tables follow in
//!   each Sink's [`PrecedenceMode`](interkey_input::PrecedenceMode). At most one
//!   command fires per event.
//! - **Tab navigation** ([`navigate`], [`tab_into`], [`on_no_more_tab_stops`]):
//!   focus walks a Sink's slots; a Sink that runs out reports to its Site, which
//!   either hands focus to a neighbor (`Stop`) or has the Sink wrap (`Loop`).
//! - **Mnemonics** ([`on_mnemonic`]): Alt+character is broadcast depth-first and
//!   the first owner takes it, regardless of focus.
//!
//! [`route`] classifies a raw [`KeyMessage`] and picks the protocol.
//! [`MessageFilter`] fronts native roots that receive messages through the
//! host's message loop.
//!
//! ## Example
//!
//! ```rust
//! use interkey_input::{Chord, CommandId, Key, KeyMessage, Modifiers};
//! use interkey_oracle::ScenarioContext;
//! use interkey_router::{Routed, TabOutcome, route, set_focus_to_first_child};
//! use interkey_tree::{SinkKind, SinkOptions, SinkTree};
//!
//! let mut tree = SinkTree::new();
//! let root = tree.insert_root(SinkOptions::new(SinkKind::Managed).with_stops(1));
//! let child = tree
//!     .add_child(root, SinkOptions::new(SinkKind::Embedded).with_stops(1))
//!     .unwrap();
//! tree.bind_accelerator(child, Chord::ctrl('s'), CommandId(1)).unwrap();
//!
//! let mut ctx = ScenarioContext::new();
//! set_focus_to_first_child(&mut tree, root, &mut ctx, true);
//!
//! // Tab moves into the child.
//! let outcome = route(&mut tree, root, &mut ctx, &KeyMessage::tab(false));
//! let stop = tree.focus_stops_of(child).next().unwrap();
//! assert_eq!(outcome, Routed::Navigation(TabOutcome::Moved(stop)));
//!
//! // Ctrl+S now reaches the child's table.
//! let save = KeyMessage::key_down(Key::char('s'), Modifiers::CONTROL);
//! assert!(route(&mut tree, root, &mut ctx, &save).handled());
//! assert_eq!(ctx.recorded_accelerator_state(child).sum_command, 1);
//! ```
//!
//! ## Features
//!
//! - `std` (default): forwards `std` to `tracing` and the sibling crates.
//!
//! This crate is `no_std`.

#![no_std]

#[cfg(test)]
extern crate alloc;

mod accelerator;
pub mod dispatcher;
mod filter;
mod mnemonic;
mod tab;


pub use accelerator::{AcceleratorDispatch, Layer, dispatch_for, translate_accelerator};
pub use filter::MessageFilter;
pub use mnemonic::on_mnemonic;
pub use tab::{
    TabOutcome, entry_stop, navigate, on_no_more_tab_stops, set_focus_to_first_child, tab_into,
};

use interkey_focus::Navigation;
use interkey_input::{Key, KeyMessage, MessageKind, Modifiers};
use interkey_oracle::ScenarioContext;
use interkey_tree::{SinkId, SinkTree};
use tracing::trace;

/// What [`route`] did with a message.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Routed {
    /// The message was TAB or Shift+TAB.
    Navigation(TabOutcome),
    /// The message was offered to accelerator tables; `true` if one fired.
    Accelerator(bool),
    /// The message was broadcast as a mnemonic; `true` if a Sink owned it.
    Mnemonic(bool),
    /// The message is not a routing event (key-up, plain characters).
    Ignored,
}

impl Routed {
    /// Returns true if the message was consumed.
    pub const fn handled(self) -> bool {
        match self {
            Self::Navigation(outcome) => outcome.handled(),
            Self::Accelerator(hit) | Self::Mnemonic(hit) => hit,
            Self::Ignored => false,
        }
    }
}

/// Route one raw message into the tree rooted at `root`.
///
/// - TAB without Control, Alt, or Meta navigates (Shift reverses).
/// - `SysChar` is a mnemonic.
/// - Alt+character key-down tries mnemonics, then accelerators.
/// - Any other key-down with a command modifier, and function keys, go to
///   accelerators.
///
/// Starts a fresh visit trace in `ctx`.
pub fn route(
    tree: &mut SinkTree,
    root: SinkId,
    ctx: &mut ScenarioContext,
    msg: &KeyMessage,
) -> Routed {
    ctx.begin_event();
    let mods = msg.modifiers;
    let routed = match (msg.kind, msg.key) {
        (MessageKind::SysChar, Key::Char(c)) => {
            Routed::Mnemonic(on_mnemonic(tree, root, ctx, c, mods))
        }
        (MessageKind::KeyDown | MessageKind::SysKeyDown, Key::Tab) if !mods.is_command() => {
            let nav = Navigation::from_shift(mods.contains(Modifiers::SHIFT));
            Routed::Navigation(navigate(tree, root, ctx, nav))
        }
        (MessageKind::KeyDown | MessageKind::SysKeyDown, Key::Char(c))
            if mods.contains(Modifiers::ALT)
                && !mods.intersects(Modifiers::CONTROL | Modifiers::META) =>
        {
            if on_mnemonic(tree, root, ctx, c, mods) {
                Routed::Mnemonic(true)
            } else {
                Routed::Accelerator(translate_accelerator(tree, root, ctx, msg))
            }
        }
        (MessageKind::KeyDown | MessageKind::SysKeyDown, key)
            if mods.is_command() || matches!(key, Key::Function(_)) =>
        {
            Routed::Accelerator(translate_accelerator(tree, root, ctx, msg))
        }
        _ => Routed::Ignored,
    };
    trace!(?root, ?msg, ?routed, "routed message");
    routed
}

#[cfg(test)]
mod tests {
    use super::*;
    use interkey_input::{Chord, CommandId};
    use interkey_tree::{SinkKind, SinkOptions};

    fn tree() -> (SinkTree, SinkId) {
        let mut tree = SinkTree::new();
        let root = tree.insert_root(SinkOptions::new(SinkKind::Managed).with_stops(2));
        (tree, root)
    }

    #[test]
    fn key_up_and_plain_chars_are_ignored() {
        let (mut tree, root) = tree();
        let mut ctx = ScenarioContext::new();
        let up = KeyMessage::key_up(Key::Tab, Modifiers::empty());
        assert_eq!(route(&mut tree, root, &mut ctx, &up), Routed::Ignored);
        let plain = KeyMessage::key_down(Key::char('a'), Modifiers::empty());
        assert_eq!(route(&mut tree, root, &mut ctx, &plain), Routed::Ignored);
        let typed = KeyMessage {
            kind: MessageKind::Char,
            key: Key::char('a'),
            modifiers: Modifiers::empty(),
        };
        assert!(!route(&mut tree, root, &mut ctx, &typed).handled());
    }

    #[test]
    fn control_tab_is_an_accelerator() {
        let (mut tree, root) = tree();
        let chord = Chord::new(Modifiers::CONTROL, Key::Tab);
        tree.bind_accelerator(root, chord, CommandId(9)).unwrap();
        let mut ctx = ScenarioContext::new();
        let msg = KeyMessage::key_down(Key::Tab, Modifiers::CONTROL);
        assert_eq!(
            route(&mut tree, root, &mut ctx, &msg),
            Routed::Accelerator(true)
        );
        assert_eq!(tree.focused(), None, "focus did not move");
    }

    #[test]
    fn alt_char_prefers_mnemonic_then_falls_back() {
        let (mut tree, root) = tree();
        tree.add_mnemonic(root, 'f', Modifiers::ALT).unwrap();
        let alt_g = Chord::new(Modifiers::ALT, Key::char('g'));
        tree.bind_accelerator(root, alt_g, CommandId(3)).unwrap();
        let mut ctx = ScenarioContext::new();

        let alt_f = KeyMessage::key_down(Key::char('f'), Modifiers::ALT);
        assert_eq!(route(&mut tree, root, &mut ctx, &alt_f), Routed::Mnemonic(true));
        let msg = KeyMessage::key_down(Key::char('g'), Modifiers::ALT);
        assert_eq!(
            route(&mut tree, root, &mut ctx, &msg),
            Routed::Accelerator(true)
        );
        assert_eq!(
            route(&mut tree, root, &mut ctx, &KeyMessage::sys_char('f')),
            Routed::Mnemonic(true)
        );
        assert_eq!(ctx.recorded_mnemonics(root), 2);
    }

    #[test]
    fn shift_tab_navigates_backward() {
        let (mut tree, root) = tree();
        let mut ctx = ScenarioContext::new();
        let routed = route(&mut tree, root, &mut ctx, &KeyMessage::tab(true));
        let last = tree.focus_stops_of(root).last();
        assert_eq!(routed, Routed::Navigation(TabOutcome::Moved(last.unwrap())));
    }
}
