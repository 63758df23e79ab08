// Copyright 2025 the Interkey Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mnemonic broadcast.
//!
//! An Alt+character event is offered to every Sink under the starting Sink in
//! depth-first order (a Sink before its children, children in attachment order).
//! The first Sink owning the access key takes it; nobody after it is asked.

use interkey_input::Modifiers;
use interkey_oracle::{ScenarioContext, Visit};
use interkey_tree::{SinkId, SinkTree};
use tracing::{debug, trace};

/// Broadcast the access key `letter` with `modifiers` below `sink`.
///
/// Returns `true` if some Sink owned it. Focus plays no part.
pub fn on_mnemonic(
    tree: &SinkTree,
    sink: SinkId,
    ctx: &mut ScenarioContext,
    letter: char,
    modifiers: Modifiers,
) -> bool {
    let hit = tree.depth_first(sink).find(|&s| {
        ctx.visit(Visit::Mnemonic(s));
        tree.mnemonics(s)
            .is_some_and(|set| set.matches(letter, modifiers))
    });
    match hit {
        Some(owner) => {
            debug!(?owner, %letter, "mnemonic hit");
            ctx.record_mnemonic(owner);
            true
        }
        None => {
            trace!(?sink, %letter, "mnemonic unhandled");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use interkey_tree::{SinkKind, SinkOptions};

    #[test]
    fn first_owner_in_depth_first_order_wins() {
        let mut tree = SinkTree::new();
        let root = tree.insert_root(SinkOptions::new(SinkKind::Managed));
        let a = tree
            .add_child(root, SinkOptions::new(SinkKind::Embedded))
            .unwrap();
        let a1 = tree
            .add_child(a, SinkOptions::new(SinkKind::Managed))
            .unwrap();
        let b = tree
            .add_child(root, SinkOptions::new(SinkKind::Embedded))
            .unwrap();
        tree.add_mnemonic(a1, 'x', Modifiers::ALT).unwrap();
        tree.add_mnemonic(b, 'x', Modifiers::ALT).unwrap();

        let mut ctx = ScenarioContext::new();
        assert!(on_mnemonic(&tree, root, &mut ctx, 'X', Modifiers::ALT));
        assert_eq!(ctx.recorded_mnemonics(a1), 1);
        assert_eq!(ctx.recorded_mnemonics(b), 0);
        let visited: Vec<_> = ctx.trace().iter().map(|v| v.sink()).collect();
        assert_eq!(visited, [root, a, a1], "b is never asked");
    }

    #[test]
    fn nothing_registered_declines() {
        let mut tree = SinkTree::new();
        let root = tree.insert_root(SinkOptions::new(SinkKind::Managed));
        tree.add_mnemonic(root, 'q', Modifiers::ALT).unwrap();
        let mut ctx = ScenarioContext::new();
        assert!(!on_mnemonic(&tree, root, &mut ctx, 'z', Modifiers::ALT));
        assert!(!on_mnemonic(&tree, root, &mut ctx, 'q', Modifiers::ALT | Modifiers::SHIFT));
        assert_eq!(ctx.total_mnemonics(), 0);
    }
}
