// Copyright 2025 the Interkey Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Accelerator resolution along the focus path.
//!
//! Resolution happens in two phases, flattened into one dispatch sequence:
//!
//! 1. **Overrides**, innermost registrant first: the focused stop's override
//!    layer, then the Sink-scoped override layer of each Sink from the focus
//!    owner up to the Sink asked to translate. Precedence plays no part here.
//! 2. **Tables**, ordered by each Sink's [`PrecedenceMode`]. A `ParentFirst`
//!    Sink puts its own table ahead of its focused child's entries; a
//!    `ChildFirst` Sink puts it after.
//!
//! The first entry whose table binds the chord fires; nothing after it is consulted.

use interkey_input::{AcceleratorTable, KeyMessage, PrecedenceMode};
use interkey_oracle::{ScenarioContext, Visit};
use interkey_tree::{FocusStopId, SinkId, SinkTree};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::dispatcher::{self, Outcome};

/// Which table an accelerator dispatch entry consults.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Overrides bound on the focused stop.
    StopOverride(FocusStopId),
    /// Overrides scoped to the Sink.
    SinkOverride,
    /// The Sink's ordinary table.
    Local,
}

/// One entry of an accelerator dispatch sequence.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct AcceleratorDispatch {
    /// The Sink credited when this entry fires.
    pub sink: SinkId,
    /// The table consulted.
    pub layer: Layer,
}

impl AcceleratorDispatch {
    fn table<'t>(&self, tree: &'t SinkTree) -> Option<&'t AcceleratorTable> {
        match self.layer {
            Layer::StopOverride(stop) => tree.stop_overrides(stop),
            Layer::SinkOverride => tree.sink_overrides(self.sink),
            Layer::Local => tree.accelerators(self.sink),
        }
    }
}

/// Build the dispatch sequence a key event at `sink` is resolved against.
///
/// Deterministic for a fixed tree shape, focus position, and precedence modes.
pub fn dispatch_for(tree: &SinkTree, sink: SinkId) -> SmallVec<[AcceleratorDispatch; 8]> {
    let mut seq = SmallVec::new();
    if !tree.is_alive(sink) {
        return seq;
    }
    let path = tree.focus_path(sink);
    if let Some(focused) = tree.focused()
        && !path.is_empty()
    {
        seq.push(AcceleratorDispatch {
            sink: focused.owner(),
            layer: Layer::StopOverride(focused),
        });
        for &s in path.iter().rev() {
            seq.push(AcceleratorDispatch {
                sink: s,
                layer: Layer::SinkOverride,
            });
        }
    }
    if path.is_empty() {
        push_tables(tree, &[sink], &mut seq);
    } else {
        push_tables(tree, &path, &mut seq);
    }
    seq
}

fn push_tables(tree: &SinkTree, path: &[SinkId], seq: &mut SmallVec<[AcceleratorDispatch; 8]>) {
    let Some((&sink, rest)) = path.split_first() else {
        return;
    };
    let local = AcceleratorDispatch {
        sink,
        layer: Layer::Local,
    };
    match tree.precedence(sink).unwrap_or_default() {
        PrecedenceMode::ParentFirst => {
            seq.push(local);
            push_tables(tree, rest, seq);
        }
        PrecedenceMode::ChildFirst => {
            push_tables(tree, rest, seq);
            seq.push(local);
        }
    }
}

/// Translate a key event into at most one command fire.
///
/// Returns `true` if a binding fired. Key-up messages and stale Sinks are never
/// handled. On a fire, the owning Sink's counters are updated in `ctx`.
pub fn translate_accelerator(
    tree: &SinkTree,
    sink: SinkId,
    ctx: &mut ScenarioContext,
    msg: &KeyMessage,
) -> bool {
    if !msg.kind.is_down() {
        return false;
    }
    let chord = msg.chord();
    let seq = dispatch_for(tree, sink);
    let mut hit = None;
    let stopped = dispatcher::run(&seq, ctx, |d, ctx| {
        ctx.visit(match d.layer {
            Layer::Local => Visit::Accelerator(d.sink),
            Layer::StopOverride(_) | Layer::SinkOverride => Visit::Override(d.sink),
        });
        match d.table(tree).and_then(|t| t.binding(&chord)) {
            Some(binding) => {
                hit = Some(binding);
                Outcome::Stop
            }
            None => Outcome::Continue,
        }
    });
    match (stopped, hit) {
        (Some(d), Some(binding)) => {
            debug!(sink = ?d.sink, layer = ?d.layer, command = ?binding.command, "accelerator fired");
            ctx.record_command(d.sink, binding.command, msg, &binding.chord);
            true
        }
        _ => {
            trace!(?sink, ?chord, "accelerator unhandled");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interkey_focus::Edge;
    use interkey_input::{Chord, CommandId, Key, Modifiers};
    use interkey_tree::{SinkKind, SinkOptions};

    fn ctrl(c: char) -> KeyMessage {
        KeyMessage::key_down(Key::char(c), Modifiers::CONTROL)
    }

    /// Managed root with one stop, embedded child with one stop, focus in the child.
    fn two_level() -> (SinkTree, SinkId, SinkId) {
        let mut tree = SinkTree::new();
        let root = tree.insert_root(SinkOptions::new(SinkKind::Managed).with_stops(1));
        let child = tree
            .add_child(root, SinkOptions::new(SinkKind::Embedded).with_stops(1))
            .unwrap();
        let stop = tree.edge_stop(child, Edge::First).unwrap();
        tree.set_focus(stop).unwrap();
        (tree, root, child)
    }

    #[test]
    fn sequence_orders_overrides_then_tables() {
        let (mut tree, root, child) = two_level();
        let focused = tree.focused().unwrap();
        let layers: SmallVec<[_; 8]> = dispatch_for(&tree, root)
            .iter()
            .map(|d| (d.sink, d.layer))
            .collect();
        assert_eq!(
            &layers[..],
            &[
                (child, Layer::StopOverride(focused)),
                (child, Layer::SinkOverride),
                (root, Layer::SinkOverride),
                (child, Layer::Local),
                (root, Layer::Local),
            ]
        );

        tree.set_precedence(root, PrecedenceMode::ParentFirst);
        let tables: SmallVec<[_; 4]> = dispatch_for(&tree, root)
            .iter()
            .filter(|d| d.layer == Layer::Local)
            .map(|d| d.sink)
            .collect();
        assert_eq!(&tables[..], &[root, child]);
    }

    #[test]
    fn unfocused_sink_only_consults_itself() {
        let (mut tree, root, _) = two_level();
        tree.clear_focus();
        assert_eq!(
            &dispatch_for(&tree, root)[..],
            &[AcceleratorDispatch {
                sink: root,
                layer: Layer::Local,
            }]
        );
    }

    #[test]
    fn key_up_never_fires() {
        let (mut tree, root, _) = two_level();
        tree.bind_accelerator(root, Chord::ctrl('k'), CommandId(1))
            .unwrap();
        let mut ctx = ScenarioContext::new();
        let up = KeyMessage::key_up(Key::char('k'), Modifiers::CONTROL);
        assert!(!translate_accelerator(&tree, root, &mut ctx, &up));
        assert!(translate_accelerator(&tree, root, &mut ctx, &ctrl('k')));
        assert_eq!(ctx.total_commands(), 1);
    }

    #[test]
    fn sink_override_beats_parent_first_ancestor() {
        let (mut tree, root, child) = two_level();
        tree.set_precedence(root, PrecedenceMode::ParentFirst);
        tree.bind_accelerator(root, Chord::ctrl('s'), CommandId(1))
            .unwrap();
        tree.bind_sink_override(child, Chord::ctrl('s'), CommandId(2))
            .unwrap();
        let mut ctx = ScenarioContext::new();
        assert!(translate_accelerator(&tree, root, &mut ctx, &ctrl('s')));
        assert_eq!(ctx.recorded_accelerator_state(child).count(CommandId(2)), 1);
        assert_eq!(ctx.recorded_accelerator_state(root).sum_command, 0);
    }

    #[test]
    fn unbound_chord_walks_everything_and_declines() {
        let (tree, root, _) = two_level();
        let mut ctx = ScenarioContext::new();
        assert!(!translate_accelerator(&tree, root, &mut ctx, &ctrl('q')));
        assert_eq!(ctx.trace().len(), dispatch_for(&tree, root).len());
        assert_eq!(ctx.total_commands(), 0);
    }
}
