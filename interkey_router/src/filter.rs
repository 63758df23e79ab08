// Copyright 2025 the Interkey Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use interkey_input::KeyMessage;
use interkey_oracle::ScenarioContext;
use interkey_tree::{SinkId, SinkTree};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::route;

/// Pre-translate hook for roots hosted in native windows.
///
/// Native roots do not see raw key messages directly; the host's message loop
/// offers each message here first. The root holding focus gets it, or the
/// earliest registered root when none does.
#[derive(Clone, Debug, Default)]
pub struct MessageFilter {
    roots: SmallVec<[SinkId; 4]>,
}

impl MessageFilter {
    /// Create a filter with no roots.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `root`. Returns `false` if it is stale, not a native host, or
    /// already registered.
    pub fn register(&mut self, tree: &SinkTree, root: SinkId) -> bool {
        let native = tree.kind(root).is_some_and(|k| k.uses_message_filter());
        if !native || self.roots.contains(&root) {
            return false;
        }
        debug!(?root, "registered with message filter");
        self.roots.push(root);
        true
    }

    /// Unregister `root`. Returns `false` if it was not registered.
    pub fn unregister(&mut self, root: SinkId) -> bool {
        let before = self.roots.len();
        self.roots.retain(|r| *r != root);
        self.roots.len() != before
    }

    /// Registered roots, in registration order.
    pub fn roots(&self) -> &[SinkId] {
        &self.roots
    }

    /// Offer `msg` to the registered roots. Returns true if it was handled.
    pub fn pre_process(
        &self,
        tree: &mut SinkTree,
        ctx: &mut ScenarioContext,
        msg: &KeyMessage,
    ) -> bool {
        let target = self
            .roots
            .iter()
            .copied()
            .find(|r| tree.has_focus_within(*r))
            .or_else(|| self.roots.iter().copied().find(|r| tree.is_alive(*r)));
        let Some(root) = target else {
            trace!("no live root registered");
            return false;
        };
        route(tree, root, ctx, msg).handled()
    }
}
