// Copyright 2025 the Interkey Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Expected scenario configuration, applied to a tree before a scenario runs.

use interkey_focus::{TabHandling, TabPolicy};
use interkey_input::PrecedenceMode;
use interkey_tree::{SinkId, SinkTree};
use smallvec::SmallVec;
use tracing::{debug, warn};

/// Which accelerator scenario is under test.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum AccelTestType {
    /// Every Sink binds the same chord; the focused Sink should win.
    #[default]
    Common,
    /// Every Sink binds its own chord; each fires while focus is inside it.
    Unique,
    /// The focused descendant's binding shadows its ancestors'.
    ChildOverride,
    /// An ancestor's binding wins over the focused descendant's.
    ParentOverride,
    /// Sinks try their own tables before delegating.
    ParentFirst,
}

impl AccelTestType {
    /// The precedence every Sink uses for this scenario.
    pub const fn precedence(self) -> PrecedenceMode {
        match self {
            Self::Common | Self::Unique | Self::ChildOverride => PrecedenceMode::ChildFirst,
            Self::ParentOverride | Self::ParentFirst => PrecedenceMode::ParentFirst,
        }
    }
}

/// Expected accelerator configuration for a scenario.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpectedAccelTestState {
    /// The scenario under test.
    pub test_type: AccelTestType,
}

impl ExpectedAccelTestState {
    /// Create an expectation for `test_type`.
    pub const fn new(test_type: AccelTestType) -> Self {
        Self { test_type }
    }

    /// Set every Sink's precedence for this scenario.
    pub fn apply(&self, tree: &mut SinkTree) {
        let precedence = self.test_type.precedence();
        for sink in live_sinks(tree) {
            tree.set_precedence(sink, precedence);
        }
        debug!(test_type = ?self.test_type, ?precedence, "applied accelerator expectation");
    }
}

/// Which tab scenario is under test.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TabTestType {
    /// Every edge stops; overflow leaves through the Sites.
    #[default]
    Navigate,
    /// Root Sites loop; child edges still stop.
    Loop,
    /// Every Sink consumes TAB as input.
    AsInput,
}

impl TabTestType {
    /// Policy for a Site, given whether it is a root's parentless Site.
    pub const fn policy(self, root_site: bool) -> TabPolicy {
        match self {
            Self::Loop if root_site => TabPolicy::Loop,
            Self::Navigate | Self::Loop | Self::AsInput => TabPolicy::Stop,
        }
    }

    /// TAB handling every Sink uses for this scenario.
    pub const fn handling(self) -> TabHandling {
        match self {
            Self::AsInput => TabHandling::ConsumeAsInput,
            Self::Navigate | Self::Loop => TabHandling::Navigate,
        }
    }
}

/// Expected tab configuration for a scenario.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpectedTabTestState {
    /// The scenario under test.
    pub test_type: TabTestType,
    /// Number of tab stops the harness expects a Sink to report.
    pub recorded_tab_stops: u32,
}

impl ExpectedTabTestState {
    /// Create an expectation for `test_type`.
    pub const fn new(test_type: TabTestType, recorded_tab_stops: u32) -> Self {
        Self {
            test_type,
            recorded_tab_stops,
        }
    }

    /// Set every Sink's TAB handling and every Site's policy for this scenario.
    pub fn apply(&self, tree: &mut SinkTree) {
        let handling = self.test_type.handling();
        for sink in live_sinks(tree) {
            tree.set_tab_handling(sink, handling);
            let Some(root_site) = tree.site_of(sink).map(|s| s.parent.is_none()) else {
                continue;
            };
            if let Err(err) = tree.set_site_policy(sink, self.test_type.policy(root_site)) {
                warn!(?sink, %err, "skipped site policy update");
            }
        }
        debug!(test_type = ?self.test_type, "applied tab expectation");
    }
}

fn live_sinks(tree: &SinkTree) -> SmallVec<[SinkId; 16]> {
    tree.sinks().collect()
}
