// Copyright 2025 the Interkey Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the sink tree: identifiers, host kinds, slots, sites, and options.

use interkey_focus::{Step, TabHandling, TabPolicy};
use interkey_input::PrecedenceMode;

/// Identifier for a Sink in the tree (generational).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct SinkId(pub(crate) u32, pub(crate) u32);

impl SinkId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Identifier for a focus stop, minted by the Sink that owns it.
///
/// Equality is identity: two ids are equal only if they name the same stop of
/// the same (live or stale) Sink.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct FocusStopId {
    owner: SinkId,
    serial: u32,
}

impl FocusStopId {
    pub(crate) const fn new(owner: SinkId, serial: u32) -> Self {
        Self { owner, serial }
    }

    /// The Sink that owns this stop.
    pub const fn owner(self) -> SinkId {
        self.owner
    }
}

/// The host technology behind a Sink.
///
/// The set is closed; behavior that differs by kind is chosen by matching on it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SinkKind {
    /// A plain native window. Receives keys through the process-wide message filter.
    Native,
    /// A window hosting a managed UI subtree.
    Managed,
    /// A window hosting a foreign toolkit's forms.
    ForeignToolkit,
    /// A native window embedded inside a managed UI subtree.
    Embedded,
}

impl SinkKind {
    /// Returns true if a Sink of this kind can host a child of kind `child`.
    ///
    /// Native, foreign-toolkit, and embedded windows host managed content;
    /// managed content hosts embedded windows.
    pub const fn can_host(self, child: Self) -> bool {
        matches!(
            (self, child),
            (Self::Native, Self::Managed)
                | (Self::Managed, Self::Embedded)
                | (Self::Embedded, Self::Managed)
                | (Self::ForeignToolkit, Self::Managed)
        )
    }

    /// Returns true if raw messages reach a root of this kind through the
    /// process-wide filter rather than being handed to it directly.
    pub const fn uses_message_filter(self) -> bool {
        matches!(self, Self::Native)
    }
}

/// One position in a Sink's tab order.
///
/// A Sink's own stops and its children interleave; tab navigation walks them in order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    /// A focus stop owned by this Sink.
    Stop(FocusStopId),
    /// A child Sink, entered with a tab-into request.
    Child(SinkId),
}

/// The edge record installed in a child when it is attached.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Site {
    /// The parent Sink, or `None` for a root's attachment to its host.
    pub parent: Option<SinkId>,
    /// The parent's stop immediately before the child.
    pub previous: Option<FocusStopId>,
    /// The parent's stop immediately after the child.
    pub next: Option<FocusStopId>,
    /// What happens when the child overflows.
    pub policy: TabPolicy,
}

impl Site {
    /// The neighbor stop focus moves to when leaving the child in direction `step`.
    pub const fn neighbor(&self, step: Step) -> Option<FocusStopId> {
        match step {
            Step::Forward => self.next,
            Step::Backward => self.previous,
        }
    }
}

/// Construction options for a Sink.
///
/// ```rust
/// use interkey_focus::TabPolicy;
/// use interkey_tree::{SinkKind, SinkOptions};
///
/// let options = SinkOptions::new(SinkKind::Managed)
///     .with_stops(3)
///     .with_tab_policy(TabPolicy::Loop);
/// assert_eq!(options.tab_stops, 3);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SinkOptions {
    /// Host kind.
    pub kind: SinkKind,
    /// Number of focus stops minted at construction.
    pub tab_stops: usize,
    /// Policy of the Site installed when this Sink is attached as a child.
    pub tab_policy: TabPolicy,
    /// Accelerator precedence.
    pub precedence: PrecedenceMode,
    /// Whether TAB navigates or is consumed as input.
    pub tab_handling: TabHandling,
    /// Whether tab-into requests are honored.
    pub accepts_tab_into: bool,
}

impl Default for SinkOptions {
    fn default() -> Self {
        Self::new(SinkKind::Managed)
    }
}

impl SinkOptions {
    /// Default options for a Sink of `kind`: no stops, `Stop` policy, child-first.
    pub const fn new(kind: SinkKind) -> Self {
        Self {
            kind,
            tab_stops: 0,
            tab_policy: TabPolicy::Stop,
            precedence: PrecedenceMode::ChildFirst,
            tab_handling: TabHandling::Navigate,
            accepts_tab_into: true,
        }
    }

    /// Set the number of stops minted at construction.
    pub const fn with_stops(mut self, tab_stops: usize) -> Self {
        self.tab_stops = tab_stops;
        self
    }

    /// Set the attachment policy.
    pub const fn with_tab_policy(mut self, tab_policy: TabPolicy) -> Self {
        self.tab_policy = tab_policy;
        self
    }

    /// Set the accelerator precedence.
    pub const fn with_precedence(mut self, precedence: PrecedenceMode) -> Self {
        self.precedence = precedence;
        self
    }

    /// Set TAB handling.
    pub const fn with_tab_handling(mut self, tab_handling: TabHandling) -> Self {
        self.tab_handling = tab_handling;
        self
    }

    /// Refuse tab-into requests.
    pub const fn refusing_tab_into(mut self) -> Self {
        self.accepts_tab_into = false;
        self
    }
}
