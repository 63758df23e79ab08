// Copyright 2025 the Interkey Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recorded observations: what routing actually did during a scenario.

use alloc::collections::BTreeMap;

use interkey_focus::TabPhase;
use interkey_input::CommandId;
use interkey_tree::{FocusStopId, SinkId};

/// Accelerator observations for one Sink.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AcceleratorTestState {
    /// The Sink that fired most recently. Set to the recording Sink itself on fire.
    pub owner: Option<SinkId>,
    /// Invocation count per command.
    pub commands: BTreeMap<CommandId, u32>,
    /// Total invocations across all commands.
    pub sum_command: u32,
    /// Whether the chord's modifiers were held when a command last fired.
    ///
    /// Routing only fires on an exact chord match, so fires it records always
    /// set this. It is false before any fire, after a reset, or when a host
    /// records a fire for a message that lacked the modifiers.
    pub modifiers_observed: bool,
    /// Whether the chord's key was down when a command last fired. Follows the
    /// same rules as `modifiers_observed`.
    pub key_observed: bool,
}

impl AcceleratorTestState {
    /// How many times `command` fired.
    pub fn count(&self, command: CommandId) -> u32 {
        self.commands.get(&command).copied().unwrap_or(0)
    }
}

/// Tab navigation observations for one Sink.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TabTestState {
    /// Times tab navigation landed on one of this Sink's stops.
    pub recorded_tab_stops: u32,
    /// The first of this Sink's stops tab navigation landed on.
    pub recorded_first_tab: Option<FocusStopId>,
    /// How this Sink's most recent tab request ended.
    pub phase: TabPhase,
    /// Times this Sink ran out of stops and reported to its Site.
    pub overflows: u32,
    /// Times TAB was consumed as input by one of this Sink's stops.
    pub consumed_as_input: u32,
}

/// One step of routing, recorded in visit order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Visit {
    /// An override layer on the focus path was consulted.
    Override(SinkId),
    /// A Sink was asked to translate an accelerator.
    Accelerator(SinkId),
    /// A command fired on a Sink.
    Fired(SinkId, CommandId),
    /// A Sink was asked to take focus at one of its edges.
    TabInto(SinkId),
    /// A Sink ran out of stops.
    Overflow(SinkId),
    /// A Sink was asked whether it owns a mnemonic.
    Mnemonic(SinkId),
}

impl Visit {
    /// The Sink this visit concerns.
    pub const fn sink(self) -> SinkId {
        match self {
            Self::Override(s)
            | Self::Accelerator(s)
            | Self::Fired(s, _)
            | Self::TabInto(s)
            | Self::Overflow(s)
            | Self::Mnemonic(s) => s,
        }
    }
}
