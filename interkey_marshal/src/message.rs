// Copyright 2025 the Interkey Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Request and response messages exchanged with a host thread.

use interkey_focus::Navigation;
use interkey_input::{Chord, CommandId, KeyMessage, Modifiers};
use interkey_oracle::{
    AcceleratorTestState, ExpectedAccelTestState, ExpectedTabTestState, ScenarioContext,
    TabTestState,
};
use interkey_router::{Routed, TabOutcome};
use interkey_tree::{FocusStopId, SinkId, SinkOptions};

/// A routing or construction call to run on the host thread.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Request {
    /// Classify and route a raw message into the tree under `root`.
    Route {
        /// Root the message is delivered to.
        root: SinkId,
        /// The raw message.
        message: KeyMessage,
    },
    /// Offer a key event to `sink`'s accelerator resolution.
    TranslateAccelerator {
        /// The Sink asked to translate.
        sink: SinkId,
        /// The raw message.
        message: KeyMessage,
    },
    /// Move focus inside the tree under `root`.
    Navigate {
        /// Root of the navigation.
        root: SinkId,
        /// Direction.
        navigation: Navigation,
    },
    /// Broadcast a mnemonic below `sink`.
    Mnemonic {
        /// Where the broadcast starts.
        sink: SinkId,
        /// The access key.
        letter: char,
        /// Modifiers held with it.
        modifiers: Modifiers,
    },
    /// Seed focus at `sink`'s first or last stop.
    SetFocusToFirstChild {
        /// The Sink to seed focus in.
        sink: SinkId,
        /// `true` for the first stop, `false` for the last.
        first: bool,
    },
    /// Create and attach a child Sink.
    AddChild {
        /// The parent.
        parent: SinkId,
        /// Options for the child.
        options: SinkOptions,
    },
    /// Append a focus stop to a Sink.
    AddStop {
        /// The Sink.
        sink: SinkId,
    },
    /// Bind an accelerator in a Sink's table.
    BindAccelerator {
        /// The Sink.
        sink: SinkId,
        /// The chord.
        chord: Chord,
        /// The command fired.
        command: CommandId,
    },
    /// Register a mnemonic on a Sink.
    AddMnemonic {
        /// The Sink.
        sink: SinkId,
        /// The access key.
        letter: char,
        /// Required modifiers.
        modifiers: Modifiers,
    },
    /// Zero every recorded counter and flag.
    ResetTestState,
    /// Store expectations and apply them to the tree.
    Configure {
        /// Accelerator scenario.
        accelerator: ExpectedAccelTestState,
        /// Tab scenario.
        tab: ExpectedTabTestState,
    },
    /// Read the recorded state of `sink`.
    Snapshot {
        /// The Sink to read.
        sink: SinkId,
    },
    /// Read the focused stop.
    Focused,
}

/// The host's reply to a [`Request`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response {
    /// Reply to [`Request::Route`].
    Routed(Routed),
    /// Reply to calls that report handled or not.
    Handled(bool),
    /// Reply to [`Request::Navigate`].
    Tab(TabOutcome),
    /// Reply to [`Request::AddChild`].
    Sink(SinkId),
    /// Reply to [`Request::AddStop`].
    Stop(FocusStopId),
    /// Reply to [`Request::Snapshot`].
    Snapshot(Snapshot),
    /// Reply to [`Request::Focused`].
    Focused(Option<FocusStopId>),
    /// The request completed with nothing to report.
    Done,
}

/// Recorded state of one Sink, copied out of the host's context.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// Accelerator observations.
    pub accelerator: AcceleratorTestState,
    /// Tab observations.
    pub tab: TabTestState,
    /// Mnemonic hits.
    pub mnemonics: u32,
    /// Tab landings the configured scenario expects of a Sink.
    pub expected_tab_stops: u32,
}

impl Snapshot {
    /// Copy `sink`'s recorded state out of `ctx`.
    pub fn capture(ctx: &ScenarioContext, sink: SinkId) -> Self {
        Self {
            accelerator: ctx.recorded_accelerator_state(sink),
            tab: ctx.recorded_tab_state(sink),
            mnemonics: ctx.recorded_mnemonics(sink),
            expected_tab_stops: ctx.expected_tab_state().recorded_tab_stops,
        }
    }
}
