// Copyright 2025 the Interkey Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;

use hashbrown::HashMap;
use interkey_input::{Chord, CommandId, KeyMessage};
use interkey_tree::{FocusStopId, SinkId, SinkTree};
use tracing::{trace, warn};

use crate::expected::{ExpectedAccelTestState, ExpectedTabTestState};
use crate::recorded::{AcceleratorTestState, TabTestState, Visit};

/// Observation state for one scenario.
///
/// Every routing call takes a `&mut ScenarioContext`; nothing is recorded in
/// global state. Updates are best-effort bookkeeping: they never fail and never
/// influence routing decisions.
///
/// ```rust
/// use interkey_input::{Chord, CommandId, Key, KeyMessage, Modifiers};
/// use interkey_oracle::ScenarioContext;
/// use interkey_tree::{SinkKind, SinkOptions, SinkTree};
///
/// let mut tree = SinkTree::new();
/// let sink = tree.insert_root(SinkOptions::new(SinkKind::Managed));
///
/// let mut ctx = ScenarioContext::new();
/// let msg = KeyMessage::key_down(Key::char('a'), Modifiers::CONTROL);
/// ctx.record_command(sink, CommandId(7), &msg, &Chord::ctrl('a'));
/// assert_eq!(ctx.recorded_accelerator_state(sink).sum_command, 1);
///
/// ctx.reset();
/// assert_eq!(ctx.total_commands(), 0);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ScenarioContext {
    accelerators: HashMap<SinkId, AcceleratorTestState>,
    tabs: HashMap<SinkId, TabTestState>,
    mnemonics: HashMap<SinkId, u32>,
    /// Visits of the event in flight.
    trace: Vec<Visit>,
    expected_accelerator: ExpectedAccelTestState,
    expected_tab: ExpectedTabTestState,
}

impl ScenarioContext {
    /// Create a context with every recorded field at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context carrying the given expectations.
    pub fn with_expectations(
        accelerator: ExpectedAccelTestState,
        tab: ExpectedTabTestState,
    ) -> Self {
        Self {
            expected_accelerator: accelerator,
            expected_tab: tab,
            ..Self::default()
        }
    }

    /// Zero every recorded counter, flag, and the trace. Expectations are kept.
    pub fn reset(&mut self) {
        self.accelerators.clear();
        self.tabs.clear();
        self.mnemonics.clear();
        self.trace.clear();
        trace!("scenario state reset");
    }

    /// Apply the stored expectations to `tree`.
    pub fn configure(&self, tree: &mut SinkTree) {
        self.expected_accelerator.apply(tree);
        self.expected_tab.apply(tree);
    }

    // --- expectations ---

    /// The expected accelerator configuration.
    pub fn expected_accelerator_state(&self) -> ExpectedAccelTestState {
        self.expected_accelerator
    }

    /// Replace the expected accelerator configuration.
    pub fn set_expected_accelerator_state(&mut self, expected: ExpectedAccelTestState) {
        self.expected_accelerator = expected;
    }

    /// The expected tab configuration.
    pub fn expected_tab_state(&self) -> ExpectedTabTestState {
        self.expected_tab
    }

    /// Replace the expected tab configuration.
    pub fn set_expected_tab_state(&mut self, expected: ExpectedTabTestState) {
        self.expected_tab = expected;
    }

    // --- recording ---

    /// Start recording a new event; clears the visit trace.
    pub fn begin_event(&mut self) {
        self.trace.clear();
    }

    /// Append a visit to the trace of the event in flight.
    pub fn visit(&mut self, visit: Visit) {
        self.trace.push(visit);
    }

    /// Record that `command` fired on `sink` in response to `msg`, bound as `chord`.
    ///
    /// The observed flags compare `msg` against `chord`, so they reflect the
    /// message a host passes in rather than the binding alone.
    pub fn record_command(
        &mut self,
        sink: SinkId,
        command: CommandId,
        msg: &KeyMessage,
        chord: &Chord,
    ) {
        self.trace.push(Visit::Fired(sink, command));
        let state = self.accelerators.entry(sink).or_default();
        state.owner = Some(sink);
        state.modifiers_observed = msg.modifiers.contains(chord.modifiers);
        state.key_observed = msg.kind.is_down() && msg.key.normalized() == chord.key.normalized();
        let Some(sum) = state.sum_command.checked_add(1) else {
            warn!(?sink, "command counter saturated; skipped update");
            return;
        };
        state.sum_command = sum;
        *state.commands.entry(command).or_insert(0) += 1;
    }

    /// Record that tab navigation landed on `stop`.
    pub fn record_tab_stop(&mut self, stop: FocusStopId) {
        let state = self.tabs.entry(stop.owner()).or_default();
        state.recorded_tab_stops = state.recorded_tab_stops.saturating_add(1);
        state.recorded_first_tab.get_or_insert(stop);
    }

    /// Record that `sink` started resolving a tab request.
    pub fn record_tab_request(&mut self, sink: SinkId) {
        let state = self.tabs.entry(sink).or_default();
        state.phase = state.phase.request();
    }

    /// Record how `sink`'s tab request ended.
    pub fn record_tab_result(&mut self, sink: SinkId, overflowed: bool) {
        let state = self.tabs.entry(sink).or_default();
        state.phase = state.phase.finish(overflowed);
        if overflowed {
            state.overflows = state.overflows.saturating_add(1);
            self.trace.push(Visit::Overflow(sink));
        }
    }

    /// Record that `sink` consumed TAB as input.
    pub fn record_consumed_tab(&mut self, sink: SinkId) {
        let state = self.tabs.entry(sink).or_default();
        state.consumed_as_input = state.consumed_as_input.saturating_add(1);
    }

    /// Record a mnemonic hit on `sink`.
    pub fn record_mnemonic(&mut self, sink: SinkId) {
        let hits = self.mnemonics.entry(sink).or_insert(0);
        *hits = hits.saturating_add(1);
    }

    // --- reading ---

    /// Accelerator observations for `sink`, zero if none.
    pub fn recorded_accelerator_state(&self, sink: SinkId) -> AcceleratorTestState {
        self.accelerators.get(&sink).cloned().unwrap_or_default()
    }

    /// Tab observations for `sink`, zero if none.
    pub fn recorded_tab_state(&self, sink: SinkId) -> TabTestState {
        self.tabs.get(&sink).copied().unwrap_or_default()
    }

    /// Mnemonic hits on `sink`.
    pub fn recorded_mnemonics(&self, sink: SinkId) -> u32 {
        self.mnemonics.get(&sink).copied().unwrap_or(0)
    }

    /// Command invocations across every Sink.
    pub fn total_commands(&self) -> u32 {
        self.accelerators.values().map(|s| s.sum_command).sum()
    }

    /// Tab landings across every Sink.
    pub fn total_tab_stops(&self) -> u32 {
        self.tabs.values().map(|s| s.recorded_tab_stops).sum()
    }

    /// Mnemonic hits across every Sink.
    pub fn total_mnemonics(&self) -> u32 {
        self.mnemonics.values().sum()
    }

    /// Visits of the most recent event, in order.
    pub fn trace(&self) -> &[Visit] {
        &self.trace
    }
}
