// Copyright 2025 the Interkey Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tab navigation with overflow delegation across Sites.
//!
//! A tab request starts at the Sink that owns the focused stop and scans its
//! slots away from that stop. A stop slot takes focus; a child slot is asked to
//! take focus at the edge facing the scan. When the scan runs dry the Sink has
//! overflowed and reports to its [`Site`]:
//!
//! - `Stop` with a live neighbor: the neighbor takes focus.
//! - `Stop` without one: the parent resumes its own scan from the child's slot.
//! - `Loop`: the Sink wraps to its opposite edge.
//!
//! Overflow climbs one Site at a time in a loop, so deep trees never recurse.
//!
//! [`Site`]: interkey_tree::Site

use interkey_focus::{Edge, Navigation, Step, TabHandling, TabPolicy, edge_iter, scan};
use interkey_oracle::{ScenarioContext, Visit};
use interkey_tree::{FocusStopId, SinkId, SinkTree, Slot};
use tracing::{debug, trace, warn};

/// How a tab request ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TabOutcome {
    /// Focus moved to this stop.
    Moved(FocusStopId),
    /// The focused stop's owner took TAB as input; focus did not move.
    ConsumedAsInput(SinkId),
    /// Navigation left the tree through a parentless root Site.
    Exited,
    /// Nothing could take focus and no Site was there to report to.
    Unhandled,
}

impl TabOutcome {
    /// Returns true unless the request went unhandled.
    pub const fn handled(self) -> bool {
        !matches!(self, Self::Unhandled)
    }

    /// The stop that received focus, if any.
    pub const fn moved_to(self) -> Option<FocusStopId> {
        match self {
            Self::Moved(stop) => Some(stop),
            _ => None,
        }
    }
}

/// Handle a tab request inside the tree rooted at `root`.
///
/// If focus is not inside `root`, the root is entered at the edge `nav` faces.
pub fn navigate(
    tree: &mut SinkTree,
    root: SinkId,
    ctx: &mut ScenarioContext,
    nav: Navigation,
) -> TabOutcome {
    if !tree.is_alive(root) {
        return TabOutcome::Unhandled;
    }
    let Some(focused) = tree.focused().filter(|f| tree.contains(root, *f)) else {
        if !tab_into(tree, root, ctx, nav) {
            return TabOutcome::Unhandled;
        }
        return tree
            .focused()
            .map_or(TabOutcome::Unhandled, TabOutcome::Moved);
    };
    let owner = focused.owner();
    if tree.tab_handling(owner) == Some(TabHandling::ConsumeAsInput) {
        trace!(?owner, "tab consumed as input");
        ctx.record_consumed_tab(owner);
        return TabOutcome::ConsumedAsInput(owner);
    }

    let step = nav.step();
    let mut sink = owner;
    let mut origin = Slot::Stop(focused);
    loop {
        ctx.record_tab_request(sink);
        if let Some(stop) = advance(tree, sink, origin, ctx, step) {
            ctx.record_tab_result(sink, false);
            return land(tree, ctx, stop);
        }
        ctx.record_tab_result(sink, true);
        debug!(?sink, ?step, "tab overflow");

        let Some(site) = tree.site_of(sink).copied() else {
            return TabOutcome::Unhandled;
        };
        if on_no_more_tab_stops(tree, sink, ctx, step.navigation()) {
            return tree
                .focused()
                .map_or(TabOutcome::Unhandled, TabOutcome::Moved);
        }
        match (site.policy, site.parent) {
            (TabPolicy::Loop, _) => {
                let edge = step.navigation().entry_edge();
                debug!(?sink, ?edge, "tab wrapped");
                return match entry_stop(tree, sink, edge) {
                    Some(stop) => land(tree, ctx, stop),
                    None => TabOutcome::Unhandled,
                };
            }
            (TabPolicy::Stop, Some(parent)) if tree.is_alive(parent) => {
                origin = Slot::Child(sink);
                sink = parent;
            }
            (TabPolicy::Stop, _) => {
                debug!(?sink, "tab left the tree");
                return TabOutcome::Exited;
            }
        }
    }
}

/// The Site side of an overflow: `child` has no more stops in direction `nav`.
///
/// A `Stop` Site accepts by focusing its recorded neighbor and returns `true`.
/// A `Loop` Site declines. A child without a Site, or a `Stop` Site without a
/// live neighbor that way, also returns `false`.
pub fn on_no_more_tab_stops(
    tree: &mut SinkTree,
    child: SinkId,
    ctx: &mut ScenarioContext,
    nav: Navigation,
) -> bool {
    let Some(site) = tree.site_of(child).copied() else {
        return false;
    };
    match site.policy {
        TabPolicy::Loop => false,
        TabPolicy::Stop => {
            let Some(neighbor) = site
                .neighbor(nav.step())
                .filter(|s| tree.stop_is_alive(*s))
            else {
                return false;
            };
            debug!(?child, ?neighbor, "site accepted overflow");
            focus(tree, ctx, neighbor)
        }
    }
}

/// Ask `sink` to take focus at the edge `nav` enters from.
///
/// `First` (and forward intents) focus the first reachable stop in slot order,
/// `Last` (and backward intents) the last. Returns `false` if the Sink refuses
/// tab-into or has nothing focusable beneath it.
pub fn tab_into(
    tree: &mut SinkTree,
    sink: SinkId,
    ctx: &mut ScenarioContext,
    nav: Navigation,
) -> bool {
    if !tree.is_alive(sink) || !tree.accepts_tab_into(sink) {
        return false;
    }
    ctx.visit(Visit::TabInto(sink));
    match entry_stop(tree, sink, nav.entry_edge()) {
        Some(stop) => focus(tree, ctx, stop),
        None => false,
    }
}

/// Seed a scenario's starting focus at `sink`'s first (or last) stop.
///
/// Unlike [`tab_into`], no tab is recorded.
pub fn set_focus_to_first_child(
    tree: &mut SinkTree,
    sink: SinkId,
    ctx: &mut ScenarioContext,
    first: bool,
) -> bool {
    let edge = if first { Edge::First } else { Edge::Last };
    let Some(stop) = entry_stop(tree, sink, edge) else {
        return false;
    };
    ctx.begin_event();
    match tree.set_focus(stop) {
        Ok(()) => true,
        Err(err) => {
            warn!(?sink, %err, "could not seed focus");
            false
        }
    }
}

/// The stop `sink` would focus when entered at `edge`.
///
/// Walks slots inward from `edge`, descending into children that accept
/// tab-into. Terminates on any finite tree.
pub fn entry_stop(tree: &SinkTree, sink: SinkId, edge: Edge) -> Option<FocusStopId> {
    edge_iter(tree.slots_of(sink), edge).find_map(|(_, slot)| match *slot {
        Slot::Stop(stop) => Some(stop),
        Slot::Child(child) if enterable(tree, child) => entry_stop(tree, child, edge),
        Slot::Child(_) => None,
    })
}

// Children only take focus while attached and willing.
fn enterable(tree: &SinkTree, child: SinkId) -> bool {
    tree.accepts_tab_into(child) && tree.site_of(child).is_some()
}

fn advance(
    tree: &SinkTree,
    sink: SinkId,
    origin: Slot,
    ctx: &mut ScenarioContext,
    step: Step,
) -> Option<FocusStopId> {
    let from = tree.slot_index(sink, origin)?;
    let edge = step.navigation().entry_edge();
    scan(tree.slots_of(sink), Some(from), step).find_map(|(_, slot)| match *slot {
        Slot::Stop(stop) => Some(stop),
        Slot::Child(child) if enterable(tree, child) => {
            ctx.visit(Visit::TabInto(child));
            entry_stop(tree, child, edge)
        }
        Slot::Child(_) => None,
    })
}

fn land(tree: &mut SinkTree, ctx: &mut ScenarioContext, stop: FocusStopId) -> TabOutcome {
    if focus(tree, ctx, stop) {
        TabOutcome::Moved(stop)
    } else {
        TabOutcome::Unhandled
    }
}

fn focus(tree: &mut SinkTree, ctx: &mut ScenarioContext, stop: FocusStopId) -> bool {
    match tree.set_focus(stop) {
        Ok(()) => {
            ctx.record_tab_stop(stop);
            true
        }
        Err(err) => {
            warn!(?stop, %err, "skipped focus move");
            false
        }
    }
}
