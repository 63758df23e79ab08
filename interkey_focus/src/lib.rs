// Copyright 2025 the Interkey Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interkey Focus: tab navigation primitives.
//!
//! This crate models tab navigation as a combination of:
//! - **Navigation intents** ([`Navigation`]) such as [`Navigation::Next`] (Tab),
//!   [`Navigation::Prev`] (Shift+Tab), or an explicit edge request
//!   ([`Navigation::First`] / [`Navigation::Last`]) used when tabbing *into* a Sink.
//! - **Overflow policies** ([`TabPolicy`]) deciding what happens when a Sink runs out
//!   of stops in the requested direction.
//! - **Tab handling** ([`TabHandling`]) for Sinks that consume TAB as ordinary input.
//! - A per-Sink **phase** ([`TabPhase`]) recording how the last tab request ended.
//! - **Linear traversal** helpers ([`scan`], [`edge_iter`]) over an ordered slice of slots.
//!
//! ## Minimal example
//!
//! Stepping through three slots and falling off the end:
//!
//! ```rust
//! use interkey_focus::{Navigation, scan};
//!
//! let slots = ['a', 'b', 'c'];
//! let after_a: Vec<_> = scan(&slots, Some(0), Navigation::Next.step())
//!     .map(|(_, s)| *s)
//!     .collect();
//! assert_eq!(after_a, ['b', 'c']);
//!
//! // Backwards from the middle.
//! let before_b: Vec<_> = scan(&slots, Some(1), Navigation::Prev.step())
//!     .map(|(_, s)| *s)
//!     .collect();
//! assert_eq!(before_b, ['a']);
//! ```
//!
//! The traversal helpers are generic over the slot type, so callers can scan a
//! Sink's interleaved stops and children without this crate knowing about either.
//!
//! This crate is `no_std`.

#![no_std]

/// Direction of tab navigation.
///
/// `Left` and `Right` are the arrow-key forms hosts deliver when crossing a
/// boundary; they traverse like `Prev` and `Next`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Navigation {
    /// Move to the next stop (Tab).
    Next,
    /// Move to the previous stop (Shift+Tab).
    Prev,
    /// Enter a Sink at its first stop.
    First,
    /// Enter a Sink at its last stop.
    Last,
    /// Arrow left; traverses backward.
    Left,
    /// Arrow right; traverses forward.
    Right,
}

impl Navigation {
    /// The intent for a TAB key, given whether Shift was held.
    pub const fn from_shift(shift: bool) -> Self {
        if shift { Self::Prev } else { Self::Next }
    }

    /// Traversal direction.
    pub const fn step(self) -> Step {
        match self {
            Self::Next | Self::First | Self::Right => Step::Forward,
            Self::Prev | Self::Last | Self::Left => Step::Backward,
        }
    }

    /// The edge a neighbor is entered at when navigation crosses into it.
    ///
    /// Moving forward enters at the first stop, moving backward at the last.
    pub const fn entry_edge(self) -> Edge {
        match self.step() {
            Step::Forward => Edge::First,
            Step::Backward => Edge::Last,
        }
    }
}

/// Linear traversal direction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Step {
    /// Increasing slot order.
    Forward,
    /// Decreasing slot order.
    Backward,
}

impl Step {
    /// The navigation intent that moves in this direction.
    pub const fn navigation(self) -> Navigation {
        match self {
            Self::Forward => Navigation::Next,
            Self::Backward => Navigation::Prev,
        }
    }
}

/// One end of an ordered sequence.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Edge {
    /// The first element.
    First,
    /// The last element.
    Last,
}

impl Edge {
    /// Direction to walk from this edge inward.
    pub const fn inward(self) -> Step {
        match self {
            Self::First => Step::Forward,
            Self::Last => Step::Backward,
        }
    }
}

/// Behavior when tab navigation overflows a Sink's own sequence.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TabPolicy {
    /// Hand focus back across the attachment edge to the neighbor in the parent.
    #[default]
    Stop,
    /// Decline the overflow; the Sink wraps to its own opposite edge.
    Loop,
}

/// Whether a Sink treats TAB as navigation or as ordinary input.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TabHandling {
    /// TAB moves focus.
    #[default]
    Navigate,
    /// TAB is delivered to the focused stop as input; focus does not move.
    ConsumeAsInput,
}

/// Where a Sink's most recent tab request ended up.
///
/// Transitions are `Idle -> Requested -> {Resolved, Overflowed}`; a new request
/// restarts from `Requested`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TabPhase {
    /// No tab request since the last reset.
    #[default]
    Idle,
    /// A request is being resolved.
    Requested,
    /// Focus moved to a stop inside this Sink or a descendant.
    Resolved,
    /// The Sink ran out of stops and reported to its Site.
    Overflowed,
}

impl TabPhase {
    /// Begin a request. Valid from any phase.
    pub const fn request(self) -> Self {
        Self::Requested
    }

    /// Finish the current request.
    ///
    /// Has no effect unless a request is in progress.
    pub const fn finish(self, overflowed: bool) -> Self {
        match self {
            Self::Requested if overflowed => Self::Overflowed,
            Self::Requested => Self::Resolved,
            other => other,
        }
    }
}

/// Iterator over slots strictly after (or before) an origin.
///
/// Created by [`scan`] and [`edge_iter`].
#[derive(Clone, Debug)]
pub struct Scan<'a, T> {
    slots: &'a [T],
    // Next index to yield, or None once exhausted.
    cursor: Option<usize>,
    step: Step,
}

impl<'a, T> Iterator for Scan<'a, T> {
    type Item = (usize, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let i = self.cursor?;
        let slot = self.slots.get(i)?;
        self.cursor = match self.step {
            Step::Forward => i.checked_add(1).filter(|&n| n < self.slots.len()),
            Step::Backward => i.checked_sub(1),
        };
        Some((i, slot))
    }
}

/// Walk `slots` in direction `step`, starting just past `from`.
///
/// With `from = None` the walk starts at the edge `step` leads away from, so it
/// covers every slot. Indices past the end are treated as exhausted.
pub fn scan<T>(slots: &[T], from: Option<usize>, step: Step) -> Scan<'_, T> {
    let cursor = match (from, step) {
        (None, Step::Forward) => (!slots.is_empty()).then_some(0),
        (None, Step::Backward) => slots.len().checked_sub(1),
        (Some(i), Step::Forward) => i.checked_add(1).filter(|&n| n < slots.len()),
        (Some(i), Step::Backward) => i.checked_sub(1).filter(|&n| n < slots.len()),
    };
    Scan {
        slots,
        cursor,
        step,
    }
}

/// Walk every slot starting at `edge` and moving inward.
pub fn edge_iter<T>(slots: &[T], edge: Edge) -> Scan<'_, T> {
    scan(slots, None, edge.inward())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect<T: Copy>(it: Scan<'_, T>) -> ([Option<T>; 4], usize) {
        let mut out = [None; 4];
        let mut n = 0;
        for (_, s) in it {
            out[n] = Some(*s);
            n += 1;
        }
        (out, n)
    }

    #[test]
    fn left_and_right_traverse_like_prev_and_next() {
        assert_eq!(Navigation::Left.step(), Navigation::Prev.step());
        assert_eq!(Navigation::Right.step(), Navigation::Next.step());
        assert_eq!(Navigation::Right.entry_edge(), Edge::First);
        assert_eq!(Navigation::Left.entry_edge(), Edge::Last);
        assert_eq!(Navigation::First.entry_edge(), Edge::First);
        assert_eq!(Navigation::Last.entry_edge(), Edge::Last);
        assert_eq!(Navigation::from_shift(true), Navigation::Prev);
    }

    #[test]
    fn scan_excludes_origin() {
        let slots = [10, 20, 30];
        let (out, n) = collect(scan(&slots, Some(1), Step::Forward));
        assert_eq!(n, 1);
        assert_eq!(out[0], Some(30));

        let (out, n) = collect(scan(&slots, Some(1), Step::Backward));
        assert_eq!(n, 1);
        assert_eq!(out[0], Some(10));
    }

    #[test]
    fn scan_from_boundary_is_empty() {
        let slots = [1, 2];
        assert_eq!(scan(&slots, Some(1), Step::Forward).count(), 0);
        assert_eq!(scan(&slots, Some(0), Step::Backward).count(), 0);
        // Out-of-range origins never index past the end.
        assert_eq!(scan(&slots, Some(7), Step::Forward).count(), 0);
        assert_eq!(scan(&slots, Some(7), Step::Backward).count(), 0);
    }

    #[test]
    fn edge_iter_covers_everything() {
        let slots = [1, 2, 3];
        let (out, n) = collect(edge_iter(&slots, Edge::Last));
        assert_eq!(n, 3);
        assert_eq!(out[..3], [Some(3), Some(2), Some(1)]);
        let empty: [u8; 0] = [];
        assert_eq!(edge_iter(&empty, Edge::First).count(), 0);
        assert_eq!(edge_iter(&empty, Edge::Last).count(), 0);
    }

    #[test]
    fn phase_machine() {
        let p = TabPhase::default();
        // Finishing without a request is a no-op.
        assert_eq!(p.finish(true), TabPhase::Idle);
        let p = p.request();
        assert_eq!(p.finish(false), TabPhase::Resolved);
        assert_eq!(p.finish(true), TabPhase::Overflowed);
        assert_eq!(TabPhase::Overflowed.request(), TabPhase::Requested);
    }

    #[test]
    fn policies_default_to_stop_and_navigate() {
        assert_eq!(TabPolicy::default(), TabPolicy::Stop);
        assert_eq!(TabHandling::default(), TabHandling::Navigate);
        assert_eq!(Edge::Last.inward(), Step::Backward);
        assert_eq!(Step::Backward.navigation(), Navigation::Prev);
    }
}
