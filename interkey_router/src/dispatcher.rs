// Copyright 2025 the Interkey Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dispatcher helper: walk a dispatch sequence and honor stop outcomes.
//!
//! Routing builds an ordered sequence of entries (for accelerators, the
//! override layers and tables along the focus path) and hands it to [`run`].
//! The first handler to return [`Outcome::Stop`] ends the walk, so at most one
//! entry ever acts on an event.
//!
//! ```
//! use interkey_router::dispatcher::{Outcome, run};
//!
//! let seq = [1, 2, 3, 4];
//! let mut seen = Vec::new();
//! let stopped = run(&seq, &mut seen, |n, seen| {
//!     seen.push(*n);
//!     if *n == 3 { Outcome::Stop } else { Outcome::Continue }
//! });
//! assert_eq!(stopped, Some(&3));
//! assert_eq!(seen, [1, 2, 3]);
//! ```

/// Propagation control returned by a handler.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Keep walking.
    Continue,
    /// Stop at this entry.
    Stop,
}

/// Run `handler` over `seq` in order until it returns [`Outcome::Stop`].
///
/// Returns the entry propagation stopped at, or `None` if the whole sequence
/// was visited.
pub fn run<'a, D, E>(
    seq: &'a [D],
    event: &mut E,
    mut handler: impl FnMut(&D, &mut E) -> Outcome,
) -> Option<&'a D> {
    seq.iter()
        .find(|&d| matches!(handler(d, event), Outcome::Stop))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn runs_to_completion_without_stop() {
        let seq = [1_u32, 2, 3];
        let mut seen = Vec::new();
        let stopped = run(&seq, &mut seen, |d, s| {
            s.push(*d);
            Outcome::Continue
        });
        assert!(stopped.is_none());
        assert_eq!(seen, [1, 2, 3]);
    }

    #[test]
    fn stop_ends_the_walk() {
        let seq = [1_u32, 2, 3];
        let mut count = 0;
        let stopped = run(&seq, &mut count, |_, c| {
            *c += 1;
            Outcome::Stop
        });
        assert_eq!(stopped, Some(&1));
        assert_eq!(count, 1);
    }
}
