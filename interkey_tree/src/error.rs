// Copyright 2025 the Interkey Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use interkey_input::BindingError;

use crate::types::{FocusStopId, SinkId, SinkKind};

/// Errors raised while wiring Sinks together.
///
/// These are programmer errors in tree construction, reported at attachment
/// time rather than surfacing later as undefined routing.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AttachmentError {
    /// The child already has an active Site.
    #[error("{child:?} is already attached")]
    AlreadyAttached {
        /// The child being attached.
        child: SinkId,
    },
    /// The id does not name a live Sink.
    #[error("{0:?} is not a live sink")]
    UnknownSink(SinkId),
    /// A neighbor stop passed to attach is not owned by the parent.
    #[error("{stop:?} is not owned by {parent:?}")]
    ForeignStop {
        /// The offending stop.
        stop: FocusStopId,
        /// The parent it was expected to belong to.
        parent: SinkId,
    },
    /// The parent's kind cannot host the child's kind.
    #[error("a {parent:?} sink cannot host a {child:?} sink")]
    UnsupportedChild {
        /// Kind of the parent.
        parent: SinkKind,
        /// Kind of the rejected child.
        child: SinkKind,
    },
    /// The child is the parent or one of its ancestors.
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    Cycle {
        /// The requested parent.
        parent: SinkId,
        /// The requested child.
        child: SinkId,
    },
    /// `next` is not the slot directly after `previous` in the parent.
    #[error("{next:?} does not directly follow {previous:?}")]
    NonAdjacentNeighbors {
        /// The requested previous neighbor.
        previous: Option<FocusStopId>,
        /// The requested next neighbor.
        next: FocusStopId,
    },
    /// The Sink has no Site to detach or reconfigure.
    #[error("{0:?} is not attached")]
    NotAttached(SinkId),
}

/// Errors from tree construction and registration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// Attachment failed.
    #[error(transparent)]
    Attachment(#[from] AttachmentError),
    /// Accelerator or mnemonic registration failed.
    #[error(transparent)]
    Binding(#[from] BindingError),
    /// The id does not name a live focus stop.
    #[error("{0:?} is not a live focus stop")]
    UnknownStop(FocusStopId),
}
