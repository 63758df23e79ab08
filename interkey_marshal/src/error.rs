// Copyright 2025 the Interkey Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use interkey_tree::TreeError;

/// Errors from talking to a host thread.
#[derive(Debug, thiserror::Error)]
pub enum MarshalError {
    /// The host thread could not be started.
    #[error("failed to spawn host thread")]
    Spawn(#[source] std::io::Error),
    /// The host has shut down and no longer accepts requests.
    #[error("host thread is no longer accepting requests")]
    Disconnected,
    /// The host thread died before replying.
    #[error("host thread panicked")]
    HostPanicked,
    /// The host answered with a reply that does not fit the request.
    #[error("unexpected reply from host thread")]
    UnexpectedReply,
    /// The host ran the request and tree construction failed.
    #[error(transparent)]
    Tree(#[from] TreeError),
}
