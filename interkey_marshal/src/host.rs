// Copyright 2025 the Interkey Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use interkey_input::KeyMessage;
use interkey_oracle::{ExpectedAccelTestState, ExpectedTabTestState, ScenarioContext};
use interkey_router::{
    Routed, navigate, on_mnemonic, route, set_focus_to_first_child, translate_accelerator,
};
use interkey_tree::{FocusStopId, SinkId, SinkTree, TreeError};
use tracing::{debug, debug_span, trace, warn};

use crate::error::MarshalError;
use crate::message::{Request, Response, Snapshot};

type Reply = mpsc::Sender<Result<Response, TreeError>>;

enum Command {
    Call { request: Request, reply: Reply },
    Shutdown,
}

/// Spawns the thread that owns a Sink tree.
#[derive(Debug)]
pub struct HostThread;

impl HostThread {
    /// Move `tree` and `ctx` onto a new thread named `name` and start serving.
    ///
    /// # Errors
    ///
    /// Returns [`MarshalError::Spawn`] if the OS refuses the thread.
    pub fn spawn(
        name: impl Into<String>,
        tree: SinkTree,
        ctx: ScenarioContext,
    ) -> Result<HostHandle, MarshalError> {
        let name = name.into();
        let (sender, receiver) = mpsc::channel();
        let span_name = name.clone();
        let thread = thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                let span = debug_span!("host", name = %span_name);
                let _guard = span.enter();
                serve(tree, ctx, &receiver)
            })
            .map_err(MarshalError::Spawn)?;
        debug!(%name, "host thread started");
        Ok(HostHandle {
            name,
            sender,
            thread: Some(thread),
        })
    }
}

/// Caller side of a host thread.
///
/// Every call blocks until the host replies. Dropping the handle shuts the
/// host down; use [`HostHandle::shutdown`] to get the tree back.
#[derive(Debug)]
pub struct HostHandle {
    name: String,
    sender: mpsc::Sender<Command>,
    thread: Option<JoinHandle<(SinkTree, ScenarioContext)>>,
}

impl HostHandle {
    /// The host thread's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Send `request` to the host and wait for its reply.
    ///
    /// # Errors
    ///
    /// - [`MarshalError::Disconnected`] if the host has stopped serving.
    /// - [`MarshalError::HostPanicked`] if it died before replying.
    /// - [`MarshalError::Tree`] if a construction request failed.
    pub fn call(&self, request: Request) -> Result<Response, MarshalError> {
        let (reply, response) = mpsc::channel();
        self.sender
            .send(Command::Call { request, reply })
            .map_err(|_| MarshalError::Disconnected)?;
        Ok(response.recv().map_err(|_| MarshalError::HostPanicked)??)
    }

    /// Route a raw message into the tree under `root`.
    ///
    /// # Errors
    ///
    /// See [`HostHandle::call`].
    pub fn route(&self, root: SinkId, message: KeyMessage) -> Result<Routed, MarshalError> {
        match self.call(Request::Route { root, message })? {
            Response::Routed(routed) => Ok(routed),
            other => Err(unexpected(&other)),
        }
    }

    /// Seed focus at `sink`'s first or last stop.
    ///
    /// # Errors
    ///
    /// See [`HostHandle::call`].
    pub fn set_focus_to_first_child(&self, sink: SinkId, first: bool) -> Result<bool, MarshalError> {
        match self.call(Request::SetFocusToFirstChild { sink, first })? {
            Response::Handled(done) => Ok(done),
            other => Err(unexpected(&other)),
        }
    }

    /// Zero the host's recorded test state.
    ///
    /// # Errors
    ///
    /// See [`HostHandle::call`].
    pub fn reset_test_state(&self) -> Result<(), MarshalError> {
        self.call(Request::ResetTestState).map(drop)
    }

    /// Store expectations on the host and apply them to its tree.
    ///
    /// # Errors
    ///
    /// See [`HostHandle::call`].
    pub fn configure(
        &self,
        accelerator: ExpectedAccelTestState,
        tab: ExpectedTabTestState,
    ) -> Result<(), MarshalError> {
        self.call(Request::Configure { accelerator, tab }).map(drop)
    }

    /// Read `sink`'s recorded state.
    ///
    /// # Errors
    ///
    /// See [`HostHandle::call`].
    pub fn snapshot(&self, sink: SinkId) -> Result<Snapshot, MarshalError> {
        match self.call(Request::Snapshot { sink })? {
            Response::Snapshot(snapshot) => Ok(snapshot),
            other => Err(unexpected(&other)),
        }
    }

    /// Read the focused stop.
    ///
    /// # Errors
    ///
    /// See [`HostHandle::call`].
    pub fn focused(&self) -> Result<Option<FocusStopId>, MarshalError> {
        match self.call(Request::Focused)? {
            Response::Focused(stop) => Ok(stop),
            other => Err(unexpected(&other)),
        }
    }

    /// Stop the host and take back its tree and context.
    ///
    /// # Errors
    ///
    /// Returns [`MarshalError::HostPanicked`] if the host thread died.
    pub fn shutdown(mut self) -> Result<(SinkTree, ScenarioContext), MarshalError> {
        let thread = self.thread.take().ok_or(MarshalError::Disconnected)?;
        // The host may already be gone; joining reports how it ended.
        let _ = self.sender.send(Command::Shutdown);
        thread.join().map_err(|_| MarshalError::HostPanicked)
    }
}

impl Drop for HostHandle {
    fn drop(&mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = self.sender.send(Command::Shutdown);
            if thread.join().is_err() {
                warn!(name = %self.name, "host thread panicked");
            }
        }
    }
}

fn unexpected(response: &Response) -> MarshalError {
    warn!(?response, "unexpected reply shape");
    MarshalError::UnexpectedReply
}

fn serve(
    mut tree: SinkTree,
    mut ctx: ScenarioContext,
    receiver: &mpsc::Receiver<Command>,
) -> (SinkTree, ScenarioContext) {
    while let Ok(command) = receiver.recv() {
        match command {
            Command::Call { request, reply } => {
                trace!(?request, "serving request");
                let response = handle(&mut tree, &mut ctx, request);
                if reply.send(response).is_err() {
                    debug!("caller hung up before the reply");
                }
            }
            Command::Shutdown => break,
        }
    }
    debug!("host thread stopping");
    (tree, ctx)
}

fn handle(
    tree: &mut SinkTree,
    ctx: &mut ScenarioContext,
    request: Request,
) -> Result<Response, TreeError> {
    let response = match request {
        Request::Route { root, message } => Response::Routed(route(tree, root, ctx, &message)),
        Request::TranslateAccelerator { sink, message } => {
            ctx.begin_event();
            Response::Handled(translate_accelerator(tree, sink, ctx, &message))
        }
        Request::Navigate { root, navigation } => {
            ctx.begin_event();
            Response::Tab(navigate(tree, root, ctx, navigation))
        }
        Request::Mnemonic {
            sink,
            letter,
            modifiers,
        } => {
            ctx.begin_event();
            Response::Handled(on_mnemonic(tree, sink, ctx, letter, modifiers))
        }
        Request::SetFocusToFirstChild { sink, first } => {
            Response::Handled(set_focus_to_first_child(tree, sink, ctx, first))
        }
        Request::AddChild { parent, options } => Response::Sink(tree.add_child(parent, options)?),
        Request::AddStop { sink } => Response::Stop(tree.add_stop(sink)?),
        Request::BindAccelerator {
            sink,
            chord,
            command,
        } => {
            tree.bind_accelerator(sink, chord, command)?;
            Response::Done
        }
        Request::AddMnemonic {
            sink,
            letter,
            modifiers,
        } => {
            tree.add_mnemonic(sink, letter, modifiers)?;
            Response::Done
        }
        Request::ResetTestState => {
            ctx.reset();
            Response::Done
        }
        Request::Configure { accelerator, tab } => {
            ctx.set_expected_accelerator_state(accelerator);
            ctx.set_expected_tab_state(tab);
            ctx.configure(tree);
            Response::Done
        }
        Request::Snapshot { sink } => Response::Snapshot(Snapshot::capture(ctx, sink)),
        Request::Focused => Response::Focused(tree.focused()),
    };
    Ok(response)
}
