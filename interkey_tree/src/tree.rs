// Copyright 2025 the Interkey Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: structure, attachment, focus, and registration.

use alloc::vec::Vec;

use hashbrown::HashMap;
use interkey_focus::{Edge, TabHandling, TabPolicy, edge_iter};
use interkey_input::{AcceleratorTable, Chord, CommandId, MnemonicSet, Modifiers, PrecedenceMode};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::error::{AttachmentError, TreeError};
use crate::types::{FocusStopId, Site, SinkId, SinkKind, SinkOptions, Slot};

/// The keyboard-routing tree.
///
/// Sinks live in a generational arena; a [`SinkId`] goes stale when its Sink is
/// removed and is never dereferenced afterwards. The tree also tracks the single
/// focused [`FocusStopId`].
///
/// Construction and registration mutate the tree; routing only moves focus.
///
/// ## Example
///
/// ```rust
/// use interkey_tree::{SinkKind, SinkOptions, SinkTree};
///
/// let mut tree = SinkTree::new();
/// let root = tree.insert_root(SinkOptions::new(SinkKind::Native).with_stops(1));
/// let child = tree
///     .add_child(root, SinkOptions::new(SinkKind::Managed).with_stops(2))
///     .unwrap();
///
/// assert_eq!(tree.parent_of(child), Some(root));
/// assert_eq!(tree.focus_stops_of(child).count(), 2);
/// // The child's Site remembers the parent stop it sits after.
/// let site = tree.site_of(child).unwrap();
/// assert_eq!(site.previous, tree.focus_stops_of(root).next());
/// ```
pub struct SinkTree {
    /// slots
    sinks: Vec<Option<Sink>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    focused: Option<FocusStopId>,
}

impl core::fmt::Debug for SinkTree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.sinks.len();
        let alive = self.sinks.iter().filter(|n| n.is_some()).count();
        f.debug_struct("SinkTree")
            .field("sinks_total", &total)
            .field("sinks_alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("focused", &self.focused)
            .finish_non_exhaustive()
    }
}

impl Default for SinkTree {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Sink {
    generation: u32,
    kind: SinkKind,
    parent: Option<SinkId>,
    // Attachment order.
    children: SmallVec<[SinkId; 4]>,
    // Tab order: own stops interleaved with children.
    slots: Vec<Slot>,
    next_serial: u32,
    site: Option<Site>,
    accelerators: AcceleratorTable,
    overrides: AcceleratorTable,
    stop_overrides: HashMap<FocusStopId, AcceleratorTable>,
    mnemonics: MnemonicSet,
    tab_handling: TabHandling,
    accepts_tab_into: bool,
}

impl Sink {
    fn new(generation: u32, options: &SinkOptions) -> Self {
        Self {
            generation,
            kind: options.kind,
            parent: None,
            children: SmallVec::new(),
            slots: Vec::with_capacity(options.tab_stops),
            next_serial: 0,
            site: None,
            accelerators: AcceleratorTable::with_precedence(options.precedence),
            overrides: AcceleratorTable::new(),
            stop_overrides: HashMap::new(),
            mnemonics: MnemonicSet::new(),
            tab_handling: options.tab_handling,
            accepts_tab_into: options.accepts_tab_into,
        }
    }
}

impl SinkTree {
    /// Create an empty tree with nothing focused.
    pub fn new() -> Self {
        Self {
            sinks: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            focused: None,
        }
    }

    fn insert(&mut self, options: &SinkOptions) -> SinkId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.sinks[idx] = Some(Sink::new(generation, options));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "SinkId indices are 32-bit."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.sinks.push(Some(Sink::new(generation, options)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "SinkId indices are 32-bit."
            )]
            ((self.sinks.len() - 1) as u32, generation)
        };
        let id = SinkId::new(idx, generation);
        let node = self.node_mut(id);
        for _ in 0..options.tab_stops {
            let stop = FocusStopId::new(id, node.next_serial);
            node.next_serial += 1;
            node.slots.push(Slot::Stop(stop));
        }
        id
    }

    /// Insert a new, unattached Sink.
    ///
    /// The Sink mints `options.tab_stops` focus stops. It can later be attached
    /// under a parent with [`SinkTree::attach`], or given a host Site with
    /// [`SinkTree::install_root_site`].
    pub fn insert_root(&mut self, options: SinkOptions) -> SinkId {
        let id = self.insert(&options);
        debug!(sink = ?id, kind = ?options.kind, stops = options.tab_stops, "inserted root sink");
        id
    }

    /// Append a new focus stop to the end of `sink`'s tab order.
    ///
    /// If the slot directly before it is a child attached without a next
    /// neighbor, that child takes the new stop as its next neighbor.
    ///
    /// # Errors
    ///
    /// Returns [`AttachmentError::UnknownSink`] if `sink` is stale.
    pub fn add_stop(&mut self, sink: SinkId) -> Result<FocusStopId, TreeError> {
        let node = self
            .node_opt_mut(sink)
            .ok_or(AttachmentError::UnknownSink(sink))?;
        let stop = FocusStopId::new(sink, node.next_serial);
        node.next_serial += 1;
        let before = match node.slots.last() {
            Some(Slot::Child(child)) => Some(*child),
            _ => None,
        };
        node.slots.push(Slot::Stop(stop));

        if let Some(child) = before
            && let Some(site) = self.node_opt_mut(child).and_then(|c| c.site.as_mut())
            && site.parent == Some(sink)
            && site.next.is_none()
        {
            site.next = Some(stop);
            trace!(?child, ?stop, "backfilled next neighbor");
        }
        Ok(stop)
    }

    /// Create a child Sink at the end of `parent`'s tab order and attach it.
    ///
    /// The child's Site takes `options.tab_policy` as its policy and, when the
    /// parent's tab order currently ends in a stop, that stop as its previous
    /// neighbor. A stop added to the parent right afterwards becomes the next
    /// neighbor.
    ///
    /// # Errors
    ///
    /// Returns [`AttachmentError::UnknownSink`] if `parent` is stale and
    /// [`AttachmentError::UnsupportedChild`] if `parent`'s kind cannot host
    /// `options.kind`. Nothing is inserted on error.
    pub fn add_child(&mut self, parent: SinkId, options: SinkOptions) -> Result<SinkId, TreeError> {
        let parent_kind = self
            .kind(parent)
            .ok_or(AttachmentError::UnknownSink(parent))?;
        if !parent_kind.can_host(options.kind) {
            return Err(AttachmentError::UnsupportedChild {
                parent: parent_kind,
                child: options.kind,
            }
            .into());
        }
        let previous = match self.slots_of(parent).last() {
            Some(Slot::Stop(stop)) => Some(*stop),
            _ => None,
        };
        let child = self.insert(&options);
        if let Err(err) = self.attach(parent, child, previous, None, options.tab_policy) {
            self.remove(child);
            return Err(err.into());
        }
        Ok(child)
    }

    /// Attach `child` under `parent` with the given neighbor stops and policy.
    ///
    /// Neighbors name the stops directly around the child's slot. The slot is
    /// placed right after `previous`, else right before `next`, else at the
    /// end of the parent's tab order. A child that is still linked (to this
    /// parent or another) is moved there. Children already adjacent to the new
    /// slot lose the neighbor on that side.
    ///
    /// # Errors
    ///
    /// - [`AttachmentError::UnknownSink`] if either id is stale.
    /// - [`AttachmentError::AlreadyAttached`] if `child` already has a Site.
    /// - [`AttachmentError::Cycle`] if `child` is `parent` or one of its ancestors.
    /// - [`AttachmentError::UnsupportedChild`] if the kinds do not pair.
    /// - [`AttachmentError::ForeignStop`] if a neighbor is not `parent`'s own stop.
    /// - [`AttachmentError::NonAdjacentNeighbors`] if `next` does not directly
    ///   follow `previous`.
    pub fn attach(
        &mut self,
        parent: SinkId,
        child: SinkId,
        previous: Option<FocusStopId>,
        next: Option<FocusStopId>,
        policy: TabPolicy,
    ) -> Result<&Site, AttachmentError> {
        let parent_kind = self
            .kind(parent)
            .ok_or(AttachmentError::UnknownSink(parent))?;
        let child_kind = self
            .kind(child)
            .ok_or(AttachmentError::UnknownSink(child))?;
        if self.node(child).site.is_some() {
            return Err(AttachmentError::AlreadyAttached { child });
        }
        if self.is_within(parent, child) {
            return Err(AttachmentError::Cycle { parent, child });
        }
        if !parent_kind.can_host(child_kind) {
            return Err(AttachmentError::UnsupportedChild {
                parent: parent_kind,
                child: child_kind,
            });
        }
        for stop in [previous, next].into_iter().flatten() {
            if !self.owns_stop(parent, stop) {
                return Err(AttachmentError::ForeignStop { stop, parent });
            }
        }
        let at = self.placement(parent, child, previous, next)?;

        if let Some(old) = self.node(child).parent {
            self.unlink_parent(child, old);
        }
        self.link_parent(child, parent, at);

        debug!(?parent, ?child, ?previous, ?next, ?policy, "attached sink");
        let site = Site {
            parent: Some(parent),
            previous,
            next,
            policy,
        };
        Ok(&*self.node_mut(child).site.insert(site))
    }

    /// Give a root Sink a parentless Site, its attachment to the host desktop.
    ///
    /// # Errors
    ///
    /// Returns [`AttachmentError::UnknownSink`] if `root` is stale and
    /// [`AttachmentError::AlreadyAttached`] if it already has a Site or a parent.
    pub fn install_root_site(
        &mut self,
        root: SinkId,
        policy: TabPolicy,
    ) -> Result<&Site, AttachmentError> {
        let node = self
            .node_opt_mut(root)
            .ok_or(AttachmentError::UnknownSink(root))?;
        if node.site.is_some() || node.parent.is_some() {
            return Err(AttachmentError::AlreadyAttached { child: root });
        }
        debug!(?root, ?policy, "installed root site");
        Ok(&*node.site.insert(Site {
            parent: None,
            previous: None,
            next: None,
            policy,
        }))
    }

    /// Remove `child`'s Site.
    ///
    /// The child stays in its parent's tab order until [`SinkTree::unlink`] or
    /// [`SinkTree::remove`]; it just can no longer hand overflow to the parent.
    ///
    /// # Errors
    ///
    /// Returns [`AttachmentError::UnknownSink`] if `child` is stale and
    /// [`AttachmentError::NotAttached`] if it has no Site.
    pub fn detach(&mut self, child: SinkId) -> Result<Site, AttachmentError> {
        let node = self
            .node_opt_mut(child)
            .ok_or(AttachmentError::UnknownSink(child))?;
        let site = node.site.take().ok_or(AttachmentError::NotAttached(child))?;
        debug!(?child, parent = ?site.parent, "detached sink");
        Ok(site)
    }

    /// Take `child` out of its parent's children and tab order.
    ///
    /// The Site, if any, is left in place.
    ///
    /// # Errors
    ///
    /// Returns [`AttachmentError::UnknownSink`] if `child` is stale.
    pub fn unlink(&mut self, child: SinkId) -> Result<(), AttachmentError> {
        let parent = self
            .node_opt_mut(child)
            .ok_or(AttachmentError::UnknownSink(child))?
            .parent;
        if let Some(parent) = parent {
            self.unlink_parent(child, parent);
            debug!(?child, ?parent, "unlinked sink");
        }
        Ok(())
    }

    /// Remove a Sink and its subtree.
    ///
    /// Ids into the subtree become stale. Focus is cleared if it was inside.
    pub fn remove(&mut self, id: SinkId) {
        if !self.is_alive(id) {
            return;
        }
        if let Some(f) = self.focused
            && self.is_within(f.owner(), id)
        {
            self.focused = None;
        }
        if let Some(parent) = self.node(id).parent {
            self.unlink_parent(id, parent);
        }
        let children = self.node(id).children.clone();
        for child in children {
            self.remove(child);
        }
        self.sinks[id.idx()] = None;
        self.free_list.push(id.idx());
        trace!(sink = ?id, "removed sink");
    }

    /// Change the policy of `child`'s Site.
    ///
    /// # Errors
    ///
    /// Returns [`AttachmentError::UnknownSink`] if `child` is stale and
    /// [`AttachmentError::NotAttached`] if it has no Site.
    pub fn set_site_policy(
        &mut self,
        child: SinkId,
        policy: TabPolicy,
    ) -> Result<(), AttachmentError> {
        let node = self
            .node_opt_mut(child)
            .ok_or(AttachmentError::UnknownSink(child))?;
        let site = node.site.as_mut().ok_or(AttachmentError::NotAttached(child))?;
        site.policy = policy;
        Ok(())
    }

    // --- registration ---

    /// Bind an accelerator in `sink`'s own table.
    ///
    /// # Errors
    ///
    /// Returns [`AttachmentError::UnknownSink`] if `sink` is stale and
    /// [`interkey_input::BindingError::DuplicateChord`] if the chord is taken.
    pub fn bind_accelerator(
        &mut self,
        sink: SinkId,
        chord: Chord,
        command: CommandId,
    ) -> Result<(), TreeError> {
        let node = self
            .node_opt_mut(sink)
            .ok_or(AttachmentError::UnknownSink(sink))?;
        node.accelerators.bind(chord, command)?;
        Ok(())
    }

    /// Bind an override accelerator on a specific focus stop.
    ///
    /// While `stop` is focused this binding shadows any same-chord binding
    /// along the focus path, regardless of precedence.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownStop`] if `stop` is not live and a binding
    /// error if the chord is already overridden on this stop.
    pub fn bind_override(
        &mut self,
        stop: FocusStopId,
        chord: Chord,
        command: CommandId,
    ) -> Result<(), TreeError> {
        if !self.stop_is_alive(stop) {
            return Err(TreeError::UnknownStop(stop));
        }
        self.node_mut(stop.owner())
            .stop_overrides
            .entry(stop)
            .or_default()
            .bind(chord, command)?;
        Ok(())
    }

    /// Bind an override accelerator scoped to `sink`.
    ///
    /// Applies while focus is anywhere inside `sink`, ahead of ordinary tables.
    ///
    /// # Errors
    ///
    /// Returns [`AttachmentError::UnknownSink`] if `sink` is stale and a
    /// binding error if the chord is already overridden on this Sink.
    pub fn bind_sink_override(
        &mut self,
        sink: SinkId,
        chord: Chord,
        command: CommandId,
    ) -> Result<(), TreeError> {
        let node = self
            .node_opt_mut(sink)
            .ok_or(AttachmentError::UnknownSink(sink))?;
        node.overrides.bind(chord, command)?;
        Ok(())
    }

    /// Register a mnemonic on `sink`.
    ///
    /// # Errors
    ///
    /// Returns [`AttachmentError::UnknownSink`] if `sink` is stale, or the
    /// mnemonic set's registration error.
    pub fn add_mnemonic(
        &mut self,
        sink: SinkId,
        letter: char,
        modifiers: Modifiers,
    ) -> Result<(), TreeError> {
        let node = self
            .node_opt_mut(sink)
            .ok_or(AttachmentError::UnknownSink(sink))?;
        node.mnemonics.add(letter, modifiers)?;
        Ok(())
    }

    /// Set `sink`'s accelerator precedence. Stale ids are ignored.
    pub fn set_precedence(&mut self, sink: SinkId, precedence: PrecedenceMode) {
        if let Some(node) = self.node_opt_mut(sink) {
            node.accelerators.set_precedence(precedence);
        }
    }

    /// Set whether `sink` treats TAB as navigation or input. Stale ids are ignored.
    pub fn set_tab_handling(&mut self, sink: SinkId, handling: TabHandling) {
        if let Some(node) = self.node_opt_mut(sink) {
            node.tab_handling = handling;
        }
    }

    /// Set whether `sink` honors tab-into requests. Stale ids are ignored.
    pub fn set_accepts_tab_into(&mut self, sink: SinkId, accepts: bool) {
        if let Some(node) = self.node_opt_mut(sink) {
            node.accepts_tab_into = accepts;
        }
    }

    // --- focus ---

    /// The focused stop, if any.
    pub fn focused(&self) -> Option<FocusStopId> {
        self.focused
    }

    /// Move focus to `stop`.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownStop`] if `stop` is not live.
    pub fn set_focus(&mut self, stop: FocusStopId) -> Result<(), TreeError> {
        if !self.stop_is_alive(stop) {
            return Err(TreeError::UnknownStop(stop));
        }
        trace!(?stop, "focus moved");
        self.focused = Some(stop);
        Ok(())
    }

    /// Clear focus, returning the previously focused stop.
    pub fn clear_focus(&mut self) -> Option<FocusStopId> {
        self.focused.take()
    }

    /// Returns true if the focused stop is owned by `sink` or a descendant.
    pub fn has_focus_within(&self, sink: SinkId) -> bool {
        self.focused
            .is_some_and(|f| self.is_alive(sink) && self.is_within(f.owner(), sink))
    }

    /// The direct child of `sink` whose subtree holds focus.
    ///
    /// `None` if focus is on one of `sink`'s own stops or outside it.
    pub fn child_sink_with_focus(&self, sink: SinkId) -> Option<SinkId> {
        let mut node = self.focused?.owner();
        while let Some(parent) = self.parent_of(node) {
            if parent == sink {
                return Some(node);
            }
            node = parent;
        }
        None
    }

    /// Sinks from `root` down to the owner of the focused stop, inclusive.
    ///
    /// Empty if focus is not inside `root`.
    pub fn focus_path(&self, root: SinkId) -> SmallVec<[SinkId; 8]> {
        let mut path = SmallVec::new();
        let Some(focused) = self.focused else {
            return path;
        };
        let mut node = Some(focused.owner());
        while let Some(n) = node {
            path.push(n);
            if n == root {
                path.reverse();
                return path;
            }
            node = self.parent_of(n);
        }
        path.clear();
        path
    }

    // --- queries ---

    /// Returns true if `id` refers to a live Sink.
    pub fn is_alive(&self, id: SinkId) -> bool {
        self.sinks
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .map(|n| n.generation == id.1)
            .unwrap_or(false)
    }

    /// The kind of a live Sink.
    pub fn kind(&self, id: SinkId) -> Option<SinkKind> {
        self.node_opt(id).map(|n| n.kind)
    }

    /// The parent of a live Sink, or `None` for roots and stale ids.
    pub fn parent_of(&self, id: SinkId) -> Option<SinkId> {
        self.node_opt(id).and_then(|n| n.parent)
    }

    /// Children in attachment order, or an empty slice for stale ids.
    pub fn children_of(&self, id: SinkId) -> &[SinkId] {
        self.node_opt(id).map(|n| &n.children[..]).unwrap_or(&[])
    }

    /// Tab order of a Sink, or an empty slice for stale ids.
    pub fn slots_of(&self, id: SinkId) -> &[Slot] {
        self.node_opt(id).map(|n| &n.slots[..]).unwrap_or(&[])
    }

    /// The Sink's own focus stops, in tab order.
    pub fn focus_stops_of(&self, id: SinkId) -> impl Iterator<Item = FocusStopId> + '_ {
        self.slots_of(id).iter().filter_map(|s| match s {
            Slot::Stop(stop) => Some(*stop),
            Slot::Child(_) => None,
        })
    }

    /// The Sink's own stop at `edge` of its tab order, skipping children.
    pub fn edge_stop(&self, id: SinkId, edge: Edge) -> Option<FocusStopId> {
        edge_iter(self.slots_of(id), edge).find_map(|(_, s)| match s {
            Slot::Stop(stop) => Some(*stop),
            Slot::Child(_) => None,
        })
    }

    /// Position of `slot` in `id`'s tab order.
    pub fn slot_index(&self, id: SinkId, slot: Slot) -> Option<usize> {
        self.slots_of(id).iter().position(|s| *s == slot)
    }

    /// The Site installed in a live Sink, if attached.
    pub fn site_of(&self, id: SinkId) -> Option<&Site> {
        self.node_opt(id).and_then(|n| n.site.as_ref())
    }

    /// Returns true if `stop` is one of `sink`'s own live stops.
    pub fn owns_stop(&self, sink: SinkId, stop: FocusStopId) -> bool {
        stop.owner() == sink && self.slot_index(sink, Slot::Stop(stop)).is_some()
    }

    /// Returns true if `stop` names a live stop.
    pub fn stop_is_alive(&self, stop: FocusStopId) -> bool {
        self.owns_stop(stop.owner(), stop)
    }

    /// Returns true if `stop` is owned by `sink` or one of its descendants.
    pub fn contains(&self, sink: SinkId, stop: FocusStopId) -> bool {
        self.stop_is_alive(stop) && self.is_within(stop.owner(), sink)
    }

    /// Returns true if `node` is `ancestor` or lies beneath it.
    pub fn is_within(&self, node: SinkId, ancestor: SinkId) -> bool {
        let mut cur = Some(node);
        while let Some(n) = cur {
            if n == ancestor {
                return true;
            }
            cur = self.parent_of(n);
        }
        false
    }

    /// Pre-order traversal of `root`'s subtree, children in attachment order.
    pub fn depth_first(&self, root: SinkId) -> DepthFirst<'_> {
        let mut stack = SmallVec::new();
        if self.is_alive(root) {
            stack.push(root);
        }
        DepthFirst { tree: self, stack }
    }

    /// Iterate every live Sink in arena order.
    pub fn sinks(&self) -> impl Iterator<Item = SinkId> + '_ {
        self.sinks.iter().enumerate().filter_map(|(i, n)| {
            #[allow(
                clippy::cast_possible_truncation,
                reason = "SinkId indices are 32-bit."
            )]
            let idx = i as u32;
            n.as_ref().map(|n| SinkId::new(idx, n.generation))
        })
    }

    /// Number of live Sinks.
    pub fn len(&self) -> usize {
        self.sinks.len() - self.free_list.len()
    }

    /// Returns true if the tree has no live Sinks.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The Sink's own accelerator table.
    pub fn accelerators(&self, id: SinkId) -> Option<&AcceleratorTable> {
        self.node_opt(id).map(|n| &n.accelerators)
    }

    /// The Sink-scoped override layer.
    pub fn sink_overrides(&self, id: SinkId) -> Option<&AcceleratorTable> {
        self.node_opt(id).map(|n| &n.overrides)
    }

    /// The override layer bound on a specific stop, if any.
    pub fn stop_overrides(&self, stop: FocusStopId) -> Option<&AcceleratorTable> {
        self.node_opt(stop.owner())
            .and_then(|n| n.stop_overrides.get(&stop))
    }

    /// The Sink's mnemonics.
    pub fn mnemonics(&self, id: SinkId) -> Option<&MnemonicSet> {
        self.node_opt(id).map(|n| &n.mnemonics)
    }

    /// The Sink's accelerator precedence.
    pub fn precedence(&self, id: SinkId) -> Option<PrecedenceMode> {
        self.node_opt(id).map(|n| n.accelerators.precedence())
    }

    /// How the Sink handles TAB.
    pub fn tab_handling(&self, id: SinkId) -> Option<TabHandling> {
        self.node_opt(id).map(|n| n.tab_handling)
    }

    /// Returns true if the Sink is live and honors tab-into requests.
    pub fn accepts_tab_into(&self, id: SinkId) -> bool {
        self.node_opt(id).is_some_and(|n| n.accepts_tab_into)
    }

    // --- internals ---

    pub(crate) fn node(&self, id: SinkId) -> &Sink {
        self.sinks[id.idx()].as_ref().expect("dangling SinkId")
    }

    pub(crate) fn node_mut(&mut self, id: SinkId) -> &mut Sink {
        self.sinks[id.idx()].as_mut().expect("dangling SinkId")
    }

    fn node_opt(&self, id: SinkId) -> Option<&Sink> {
        let n = self.sinks.get(id.idx())?.as_ref()?;
        (n.generation == id.1).then_some(n)
    }

    fn node_opt_mut(&mut self, id: SinkId) -> Option<&mut Sink> {
        let n = self.sinks.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    /// Slot index for `child` under `parent`, counted as if `child` were not
    /// already in the parent's tab order.
    fn placement(
        &self,
        parent: SinkId,
        child: SinkId,
        previous: Option<FocusStopId>,
        next: Option<FocusStopId>,
    ) -> Result<usize, AttachmentError> {
        let slots: SmallVec<[Slot; 8]> = self
            .slots_of(parent)
            .iter()
            .copied()
            .filter(|s| *s != Slot::Child(child))
            .collect();
        let position = |stop: FocusStopId| slots.iter().position(|s| *s == Slot::Stop(stop));
        let at = match (previous.and_then(position), next.and_then(position)) {
            (Some(i), _) => i + 1,
            (None, Some(j)) => j,
            (None, None) => slots.len(),
        };
        if let Some(n) = next
            && slots.get(at) != Some(&Slot::Stop(n))
        {
            return Err(AttachmentError::NonAdjacentNeighbors { previous, next: n });
        }
        Ok(at)
    }

    /// Insert `id` at slot `at` of `parent`. Children on either side lose the
    /// neighbor facing the new slot.
    fn link_parent(&mut self, id: SinkId, parent: SinkId, at: usize) {
        let p = self.node_mut(parent);
        p.slots.insert(at, Slot::Child(id));
        p.children.push(id);
        let before = at.checked_sub(1).and_then(|i| p.slots.get(i)).copied();
        let after = p.slots.get(at + 1).copied();
        self.node_mut(id).parent = Some(parent);

        if let Some(Slot::Child(c)) = before
            && let Some(site) = self.node_opt_mut(c).and_then(|n| n.site.as_mut())
            && site.parent == Some(parent)
        {
            site.next = None;
        }
        if let Some(Slot::Child(d)) = after
            && let Some(site) = self.node_opt_mut(d).and_then(|n| n.site.as_mut())
            && site.parent == Some(parent)
        {
            site.previous = None;
        }
    }

    fn unlink_parent(&mut self, id: SinkId, parent: SinkId) {
        let p = self.node_mut(parent);
        p.children.retain(|c| *c != id);
        p.slots.retain(|s| *s != Slot::Child(id));
        self.node_mut(id).parent = None;
    }
}

/// Pre-order iterator over a subtree. Created by [`SinkTree::depth_first`].
#[derive(Debug)]
pub struct DepthFirst<'a> {
    tree: &'a SinkTree,
    stack: SmallVec<[SinkId; 8]>,
}

impl Iterator for DepthFirst<'_> {
    type Item = SinkId;

    fn next(&mut self) -> Option<SinkId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children_of(id).iter().rev().copied());
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use interkey_input::BindingError;

    fn managed(stops: usize) -> SinkOptions {
        SinkOptions::new(SinkKind::Managed).with_stops(stops)
    }

    fn embedded(stops: usize) -> SinkOptions {
        SinkOptions::new(SinkKind::Embedded).with_stops(stops)
    }

    #[test]
    fn liveness_insert_remove_reuse() {
        let mut tree = SinkTree::new();
        let root = tree.insert_root(managed(1));
        let a = tree.add_child(root, embedded(1)).unwrap();
        assert!(tree.is_alive(root));
        assert!(tree.is_alive(a));

        tree.remove(a);
        assert!(!tree.is_alive(a));
        assert!(tree.children_of(root).is_empty());
        assert_eq!(tree.slots_of(root).len(), 1);

        let b = tree.add_child(root, embedded(1)).unwrap();
        assert!(tree.is_alive(b));
        assert!(!tree.is_alive(a));
        if a.0 == b.0 {
            assert!(b.1 > a.1, "generation must increase on reuse");
        }
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn add_child_respects_hosting_matrix() {
        let mut tree = SinkTree::new();
        let root = tree.insert_root(SinkOptions::new(SinkKind::Native));
        let err = tree.add_child(root, embedded(1)).unwrap_err();
        assert_eq!(
            err,
            TreeError::Attachment(AttachmentError::UnsupportedChild {
                parent: SinkKind::Native,
                child: SinkKind::Embedded,
            })
        );
        assert_eq!(tree.len(), 1, "nothing inserted on failure");
        assert!(tree.add_child(root, managed(0)).is_ok());
    }

    #[test]
    fn interleaved_children_get_both_neighbors() {
        let mut tree = SinkTree::new();
        let root = tree.insert_root(managed(1));
        let child = tree.add_child(root, embedded(2)).unwrap();
        let site = *tree.site_of(child).unwrap();
        assert!(site.next.is_none());

        let after = tree.add_stop(root).unwrap();
        let site = *tree.site_of(child).unwrap();
        assert_eq!(site.previous, tree.edge_stop(root, Edge::First));
        assert_eq!(site.next, Some(after));
        assert_eq!(
            tree.slots_of(root),
            &[
                Slot::Stop(site.previous.unwrap()),
                Slot::Child(child),
                Slot::Stop(after)
            ]
        );
    }

    #[test]
    fn attach_rejects_second_site() {
        let mut tree = SinkTree::new();
        let a = tree.insert_root(managed(1));
        let b = tree.insert_root(managed(1));
        let child = tree.add_child(a, embedded(1)).unwrap();
        assert_eq!(
            tree.attach(b, child, None, None, TabPolicy::Stop),
            Err(AttachmentError::AlreadyAttached { child })
        );
        // After detaching it can move.
        tree.detach(child).unwrap();
        tree.attach(b, child, None, None, TabPolicy::Loop).unwrap();
        assert_eq!(tree.parent_of(child), Some(b));
        assert!(tree.children_of(a).is_empty());
        assert_eq!(tree.site_of(child).unwrap().policy, TabPolicy::Loop);
    }

    #[test]
    fn attach_rejects_cycles_and_foreign_stops() {
        let mut tree = SinkTree::new();
        let root = tree.insert_root(managed(1));
        let child = tree.add_child(root, embedded(1)).unwrap();
        let grandchild = tree.add_child(child, managed(1)).unwrap();

        tree.detach(child).unwrap();
        assert_eq!(
            tree.attach(grandchild, child, None, None, TabPolicy::Stop),
            Err(AttachmentError::Cycle {
                parent: grandchild,
                child,
            })
        );

        let other = tree.insert_root(managed(1));
        let foreign = tree.edge_stop(other, Edge::First).unwrap();
        assert_eq!(
            tree.attach(root, child, Some(foreign), None, TabPolicy::Stop),
            Err(AttachmentError::ForeignStop {
                stop: foreign,
                parent: root,
            })
        );
    }

    #[test]
    fn attach_places_child_after_previous() {
        let mut tree = SinkTree::new();
        let root = tree.insert_root(managed(3));
        let stops: Vec<_> = tree.focus_stops_of(root).collect();
        let child = tree.insert_root(embedded(1));
        tree.attach(root, child, Some(stops[0]), Some(stops[1]), TabPolicy::Stop)
            .unwrap();
        assert_eq!(tree.slot_index(root, Slot::Child(child)), Some(1));

        let late = tree.insert_root(embedded(1));
        tree.attach(root, late, None, Some(stops[2]), TabPolicy::Stop)
            .unwrap();
        assert_eq!(tree.slot_index(root, Slot::Child(late)), Some(3));
    }

    #[test]
    fn consecutive_children_keep_attachment_order() {
        let mut tree = SinkTree::new();
        let root = tree.insert_root(managed(1));
        let a = tree.add_child(root, embedded(1)).unwrap();
        let b = tree.add_child(root, embedded(1)).unwrap();
        assert_eq!(tree.slot_index(root, Slot::Child(a)), Some(1));
        assert_eq!(tree.slot_index(root, Slot::Child(b)), Some(2));

        let first = tree.edge_stop(root, Edge::First);
        let after = tree.add_stop(root).unwrap();
        let (sa, sb) = (*tree.site_of(a).unwrap(), *tree.site_of(b).unwrap());
        assert_eq!((sa.previous, sa.next), (first, None));
        assert_eq!((sb.previous, sb.next), (None, Some(after)));
    }

    #[test]
    fn reattaching_to_the_same_parent_moves_the_slot() {
        let mut tree = SinkTree::new();
        let root = tree.insert_root(managed(3));
        let s: Vec<_> = tree.focus_stops_of(root).collect();
        let child = tree.insert_root(embedded(1));
        tree.attach(root, child, Some(s[0]), Some(s[1]), TabPolicy::Stop)
            .unwrap();
        assert_eq!(tree.slot_index(root, Slot::Child(child)), Some(1));

        tree.detach(child).unwrap();
        tree.attach(root, child, Some(s[1]), Some(s[2]), TabPolicy::Stop)
            .unwrap();
        assert_eq!(
            tree.slots_of(root),
            &[
                Slot::Stop(s[0]),
                Slot::Stop(s[1]),
                Slot::Child(child),
                Slot::Stop(s[2])
            ]
        );
        assert_eq!(tree.children_of(root), &[child]);
    }

    #[test]
    fn attach_rejects_neighbors_that_are_not_adjacent() {
        let mut tree = SinkTree::new();
        let root = tree.insert_root(managed(3));
        let s: Vec<_> = tree.focus_stops_of(root).collect();
        let child = tree.insert_root(embedded(1));
        assert_eq!(
            tree.attach(root, child, Some(s[0]), Some(s[2]), TabPolicy::Stop),
            Err(AttachmentError::NonAdjacentNeighbors {
                previous: Some(s[0]),
                next: s[2],
            })
        );
        assert_eq!(
            tree.attach(root, child, Some(s[2]), Some(s[0]), TabPolicy::Stop),
            Err(AttachmentError::NonAdjacentNeighbors {
                previous: Some(s[2]),
                next: s[0],
            })
        );
        assert!(tree.children_of(root).is_empty(), "nothing linked on error");
        assert!(tree.site_of(child).is_none());
    }

    #[test]
    fn inserting_beside_a_child_clears_its_facing_neighbor() {
        let mut tree = SinkTree::new();
        let root = tree.insert_root(managed(2));
        let s: Vec<_> = tree.focus_stops_of(root).collect();
        let a = tree.insert_root(embedded(1));
        tree.attach(root, a, Some(s[0]), Some(s[1]), TabPolicy::Stop)
            .unwrap();

        let before = tree.insert_root(embedded(1));
        tree.attach(root, before, Some(s[0]), None, TabPolicy::Stop)
            .unwrap();
        let after = tree.insert_root(embedded(1));
        tree.attach(root, after, None, Some(s[1]), TabPolicy::Stop)
            .unwrap();
        assert_eq!(
            tree.slots_of(root),
            &[
                Slot::Stop(s[0]),
                Slot::Child(before),
                Slot::Child(a),
                Slot::Child(after),
                Slot::Stop(s[1])
            ]
        );
        let site = *tree.site_of(a).unwrap();
        assert_eq!((site.previous, site.next), (None, None));
        assert_eq!(tree.site_of(before).unwrap().previous, Some(s[0]));
        assert_eq!(tree.site_of(after).unwrap().next, Some(s[1]));
    }

    #[test]
    fn detach_keeps_slot_until_unlinked() {
        let mut tree = SinkTree::new();
        let root = tree.insert_root(managed(1));
        let child = tree.add_child(root, embedded(1)).unwrap();
        tree.detach(child).unwrap();
        assert!(tree.site_of(child).is_none());
        assert_eq!(tree.detach(child), Err(AttachmentError::NotAttached(child)));
        assert_eq!(tree.children_of(root), &[child]);

        tree.unlink(child).unwrap();
        assert!(tree.children_of(root).is_empty());
        assert_eq!(tree.parent_of(child), None);
    }

    #[test]
    fn root_site_is_parentless_and_unique() {
        let mut tree = SinkTree::new();
        let root = tree.insert_root(managed(1));
        let site = *tree.install_root_site(root, TabPolicy::Loop).unwrap();
        assert_eq!(site.parent, None);
        assert_eq!(
            tree.install_root_site(root, TabPolicy::Stop),
            Err(AttachmentError::AlreadyAttached { child: root })
        );
        tree.set_site_policy(root, TabPolicy::Stop).unwrap();
        assert_eq!(tree.site_of(root).unwrap().policy, TabPolicy::Stop);
    }

    #[test]
    fn focus_queries_follow_the_path() {
        let mut tree = SinkTree::new();
        let root = tree.insert_root(managed(1));
        let child = tree.add_child(root, embedded(1)).unwrap();
        let grandchild = tree.add_child(child, managed(2)).unwrap();
        let target = tree.edge_stop(grandchild, Edge::Last).unwrap();

        assert!(!tree.has_focus_within(root));
        tree.set_focus(target).unwrap();
        assert!(tree.has_focus_within(root));
        assert!(tree.has_focus_within(child));
        assert_eq!(tree.child_sink_with_focus(root), Some(child));
        assert_eq!(tree.child_sink_with_focus(child), Some(grandchild));
        assert_eq!(tree.child_sink_with_focus(grandchild), None);
        assert_eq!(&tree.focus_path(root)[..], &[root, child, grandchild]);
        assert!(tree.focus_path(grandchild).len() == 1);
        assert!(tree.contains(root, target));
        assert!(!tree.contains(root, FocusStopId::new(root, 99)));

        let other = tree.insert_root(managed(0));
        assert!(tree.focus_path(other).is_empty());
    }

    #[test]
    fn removing_focused_subtree_clears_focus() {
        let mut tree = SinkTree::new();
        let root = tree.insert_root(managed(1));
        let child = tree.add_child(root, embedded(1)).unwrap();
        let stop = tree.edge_stop(child, Edge::First).unwrap();
        tree.set_focus(stop).unwrap();
        tree.remove(child);
        assert_eq!(tree.focused(), None);
        assert_eq!(tree.set_focus(stop), Err(TreeError::UnknownStop(stop)));
    }

    #[test]
    fn depth_first_visits_children_in_attachment_order() {
        let mut tree = SinkTree::new();
        let root = tree.insert_root(managed(0));
        let a = tree.add_child(root, embedded(0)).unwrap();
        let a1 = tree.add_child(a, managed(0)).unwrap();
        let b = tree.add_child(root, embedded(0)).unwrap();
        let order: Vec<_> = tree.depth_first(root).collect();
        assert_eq!(order, vec![root, a, a1, b]);
        assert_eq!(tree.depth_first(a).count(), 2);
    }

    #[test]
    fn registration_errors_propagate() {
        let mut tree = SinkTree::new();
        let root = tree.insert_root(managed(1));
        let stop = tree.edge_stop(root, Edge::First).unwrap();
        tree.bind_accelerator(root, Chord::ctrl('a'), CommandId(1))
            .unwrap();
        assert_eq!(
            tree.bind_accelerator(root, Chord::ctrl('a'), CommandId(2)),
            Err(TreeError::Binding(BindingError::DuplicateChord {
                chord: Chord::ctrl('a'),
                existing: CommandId(1),
            }))
        );
        tree.bind_override(stop, Chord::ctrl('a'), CommandId(3))
            .unwrap();
        assert_eq!(
            tree.stop_overrides(stop)
                .and_then(|t| t.lookup(&Chord::ctrl('a'))),
            Some(CommandId(3))
        );
        tree.add_mnemonic(root, 'r', Modifiers::ALT).unwrap();
        assert!(tree.add_mnemonic(root, 'R', Modifiers::ALT).is_err());

        tree.remove(root);
        assert_eq!(
            tree.bind_sink_override(root, Chord::ctrl('b'), CommandId(4)),
            Err(TreeError::Attachment(AttachmentError::UnknownSink(root)))
        );
        assert_eq!(
            tree.bind_override(stop, Chord::ctrl('b'), CommandId(4)),
            Err(TreeError::UnknownStop(stop))
        );
    }
}
