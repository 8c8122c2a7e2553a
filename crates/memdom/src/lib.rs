//! # memdom
//!
//! An in-memory host tree implementing [`core_types::HostTree`].
//!
//! It is a small document model (document, fragments, elements, text and
//! comments) with just enough behavior to host logical ranges:
//! - structural insert/remove/move with per-parent [`UiHooks`] overrides,
//! - selector queries through the `css` crate,
//! - delegated event subscriptions with bubbling [`MemDom::dispatch`],
//! - [`MemDom::outline`] dumps for asserting tree shape in tests.
//!
//! All methods take `&self`; state lives behind `RefCell`s, and no borrow is
//! held while user hooks or event handlers run, so they may freely call back
//! into the tree.

mod arena;
mod events;
mod hooks;
mod select;

pub use arena::{ArenaError, NodeId, NodeKind};
pub use events::ListenerHandle;
pub use hooks::UiHooks;

use crate::arena::NodeArena;
use crate::events::{ListenerTable, Matcher};
use core_types::{DelegatedEvent, DelegatedHandler, HostError, HostTree};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

pub struct MemDom {
    arena: RefCell<NodeArena>,
    listeners: Rc<RefCell<ListenerTable>>,
    hooks: RefCell<HashMap<NodeId, Rc<dyn UiHooks>>>,
    document: NodeId,
}

impl MemDom {
    pub fn new() -> Self {
        let mut arena = NodeArena::new();
        let document = arena.create(NodeKind::Document);
        Self {
            arena: RefCell::new(arena),
            listeners: Rc::new(RefCell::new(ListenerTable::default())),
            hooks: RefCell::new(HashMap::new()),
            document,
        }
    }

    pub fn document(&self) -> NodeId {
        self.document
    }

    pub fn create_element(&self, name: &str) -> NodeId {
        self.create_element_with(name, &[])
    }

    pub fn create_element_with(&self, name: &str, attributes: &[(&str, &str)]) -> NodeId {
        self.arena.borrow_mut().create(NodeKind::Element {
            name: name.to_ascii_lowercase(),
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_ascii_lowercase(), Some(v.to_string())))
                .collect(),
        })
    }

    pub fn create_text(&self, text: &str) -> NodeId {
        self.arena.borrow_mut().create(NodeKind::Text {
            text: text.to_string(),
        })
    }

    pub fn create_comment(&self, text: &str) -> NodeId {
        self.arena.borrow_mut().create(NodeKind::Comment {
            text: text.to_string(),
        })
    }

    pub fn create_fragment(&self) -> NodeId {
        self.arena.borrow_mut().create(NodeKind::Fragment)
    }

    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.arena.borrow().kind(id).cloned()
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.arena.borrow().kind(id), Some(NodeKind::Element { .. }))
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<String> {
        match self.arena.borrow().kind(id)? {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.clone().unwrap_or_default()),
            _ => None,
        }
    }

    pub fn set_attribute(&self, id: NodeId, name: &str, value: &str) -> Result<(), ArenaError> {
        self.arena
            .borrow_mut()
            .set_attribute(id, name, Some(value))
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.arena.borrow().parent(id)
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.arena.borrow().children(id).to_vec()
    }

    pub fn next_sibling_of(&self, id: NodeId) -> Option<NodeId> {
        self.arena.borrow().next_sibling(id)
    }

    /// Whether `ancestor` is a strict ancestor of `node`.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.arena.borrow().is_ancestor(ancestor, node)
    }

    pub fn append_child(&self, parent: NodeId, child: NodeId) -> Result<(), ArenaError> {
        self.arena.borrow_mut().insert_before(parent, child, None)
    }

    pub fn insert_before(
        &self,
        parent: NodeId,
        child: NodeId,
        before: Option<NodeId>,
    ) -> Result<(), ArenaError> {
        self.arena.borrow_mut().insert_before(parent, child, before)
    }

    pub fn detach(&self, node: NodeId) -> Result<(), ArenaError> {
        self.arena.borrow_mut().detach(node)
    }

    /// Plain insertion used by the adapter and by default [`UiHooks`].
    /// Structural violations are logged and leave the tree unchanged.
    pub fn apply_insert(&self, node: NodeId, parent: NodeId, before: Option<NodeId>) {
        if let Err(err) = self.insert_before(parent, node, before) {
            log::error!(target: "memdom", "rejected insert of {node:?}: {err}");
            debug_assert!(false, "rejected insert of {node:?}: {err}");
        }
    }

    /// Plain removal used by the adapter and by default [`UiHooks`].
    pub fn apply_remove(&self, node: NodeId) {
        if let Err(err) = self.detach(node) {
            log::error!(target: "memdom", "rejected removal of {node:?}: {err}");
            debug_assert!(false, "rejected removal of {node:?}: {err}");
        }
    }

    pub fn set_ui_hooks(&self, parent: NodeId, hooks: Rc<dyn UiHooks>) {
        self.hooks.borrow_mut().insert(parent, hooks);
    }

    pub fn clear_ui_hooks(&self, parent: NodeId) {
        self.hooks.borrow_mut().remove(&parent);
    }

    fn hooks_for(&self, parent: NodeId, node: NodeId) -> Option<Rc<dyn UiHooks>> {
        if !self.is_element(node) {
            return None;
        }
        self.hooks.borrow().get(&parent).cloned()
    }

    /// Strict descendants of `root` matching `pattern`, in document order.
    pub fn query_selector_all(&self, pattern: &str, root: NodeId) -> Result<Vec<NodeId>, HostError> {
        let arena = self.arena.borrow();
        match arena.kind(root) {
            Some(NodeKind::Fragment) => return Err(HostError::UnsupportedRoot),
            None => return Ok(Vec::new()),
            Some(_) => {}
        }
        let selectors = css::parse_selector_list(pattern)
            .map_err(|err| HostError::InvalidSelector(format!("{pattern:?}: {err}")))?;
        Ok(arena
            .descendants(root)
            .into_iter()
            .filter(|id| select::matches(&arena, *id, &selectors))
            .collect())
    }

    /// Deliver a `kind` event targeted at `target` to delegated listeners.
    ///
    /// The event bubbles from `target` toward the root. At each node on the
    /// way, every listener of this kind whose container strictly contains the
    /// node and whose selector matches it is invoked, in registration order.
    /// A listener stopped by an earlier handler does not run. Returns the
    /// number of handler invocations.
    pub fn dispatch(&self, kind: &str, target: NodeId) -> usize {
        let snapshot = self.listeners.borrow().snapshot(kind);
        if snapshot.is_empty() {
            return 0;
        }
        let mut path = vec![target];
        let mut current = target;
        while let Some(parent) = self.parent_of(current) {
            path.push(parent);
            current = parent;
        }

        let mut delivered = 0;
        for node in &path {
            for listener in &snapshot {
                let wanted = {
                    let arena = self.arena.borrow();
                    arena.is_ancestor(listener.container, *node)
                        && match &listener.matcher {
                            Matcher::Target => *node == target,
                            Matcher::Selectors(list) => select::matches(&arena, *node, list),
                            Matcher::Never => false,
                        }
                };
                if !wanted || !self.listeners.borrow().is_live(listener.id) {
                    continue;
                }
                (listener.handler)(&DelegatedEvent {
                    kind,
                    target: &target,
                    current_target: node,
                });
                delivered += 1;
            }
        }
        log::trace!(target: "memdom", "dispatched {kind} to {target:?}: {delivered} handler(s)");
        delivered
    }

    /// Number of live delegated listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Indented dump of the subtree at `root`, one node per line.
    pub fn outline(&self, root: NodeId) -> String {
        self.arena.borrow().outline(root)
    }
}

impl Default for MemDom {
    fn default() -> Self {
        Self::new()
    }
}

impl HostTree for MemDom {
    type Node = NodeId;
    type Subscription = ListenerHandle;

    fn insert(&self, node: &NodeId, parent: &NodeId, before: Option<&NodeId>) {
        match self.hooks_for(*parent, *node) {
            Some(hooks) => hooks.insert_element(self, *node, *parent, before.copied()),
            None => self.apply_insert(*node, *parent, before.copied()),
        }
    }

    fn remove(&self, node: &NodeId) {
        let Some(parent) = self.parent_of(*node) else {
            return;
        };
        match self.hooks_for(parent, *node) {
            Some(hooks) => hooks.remove_element(self, *node),
            None => self.apply_remove(*node),
        }
    }

    fn move_node(&self, node: &NodeId, parent: &NodeId, before: Option<&NodeId>) {
        if self.parent_of(*node).is_none() {
            return;
        }
        match self.hooks_for(*parent, *node) {
            Some(hooks) => hooks.move_element(self, *node, *parent, before.copied()),
            None => self.apply_insert(*node, *parent, before.copied()),
        }
    }

    fn create_placeholder(&self) -> NodeId {
        self.create_text("")
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.parent_of(*node)
    }

    fn next_sibling(&self, node: &NodeId) -> Option<NodeId> {
        self.next_sibling_of(*node)
    }

    fn is_ancestor(&self, ancestor: &NodeId, node: &NodeId) -> bool {
        self.contains(*ancestor, *node)
    }

    fn find_by_selector(&self, pattern: &str, root: &NodeId) -> Result<Vec<NodeId>, HostError> {
        self.query_selector_all(pattern, *root)
    }

    fn subscribe_delegated(
        &self,
        container: &NodeId,
        kind: &str,
        selector: &str,
        handler: DelegatedHandler<NodeId>,
    ) -> ListenerHandle {
        let matcher = if selector.trim().is_empty() {
            Matcher::Target
        } else {
            match css::parse_selector_list(selector) {
                Ok(list) => Matcher::Selectors(list),
                Err(err) => {
                    log::error!(target: "memdom", "listener selector {selector:?} ignored: {err}");
                    Matcher::Never
                }
            }
        };
        let id = self
            .listeners
            .borrow_mut()
            .add(*container, kind, matcher, handler);
        log::trace!(target: "memdom", "listener {id} for {kind} {selector:?} on {container:?}");
        ListenerHandle {
            table: Rc::downgrade(&self.listeners),
            id,
        }
    }
}
