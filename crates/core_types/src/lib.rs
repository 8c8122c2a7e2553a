//! Shared contract between the logical range engine and a host tree.
//!
//! The engine never owns host nodes. Everything it does to the host tree goes
//! through [`HostTree`], which a concrete backend (an in-memory arena, a real
//! document binding) implements. Receivers are `&self`: host trees are
//! interior-mutable, the same way document bindings expose their nodes.

use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

/// Failure reported by a host tree's selector engine.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("invalid selector: {0}")]
    InvalidSelector(String),
    /// The root cannot be searched (for example an off-tree fragment).
    #[error("selector engine cannot search this root")]
    UnsupportedRoot,
}

/// An event as seen by a delegated subscription.
#[derive(Debug)]
pub struct DelegatedEvent<'a, N> {
    pub kind: &'a str,
    /// Node the event was originally dispatched to.
    pub target: &'a N,
    /// Node on the bubbling path that matched the subscription's selector.
    /// Equal to `target` when the subscription has no selector.
    pub current_target: &'a N,
}

pub type DelegatedHandler<N> = Rc<dyn Fn(&DelegatedEvent<'_, N>)>;

/// Handle for a delegated subscription; stopping it unregisters the handler.
pub trait Subscription {
    fn stop(self);
}

/// Host tree adapter consumed by the range engine.
pub trait HostTree: 'static {
    type Node: Clone + Eq + Hash + fmt::Debug + 'static;
    type Subscription: Subscription + 'static;

    /// Insert `node` under `parent` before `before`, or at the end when `before` is `None`.
    fn insert(&self, node: &Self::Node, parent: &Self::Node, before: Option<&Self::Node>);

    /// Remove `node` from its parent. Does nothing for a node without a parent.
    fn remove(&self, node: &Self::Node);

    /// Relocate an already-inserted node. Moving a node before itself is a no-op.
    fn move_node(&self, node: &Self::Node, parent: &Self::Node, before: Option<&Self::Node>);

    /// Create a zero-width node used to mark the location of an empty range.
    fn create_placeholder(&self) -> Self::Node;

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    fn next_sibling(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Whether `ancestor` is a strict ancestor of `node`.
    fn is_ancestor(&self, ancestor: &Self::Node, node: &Self::Node) -> bool;

    /// Strict descendants of `root` matching `pattern`, in document order.
    fn find_by_selector(
        &self,
        pattern: &str,
        root: &Self::Node,
    ) -> Result<Vec<Self::Node>, HostError>;

    /// Register `handler` for `kind` events under `container` whose bubbling
    /// path contains a node matching `selector` (an empty selector matches the
    /// target only).
    fn subscribe_delegated(
        &self,
        container: &Self::Node,
        kind: &str,
        selector: &str,
        handler: DelegatedHandler<Self::Node>,
    ) -> Self::Subscription;
}
