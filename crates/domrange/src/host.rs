use crate::range::{Range, RangeNode};
use core_types::HostTree;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

/// A host tree together with the owning-range side table.
///
/// Every host node that is a direct member of a range maps to that range
/// here. The entries are weak and written only when a range takes a node in
/// or lets it go; nothing else may touch them.
pub struct RangeHost<H: HostTree> {
    tree: H,
    owners: RefCell<HashMap<H::Node, Weak<RangeNode<H>>>>,
}

impl<H: HostTree> RangeHost<H> {
    pub fn new(tree: H) -> Rc<Self> {
        Rc::new(Self {
            tree,
            owners: RefCell::new(HashMap::new()),
        })
    }

    pub fn tree(&self) -> &H {
        &self.tree
    }

    /// The range directly holding `node`, or the nearest host ancestor of it.
    pub fn range_for_node(&self, node: &H::Node) -> Option<Range<H>> {
        let mut current = Some(node.clone());
        while let Some(n) = current {
            if let Some(range) = self.owner(&n) {
                return Some(range);
            }
            current = self.tree.parent(&n);
        }
        None
    }

    pub(crate) fn owner(&self, node: &H::Node) -> Option<Range<H>> {
        let mut owners = self.owners.borrow_mut();
        let live = owners.get(node)?.upgrade();
        if live.is_none() {
            owners.remove(node);
        }
        live.map(Range::from_node)
    }

    pub(crate) fn set_owner(&self, node: &H::Node, range: &Range<H>) {
        self.owners
            .borrow_mut()
            .insert(node.clone(), range.weak_node());
    }

    pub(crate) fn clear_owner(&self, node: &H::Node) {
        self.owners.borrow_mut().remove(node);
    }

    /// Drop the entries of `nodes` whose range is gone.
    pub(crate) fn release_dead<'a>(&self, nodes: impl Iterator<Item = &'a H::Node>) {
        let Ok(mut owners) = self.owners.try_borrow_mut() else {
            return;
        };
        for node in nodes {
            if owners.get(node).is_some_and(|w| w.upgrade().is_none()) {
                owners.remove(node);
            }
        }
    }

    /// Number of nodes currently recorded as owned.
    pub(crate) fn owned_len(&self) -> usize {
        self.owners.borrow().len()
    }
}

impl<H: HostTree> fmt::Debug for RangeHost<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RangeHost")
            .field("owned_nodes", &self.owned_len())
            .finish_non_exhaustive()
    }
}
