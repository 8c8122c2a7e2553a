use crate::{MemDom, NodeId};

/// Per-parent overrides for element insertion, removal and relocation.
///
/// A parent registers hooks with [`MemDom::set_ui_hooks`]. The host adapter
/// routes element children of that parent through the hooks instead of
/// mutating the tree directly, which lets callers animate or defer the
/// change. Text and comment nodes always bypass the hooks.
///
/// Every method defaults to the plain structural mutation.
pub trait UiHooks {
    fn insert_element(&self, dom: &MemDom, node: NodeId, parent: NodeId, before: Option<NodeId>) {
        dom.apply_insert(node, parent, before);
    }

    fn remove_element(&self, dom: &MemDom, node: NodeId) {
        dom.apply_remove(node);
    }

    fn move_element(&self, dom: &MemDom, node: NodeId, parent: NodeId, before: Option<NodeId>) {
        dom.apply_insert(node, parent, before);
    }
}
