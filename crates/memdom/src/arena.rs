//! Node storage for the in-memory host tree.
//!
//! Invariants:
//! - A node has at most one parent, and appears exactly once in that parent's
//!   `children`.
//! - Structural operations never create cycles.
//! - Nodes are never freed. Removing a node only detaches it, so ids stay
//!   valid for the lifetime of the arena.

use std::fmt::Write;

/// Handle of a node in a [`MemDom`](crate::MemDom).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    /// Off-tree container, not searchable by selectors.
    Fragment,
    Element {
        name: String,
        attributes: Vec<(String, Option<String>)>,
    },
    Text {
        text: String,
    },
    Comment {
        text: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ArenaError {
    #[error("unknown node {0:?}")]
    MissingNode(NodeId),
    #[error("node {0:?} cannot have children")]
    InvalidParent(NodeId),
    #[error("{before:?} is not a child of {parent:?}")]
    InvalidSibling { parent: NodeId, before: NodeId },
    #[error("inserting {child:?} under {parent:?} would create a cycle")]
    CycleDetected { parent: NodeId, child: NodeId },
    #[error("node {0:?} is not an element")]
    WrongNodeKind(NodeId),
}

pub(crate) struct NodeArena {
    nodes: Vec<NodeRecord>,
}

struct NodeRecord {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl NodeRecord {
    fn allows_children(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Document | NodeKind::Fragment | NodeKind::Element { .. }
        )
    }
}

impl NodeArena {
    pub(crate) fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub(crate) fn create(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeRecord {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    fn record(&self, id: NodeId) -> Result<&NodeRecord, ArenaError> {
        self.nodes.get(id.index()).ok_or(ArenaError::MissingNode(id))
    }

    fn record_mut(&mut self, id: NodeId) -> Result<&mut NodeRecord, ArenaError> {
        self.nodes
            .get_mut(id.index())
            .ok_or(ArenaError::MissingNode(id))
    }

    pub(crate) fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(id.index()).map(|r| &r.kind)
    }

    pub(crate) fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.index()).and_then(|r| r.parent)
    }

    pub(crate) fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.index())
            .map(|r| r.children.as_slice())
            .unwrap_or(&[])
    }

    pub(crate) fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|k| *k == id)?;
        siblings.get(pos + 1).copied()
    }

    /// Whether `ancestor` is a strict ancestor of `node`.
    pub(crate) fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.parent(node);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.parent(p);
        }
        false
    }

    /// Insert `child` under `parent` before `before` (append when `None`).
    ///
    /// A child that already has a parent is moved. Passing the child itself as
    /// `before` keeps it where it is.
    pub(crate) fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        before: Option<NodeId>,
    ) -> Result<(), ArenaError> {
        self.record(child)?;
        if !self.record(parent)?.allows_children() {
            return Err(ArenaError::InvalidParent(parent));
        }
        if parent == child || self.is_ancestor(child, parent) {
            return Err(ArenaError::CycleDetected { parent, child });
        }
        let before = match before {
            Some(b) if b == child => {
                if self.parent(child) != Some(parent) {
                    return Err(ArenaError::InvalidSibling { parent, before: b });
                }
                self.next_sibling(child)
            }
            Some(b) => {
                if self.record(b)?.parent != Some(parent) {
                    return Err(ArenaError::InvalidSibling { parent, before: b });
                }
                Some(b)
            }
            None => None,
        };

        self.detach(child)?;
        let siblings = &mut self.record_mut(parent)?.children;
        match before {
            Some(b) => {
                let pos = siblings
                    .iter()
                    .position(|k| *k == b)
                    .ok_or(ArenaError::InvalidSibling { parent, before: b })?;
                siblings.insert(pos, child);
            }
            None => siblings.push(child),
        }
        self.record_mut(child)?.parent = Some(parent);
        Ok(())
    }

    pub(crate) fn detach(&mut self, child: NodeId) -> Result<(), ArenaError> {
        let Some(parent) = self.record_mut(child)?.parent.take() else {
            return Ok(());
        };
        let siblings = &mut self.record_mut(parent)?.children;
        siblings.retain(|k| *k != child);
        Ok(())
    }

    pub(crate) fn set_attribute(
        &mut self,
        id: NodeId,
        name: &str,
        value: Option<&str>,
    ) -> Result<(), ArenaError> {
        match &mut self.record_mut(id)?.kind {
            NodeKind::Element { attributes, .. } => {
                let value = value.map(str::to_string);
                match attributes
                    .iter_mut()
                    .find(|(k, _)| k.eq_ignore_ascii_case(name))
                {
                    Some(existing) => existing.1 = value,
                    None => attributes.push((name.to_ascii_lowercase(), value)),
                }
                Ok(())
            }
            _ => Err(ArenaError::WrongNodeKind(id)),
        }
    }

    /// Strict descendants of `root` in document order.
    pub(crate) fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(root).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    pub(crate) fn outline(&self, root: NodeId) -> String {
        let mut out = String::new();
        self.outline_node(root, 0, &mut out);
        out
    }

    fn outline_node(&self, id: NodeId, depth: usize, out: &mut String) {
        let indent = "  ".repeat(depth);
        let _ = match self.kind(id) {
            Some(NodeKind::Document) => writeln!(out, "{indent}#document"),
            Some(NodeKind::Fragment) => writeln!(out, "{indent}#fragment"),
            Some(NodeKind::Element { name, attributes }) => {
                let mut line = format!("{indent}<{name}");
                for (k, v) in attributes {
                    match v {
                        Some(v) => {
                            let _ = write!(line, " {k}=\"{v}\"");
                        }
                        None => {
                            let _ = write!(line, " {k}");
                        }
                    }
                }
                writeln!(out, "{line}>")
            }
            Some(NodeKind::Text { text }) => writeln!(out, "{indent}\"{text}\""),
            Some(NodeKind::Comment { text }) => writeln!(out, "{indent}<!--{text}-->"),
            None => writeln!(out, "{indent}<missing {}>", id.0),
        };
        for child in self.children(id) {
            self.outline_node(*child, depth + 1, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(arena: &mut NodeArena, name: &str) -> NodeId {
        arena.create(NodeKind::Element {
            name: name.to_string(),
            attributes: Vec::new(),
        })
    }

    #[test]
    fn insert_before_moves_existing_child() {
        let mut arena = NodeArena::new();
        let root = element(&mut arena, "div");
        let a = element(&mut arena, "a");
        let b = element(&mut arena, "b");
        let c = element(&mut arena, "c");
        for n in [a, b, c] {
            arena.insert_before(root, n, None).unwrap();
        }
        arena.insert_before(root, c, Some(a)).unwrap();
        assert_eq!(arena.children(root), &[c, a, b]);
        assert_eq!(arena.parent(c), Some(root));
    }

    #[test]
    fn insert_before_self_is_noop() {
        let mut arena = NodeArena::new();
        let root = element(&mut arena, "div");
        let a = element(&mut arena, "a");
        let b = element(&mut arena, "b");
        arena.insert_before(root, a, None).unwrap();
        arena.insert_before(root, b, None).unwrap();
        arena.insert_before(root, a, Some(a)).unwrap();
        assert_eq!(arena.children(root), &[a, b]);
    }

    #[test]
    fn rejects_cycles_and_text_parents() {
        let mut arena = NodeArena::new();
        let outer = element(&mut arena, "div");
        let inner = element(&mut arena, "span");
        let text = arena.create(NodeKind::Text {
            text: "x".to_string(),
        });
        arena.insert_before(outer, inner, None).unwrap();
        assert_eq!(
            arena.insert_before(inner, outer, None),
            Err(ArenaError::CycleDetected {
                parent: inner,
                child: outer
            })
        );
        assert_eq!(
            arena.insert_before(text, inner, None),
            Err(ArenaError::InvalidParent(text))
        );
        assert_eq!(arena.children(outer), &[inner]);
    }

    #[test]
    fn rejects_foreign_sibling() {
        let mut arena = NodeArena::new();
        let root = element(&mut arena, "div");
        let other = element(&mut arena, "div");
        let a = element(&mut arena, "a");
        let stray = element(&mut arena, "b");
        arena.insert_before(other, stray, None).unwrap();
        assert_eq!(
            arena.insert_before(root, a, Some(stray)),
            Err(ArenaError::InvalidSibling {
                parent: root,
                before: stray
            })
        );
        assert_eq!(arena.parent(a), None);
    }

    #[test]
    fn descendants_are_in_document_order() {
        let mut arena = NodeArena::new();
        let root = element(&mut arena, "root");
        let a = element(&mut arena, "a");
        let a1 = element(&mut arena, "a1");
        let b = element(&mut arena, "b");
        arena.insert_before(root, a, None).unwrap();
        arena.insert_before(a, a1, None).unwrap();
        arena.insert_before(root, b, None).unwrap();
        assert_eq!(arena.descendants(root), vec![a, a1, b]);
        assert!(arena.is_ancestor(root, a1));
        assert!(!arena.is_ancestor(a1, a1));
        assert_eq!(arena.next_sibling(a), Some(b));
        assert_eq!(arena.next_sibling(b), None);
    }
}
