use crate::arena::{NodeArena, NodeId, NodeKind};
use css::Element;

/// Borrowed view of an element node for selector matching.
#[derive(Clone, Copy)]
pub(crate) struct ElementRef<'a> {
    arena: &'a NodeArena,
    id: NodeId,
    name: &'a str,
    attributes: &'a [(String, Option<String>)],
}

impl<'a> ElementRef<'a> {
    pub(crate) fn new(arena: &'a NodeArena, id: NodeId) -> Option<Self> {
        match arena.kind(id)? {
            NodeKind::Element { name, attributes } => Some(Self {
                arena,
                id,
                name,
                attributes,
            }),
            _ => None,
        }
    }
}

impl Element for ElementRef<'_> {
    fn local_name(&self) -> &str {
        self.name
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_deref().unwrap_or(""))
    }

    fn parent_element(&self) -> Option<Self> {
        ElementRef::new(self.arena, self.arena.parent(self.id)?)
    }
}

pub(crate) fn matches(arena: &NodeArena, id: NodeId, selectors: &css::SelectorList) -> bool {
    ElementRef::new(arena, id).is_some_and(|el| selectors.matches(&el))
}
