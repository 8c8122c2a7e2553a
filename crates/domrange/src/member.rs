use crate::error::RangeError;
use crate::range::Range;
use core_types::HostTree;
use std::fmt;

/// One entry of a range: a host node or a nested range.
pub enum Member<H: HostTree> {
    Node(H::Node),
    Range(Range<H>),
}

impl<H: HostTree> Member<H> {
    pub fn node(node: H::Node) -> Self {
        Member::Node(node)
    }

    pub fn as_node(&self) -> Option<&H::Node> {
        match self {
            Member::Node(n) => Some(n),
            Member::Range(_) => None,
        }
    }

    pub fn as_range(&self) -> Option<&Range<H>> {
        match self {
            Member::Node(_) => None,
            Member::Range(r) => Some(r),
        }
    }

    /// First concrete host node, descending through nested ranges.
    pub(crate) fn first_node(&self) -> Result<H::Node, RangeError> {
        match self {
            Member::Node(n) => Ok(n.clone()),
            Member::Range(r) => r.first_node(),
        }
    }

    /// Last concrete host node, descending through nested ranges.
    pub(crate) fn last_node(&self) -> Result<H::Node, RangeError> {
        match self {
            Member::Node(n) => Ok(n.clone()),
            Member::Range(r) => r.last_node(),
        }
    }
}

impl<H: HostTree> Clone for Member<H> {
    fn clone(&self) -> Self {
        match self {
            Member::Node(n) => Member::Node(n.clone()),
            Member::Range(r) => Member::Range(r.clone()),
        }
    }
}

/// Nodes compare by value, ranges by identity.
impl<H: HostTree> PartialEq for Member<H> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Member::Node(a), Member::Node(b)) => a == b,
            (Member::Range(a), Member::Range(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl<H: HostTree> fmt::Debug for Member<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Member::Node(n) => f.debug_tuple("Node").field(n).finish(),
            Member::Range(r) => f.debug_tuple("Range").field(r).finish(),
        }
    }
}

impl<H: HostTree> From<Range<H>> for Member<H> {
    fn from(range: Range<H>) -> Self {
        Member::Range(range)
    }
}

impl<H: HostTree> From<&Range<H>> for Member<H> {
    fn from(range: &Range<H>) -> Self {
        Member::Range(range.clone())
    }
}
