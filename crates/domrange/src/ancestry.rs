//! Logical containment queries.
//!
//! Containment is answered in two phases: walk host-tree parents from the
//! candidate node up to the level of the range's attach point, then follow
//! `parent_range` links from whichever range owns the node found there. The
//! cost is bounded by nesting depth, not by the size of the subtree.

use crate::error::RangeError;
use crate::range::Range;
use core_types::HostTree;

impl<H: HostTree> Range<H> {
    /// Whether `node` lies inside this range's logical content.
    pub fn contains_element(&self, node: &H::Node) -> Result<bool, RangeError> {
        let container = self.attached_parent()?;
        let tree = self.tree();
        if !tree.is_ancestor(&container, node) {
            return Ok(false);
        }

        // Host phase: climb to the child of `container` holding `node`.
        let mut level = node.clone();
        loop {
            match tree.parent(&level) {
                Some(parent) if parent == container => break,
                Some(parent) => level = parent,
                // Unreachable while `is_ancestor` holds; treat as outside.
                None => return Ok(false),
            }
        }

        // Logical phase: follow parent ranges from the owner of that child.
        Ok(self.is_in_chain(self.host().owner(&level)))
    }

    /// Whether `other` is nested somewhere inside this range. A range never
    /// contains itself; a detached `other` is never contained.
    pub fn contains_range(&self, other: &Range<H>) -> Result<bool, RangeError> {
        let container = self.attached_parent()?;
        let Some(other_parent) = other.host_parent().filter(|_| other.is_attached()) else {
            return Ok(false);
        };
        if other_parent != container {
            return self.contains_element(&other_parent);
        }
        if other.ptr_eq(self) {
            return Ok(false);
        }
        Ok(self.is_in_chain(Some(other.clone())))
    }

    /// Scoped query: nodes under the attach point matching `pattern` that
    /// belong to this range, in document order.
    pub fn select(&self, pattern: &str) -> Result<Vec<H::Node>, RangeError> {
        let container = self.attached_parent()?;
        let candidates = self.tree().find_by_selector(pattern, &container)?;
        let mut found = Vec::with_capacity(candidates.len());
        for node in candidates {
            if self.contains_element(&node)? {
                found.push(node);
            }
        }
        log::trace!(
            target: "domrange.range",
            "select {pattern:?} in {self:?}: {} match(es)",
            found.len()
        );
        Ok(found)
    }

    /// Whether this range is `start` or one of its enclosing ranges.
    pub(crate) fn is_in_chain(&self, start: Option<Range<H>>) -> bool {
        let mut current = start;
        while let Some(range) = current {
            if range.ptr_eq(self) {
                return true;
            }
            current = range.parent_range();
        }
        false
    }
}
