//! The logical range and its structural operations.
//!
//! Invariants:
//! - While attached, `members` and the host-tree order under `host_parent`
//!   are identical. A detached range has no host footprint.
//! - An attached range shows either its members or its placeholder, never
//!   both and never neither.
//! - A node or range is a direct member of at most one range at a time.
//! - The member list is updated before the matching host mutation is issued.

use crate::augment::Augmenter;
use crate::error::RangeError;
use crate::host::RangeHost;
use crate::member::Member;
use core_types::HostTree;
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

type StopCallback<H> = Box<dyn FnOnce(&Range<H>)>;
type SharedAugmenter<H> = Rc<RefCell<dyn Augmenter<H>>>;

pub(crate) struct RangeNode<H: HostTree> {
    host: Rc<RangeHost<H>>,
    state: RefCell<RangeState<H>>,
}

// Owner entries for nodes this range still holds go with it.
impl<H: HostTree> Drop for RangeNode<H> {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        self.host
            .release_dead(state.members.iter().filter_map(Member::as_node));
    }
}

struct RangeState<H: HostTree> {
    members: Vec<Member<H>>,
    attached: bool,
    host_parent: Option<H::Node>,
    placeholder: Option<H::Node>,
    parent_range: Weak<RangeNode<H>>,
    stop_callbacks: Vec<StopCallback<H>>,
    augmenters: Vec<SharedAugmenter<H>>,
}

// How a member reaches its spot in the host tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Placement {
    // First insertion: nested ranges attach and fire their augmenters.
    Insert,
    // Relocation under the same parent: no ownership or augmenter churn.
    Relocate,
}

/// An ordered group of host nodes and nested ranges, addressable as a unit.
///
/// `Range` is a cheap handle; clones refer to the same range and compare
/// equal by identity.
pub struct Range<H: HostTree> {
    node: Rc<RangeNode<H>>,
}

/// Non-owning handle to a [`Range`].
pub struct WeakRange<H: HostTree> {
    node: Weak<RangeNode<H>>,
}

impl<H: HostTree> Range<H> {
    /// Create a detached range holding `members`.
    pub fn new(host: &Rc<RangeHost<H>>, members: Vec<Member<H>>) -> Result<Self, RangeError> {
        let range = Self::empty(host);
        range.validate_incoming(&members, false)?;
        for m in &members {
            range.member_in(m);
        }
        range.state_mut().members = members;
        Ok(range)
    }

    pub fn empty(host: &Rc<RangeHost<H>>) -> Self {
        Self {
            node: Rc::new(RangeNode {
                host: Rc::clone(host),
                state: RefCell::new(RangeState {
                    members: Vec::new(),
                    attached: false,
                    host_parent: None,
                    placeholder: None,
                    parent_range: Weak::new(),
                    stop_callbacks: Vec::new(),
                    augmenters: Vec::new(),
                }),
            }),
        }
    }

    pub(crate) fn from_node(node: Rc<RangeNode<H>>) -> Self {
        Self { node }
    }

    pub(crate) fn weak_node(&self) -> Weak<RangeNode<H>> {
        Rc::downgrade(&self.node)
    }

    fn state(&self) -> Ref<'_, RangeState<H>> {
        self.node.state.borrow()
    }

    fn state_mut(&self) -> RefMut<'_, RangeState<H>> {
        self.node.state.borrow_mut()
    }

    pub fn host(&self) -> &Rc<RangeHost<H>> {
        &self.node.host
    }

    pub fn tree(&self) -> &H {
        self.node.host.tree()
    }

    pub fn downgrade(&self) -> WeakRange<H> {
        WeakRange {
            node: self.weak_node(),
        }
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }

    pub fn len(&self) -> usize {
        self.state().members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().members.is_empty()
    }

    pub fn is_attached(&self) -> bool {
        self.state().attached
    }

    /// Host node this range is inserted under, while attached.
    pub fn host_parent(&self) -> Option<H::Node> {
        self.state().host_parent.clone()
    }

    /// Range holding this one as a direct member.
    pub fn parent_range(&self) -> Option<Range<H>> {
        self.state().parent_range.upgrade().map(Range::from_node)
    }

    /// Snapshot of the current members.
    pub fn members(&self) -> Vec<Member<H>> {
        self.state().members.clone()
    }

    pub fn get_member(&self, index: usize) -> Result<Member<H>, RangeError> {
        let state = self.state();
        state
            .members
            .get(index)
            .cloned()
            .ok_or(RangeError::IndexOutOfRange {
                op: "get_member",
                index,
                len: state.members.len(),
            })
    }

    pub(crate) fn attached_parent(&self) -> Result<H::Node, RangeError> {
        let state = self.state();
        match (&state.host_parent, state.attached) {
            (Some(parent), true) => Ok(parent.clone()),
            _ => Err(RangeError::InvalidState("range is not attached")),
        }
    }

    /// Insert the range's content under `container`, before `before` or at the end.
    ///
    /// Nested ranges attach recursively; an empty range inserts a placeholder.
    /// Augmenter `attach` hooks fire afterwards, in registration order. A range
    /// that is a member of another range is attached through its parent.
    pub fn attach(&self, container: &H::Node, before: Option<&H::Node>) -> Result<(), RangeError> {
        self.ensure_top_level()?;
        self.attach_at(container, before)
    }

    /// Relocate an attached range to another position under the same container.
    ///
    /// Host nodes are moved, not reinserted, and augmenter hooks do not fire.
    pub fn move_to(&self, container: &H::Node, before: Option<&H::Node>) -> Result<(), RangeError> {
        self.ensure_top_level()?;
        self.relocate(container, before)
    }

    /// Remove the range's content from the host tree.
    ///
    /// Augmenter `detach` hooks fire afterwards with the container the range
    /// was attached under.
    pub fn detach(&self) -> Result<(), RangeError> {
        self.ensure_top_level()?;
        self.detach_inner()
    }

    fn ensure_top_level(&self) -> Result<(), RangeError> {
        if self.parent_range().is_some() {
            return Err(RangeError::InvalidState(
                "range is a member of another range; place it through its parent",
            ));
        }
        Ok(())
    }

    fn attach_at(&self, container: &H::Node, before: Option<&H::Node>) -> Result<(), RangeError> {
        self.check_placeable(container, Placement::Insert)?;
        self.place_all(container, before, Placement::Insert)?;
        log::trace!(target: "domrange.range", "attached {self:?}");
        for aug in self.augmenters() {
            self.run_hook(&aug, |hook| hook.attach(self, container));
        }
        self.check_invariants();
        Ok(())
    }

    fn relocate(&self, container: &H::Node, before: Option<&H::Node>) -> Result<(), RangeError> {
        self.check_placeable(container, Placement::Relocate)?;
        self.place_all(container, before, Placement::Relocate)?;
        self.check_invariants();
        Ok(())
    }

    // Verify the whole nested tree is in the state `placement` expects, so a
    // refusal happens before anything is touched.
    fn check_placeable(&self, container: &H::Node, placement: Placement) -> Result<(), RangeError> {
        let members = {
            let state = self.state();
            match placement {
                Placement::Insert if state.attached => {
                    return Err(RangeError::InvalidState("range is already attached"));
                }
                Placement::Relocate
                    if !state.attached || state.host_parent.as_ref() != Some(container) =>
                {
                    return Err(RangeError::InvalidState(
                        "can only move an attached range, and only under the same parent",
                    ));
                }
                _ => state.members.clone(),
            }
        };
        for m in &members {
            if let Member::Range(r) = m {
                r.check_placeable(container, placement)?;
            }
        }
        Ok(())
    }

    fn place_all(
        &self,
        container: &H::Node,
        before: Option<&H::Node>,
        placement: Placement,
    ) -> Result<(), RangeError> {
        let (members, placeholder) = {
            let mut state = self.state_mut();
            state.attached = true;
            state.host_parent = Some(container.clone());
            (state.members.clone(), state.placeholder.clone())
        };
        let tree = self.tree();
        if members.is_empty() {
            match (placement, placeholder) {
                (Placement::Relocate, Some(existing)) => {
                    tree.move_node(&existing, container, before);
                }
                _ => {
                    let placeholder = tree.create_placeholder();
                    tree.insert(&placeholder, container, before);
                    self.state_mut().placeholder = Some(placeholder);
                }
            }
            return Ok(());
        }
        self.state_mut().placeholder = None;
        for m in &members {
            self.place(m, container, before, placement)?;
        }
        Ok(())
    }

    fn place(
        &self,
        member: &Member<H>,
        container: &H::Node,
        before: Option<&H::Node>,
        placement: Placement,
    ) -> Result<(), RangeError> {
        match (member, placement) {
            (Member::Range(r), Placement::Insert) => r.attach_at(container, before),
            (Member::Range(r), Placement::Relocate) => r.relocate(container, before),
            (Member::Node(n), Placement::Insert) => {
                self.tree().insert(n, container, before);
                Ok(())
            }
            (Member::Node(n), Placement::Relocate) => {
                self.tree().move_node(n, container, before);
                Ok(())
            }
        }
    }

    fn unplace(&self, member: &Member<H>) -> Result<(), RangeError> {
        match member {
            Member::Range(r) => r.detach_inner(),
            Member::Node(n) => {
                self.tree().remove(n);
                Ok(())
            }
        }
    }

    fn detach_inner(&self) -> Result<(), RangeError> {
        let (container, members, placeholder) = {
            let mut state = self.state_mut();
            if !state.attached {
                return Err(RangeError::InvalidState("range is not attached"));
            }
            let Some(container) = state.host_parent.take() else {
                return Err(RangeError::InvalidState("attached range has no host parent"));
            };
            state.attached = false;
            (container, state.members.clone(), state.placeholder.take())
        };
        if let Some(placeholder) = placeholder {
            self.tree().remove(&placeholder);
        }
        for m in &members {
            self.unplace(m)?;
        }
        log::trace!(target: "domrange.range", "detached {self:?} from {container:?}");
        for aug in self.augmenters() {
            self.run_hook(&aug, |hook| hook.detach(self, &container));
        }
        Ok(())
    }

    // A hook that edits its own range can re-enter attach/detach; the hook
    // already running is not called again for that nested transition.
    fn run_hook(
        &self,
        aug: &SharedAugmenter<H>,
        call: impl FnOnce(&mut (dyn Augmenter<H> + 'static)),
    ) {
        match aug.try_borrow_mut() {
            Ok(mut hook) => call(&mut *hook),
            Err(_) => {
                log::debug!(target: "domrange.range", "skipping re-entered augmenter on {self:?}");
            }
        }
    }

    /// Replace every member at once.
    ///
    /// An attached range is fully detached and reattached at the same spot,
    /// which re-fires its augmenter hooks. Going from empty to empty is a
    /// no-op. Use the single-member operations for incremental updates.
    pub fn set_members(&self, members: Vec<Member<H>>) -> Result<(), RangeError> {
        self.validate_incoming(&members, true)?;
        for m in &self.members() {
            self.member_out(m);
        }
        for m in &members {
            self.member_in(m);
        }
        self.rebuild(members)?;
        self.check_invariants();
        Ok(())
    }

    // Swap the member list, tearing down and reattaching host content if attached.
    fn rebuild(&self, members: Vec<Member<H>>) -> Result<(), RangeError> {
        let (attached, was_empty) = {
            let state = self.state();
            (state.attached, state.members.is_empty())
        };
        if !attached {
            self.state_mut().members = members;
            return Ok(());
        }
        if was_empty && members.is_empty() {
            return Ok(());
        }
        let container = self.attached_parent()?;
        let next = self.tree().next_sibling(&self.last_node()?);
        self.detach_inner()?;
        log::trace!(
            target: "domrange.range",
            "rebuilding {self:?} with {} member(s)",
            members.len()
        );
        self.state_mut().members = members;
        self.attach_at(&container, next.as_ref())
    }

    /// Insert `member` at `index`, which may equal the current length.
    pub fn add_member(&self, member: Member<H>, index: usize) -> Result<(), RangeError> {
        let len = self.len();
        if index > len {
            return Err(RangeError::IndexOutOfRange {
                op: "add_member",
                index,
                len,
            });
        }
        self.validate_incoming(std::slice::from_ref(&member), false)?;
        self.member_in(&member);
        self.insert_at(member, index, Placement::Insert)?;
        self.check_invariants();
        Ok(())
    }

    fn insert_at(
        &self,
        member: Member<H>,
        index: usize,
        placement: Placement,
    ) -> Result<(), RangeError> {
        let (attached, len) = {
            let state = self.state();
            (state.attached, state.members.len())
        };
        if !attached {
            self.state_mut().members.insert(index, member);
            return Ok(());
        }
        if len == 0 {
            // Reuse the empty-to-non-empty path, which drops the placeholder.
            return self.rebuild(vec![member]);
        }
        let container = self.attached_parent()?;
        let before = if index == len {
            self.tree().next_sibling(&self.last_node()?)
        } else {
            let anchor = self.state().members[index].clone();
            Some(anchor.first_node()?)
        };
        self.state_mut().members.insert(index, member.clone());
        self.place(&member, &container, before.as_ref(), placement)
    }

    /// Remove and return the member at `index`.
    pub fn remove_member(&self, index: usize) -> Result<Member<H>, RangeError> {
        let len = self.len();
        if index >= len {
            return Err(RangeError::IndexOutOfRange {
                op: "remove_member",
                index,
                len,
            });
        }
        let member = self.state().members[index].clone();
        self.member_out(&member);
        if len == 1 {
            // Reuse the non-empty-to-empty path, which inserts the placeholder.
            self.rebuild(Vec::new())?;
        } else {
            let attached = {
                let mut state = self.state_mut();
                state.members.remove(index);
                state.attached
            };
            if attached {
                self.unplace(&member)?;
            }
        }
        self.check_invariants();
        Ok(member)
    }

    /// Move the member at `from` so that it ends up at index `to`.
    ///
    /// The member keeps its identity and ownership; its host nodes are
    /// relocated and no augmenter hook fires.
    pub fn move_member(&self, from: usize, to: usize) -> Result<(), RangeError> {
        let len = self.len();
        for index in [from, to] {
            if index >= len {
                return Err(RangeError::IndexOutOfRange {
                    op: "move_member",
                    index,
                    len,
                });
            }
        }
        if from == to {
            return Ok(());
        }
        let member = self.state_mut().members.remove(from);
        self.insert_at(member, to, Placement::Relocate)?;
        self.check_invariants();
        Ok(())
    }

    /// First host node of the range, or its placeholder when empty.
    pub fn first_node(&self) -> Result<H::Node, RangeError> {
        let first = {
            let state = self.state();
            if !state.attached {
                return Err(RangeError::InvalidState("range is not attached"));
            }
            match state.members.first() {
                Some(m) => m.clone(),
                None => return placeholder_of(&state),
            }
        };
        first.first_node()
    }

    /// Last host node of the range, or its placeholder when empty.
    pub fn last_node(&self) -> Result<H::Node, RangeError> {
        let last = {
            let state = self.state();
            if !state.attached {
                return Err(RangeError::InvalidState("range is not attached"));
            }
            match state.members.last() {
                Some(m) => m.clone(),
                None => return placeholder_of(&state),
            }
        };
        last.last_node()
    }

    /// Host nodes the range currently occupies, in order.
    pub fn host_nodes(&self) -> Result<Vec<H::Node>, RangeError> {
        let members = {
            let state = self.state();
            if !state.attached {
                return Err(RangeError::InvalidState("range is not attached"));
            }
            if state.members.is_empty() {
                return placeholder_of(&state).map(|p| vec![p]);
            }
            state.members.clone()
        };
        let mut nodes = Vec::with_capacity(members.len());
        for m in members {
            match m {
                Member::Node(n) => nodes.push(n),
                Member::Range(r) => nodes.extend(r.host_nodes()?),
            }
        }
        Ok(nodes)
    }

    /// Register an augmenter. It sees every later attach and detach, not
    /// relocations. Returns a handle for inspecting it.
    pub fn add_augmenter<A: Augmenter<H> + 'static>(&self, augmenter: A) -> Rc<RefCell<A>> {
        let shared = Rc::new(RefCell::new(augmenter));
        let hook: SharedAugmenter<H> = shared.clone();
        self.state_mut().augmenters.push(hook);
        shared
    }

    // Snapshot, so hooks may register augmenters or edit the range (see `run_hook`).
    fn augmenters(&self) -> Vec<SharedAugmenter<H>> {
        self.state().augmenters.clone()
    }

    /// Register a callback to run once when the range is stopped.
    pub fn on_stop(&self, callback: impl FnOnce(&Range<H>) + 'static) {
        self.state_mut().stop_callbacks.push(Box::new(callback));
    }

    /// Run the stop callbacks in registration order and forget them.
    /// Stopping again does nothing.
    pub fn stop(&self) {
        let callbacks = std::mem::take(&mut self.state_mut().stop_callbacks);
        if !callbacks.is_empty() {
            log::trace!(target: "domrange.range", "stopping {self:?}");
        }
        for callback in callbacks {
            callback(self);
        }
    }

    fn member_in(&self, member: &Member<H>) {
        match member {
            Member::Range(r) => r.state_mut().parent_range = self.weak_node(),
            Member::Node(n) => self.node.host.set_owner(n, self),
        }
    }

    fn member_out(&self, member: &Member<H>) {
        match member {
            Member::Range(r) => r.state_mut().parent_range = Weak::new(),
            Member::Node(n) => self.node.host.clear_owner(n),
        }
    }

    // Check that `incoming` may become members. With `replacing`, members
    // currently held by this range are allowed since they are released first.
    fn validate_incoming(&self, incoming: &[Member<H>], replacing: bool) -> Result<(), RangeError> {
        for (i, m) in incoming.iter().enumerate() {
            if incoming[..i].contains(m) {
                return Err(RangeError::InvalidArgument(format!("duplicate member {m:?}")));
            }
            match m {
                Member::Range(r) => {
                    if r.ptr_eq(self) {
                        return Err(RangeError::InvalidArgument(
                            "a range cannot be a member of itself".to_string(),
                        ));
                    }
                    if r.is_in_chain(self.parent_range()) {
                        return Err(RangeError::InvalidArgument(
                            "a range cannot contain one of its ancestors".to_string(),
                        ));
                    }
                    let parent = r.parent_range();
                    let ours = replacing && parent.as_ref().is_some_and(|p| p.ptr_eq(self));
                    if !ours && parent.is_some() {
                        return Err(RangeError::InvalidState("range already belongs to a range"));
                    }
                    if !ours && r.is_attached() {
                        return Err(RangeError::InvalidState("member range is attached elsewhere"));
                    }
                }
                Member::Node(n) => {
                    if let Some(owner) = self.node.host.owner(n) {
                        if !(replacing && owner.ptr_eq(self)) {
                            return Err(RangeError::InvalidState("node already belongs to a range"));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn check_invariants(&self) {
        #[cfg(any(test, feature = "range-invariants"))]
        crate::invariants::verify_footprint(self);
    }
}

fn placeholder_of<H: HostTree>(state: &RangeState<H>) -> Result<H::Node, RangeError> {
    state
        .placeholder
        .clone()
        .ok_or(RangeError::InvalidState("attached empty range has no placeholder"))
}

impl<H: HostTree> Clone for Range<H> {
    fn clone(&self) -> Self {
        Self {
            node: Rc::clone(&self.node),
        }
    }
}

impl<H: HostTree> PartialEq for Range<H> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<H: HostTree> Eq for Range<H> {}

impl<H: HostTree> fmt::Debug for Range<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Range");
        s.field("id", &Rc::as_ptr(&self.node));
        if let Ok(state) = self.node.state.try_borrow() {
            s.field("members", &state.members.len())
                .field("attached", &state.attached)
                .field("host_parent", &state.host_parent);
        }
        s.finish_non_exhaustive()
    }
}

impl<H: HostTree> WeakRange<H> {
    pub fn upgrade(&self) -> Option<Range<H>> {
        self.node.upgrade().map(Range::from_node)
    }
}

impl<H: HostTree> Clone for WeakRange<H> {
    fn clone(&self) -> Self {
        Self {
            node: Weak::clone(&self.node),
        }
    }
}

impl<H: HostTree> fmt::Debug for WeakRange<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(WeakRange)")
    }
}
