//! Delegated event listeners and bubbling dispatch.

use crate::arena::NodeId;
use core_types::{DelegatedHandler, Subscription};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

pub(crate) enum Matcher {
    /// Empty selector: only the dispatch target itself.
    Target,
    Selectors(css::SelectorList),
    /// Selector failed to parse; the listener never fires.
    Never,
}

pub(crate) struct Listener {
    pub(crate) id: u64,
    pub(crate) container: NodeId,
    pub(crate) kind: String,
    pub(crate) matcher: Matcher,
    pub(crate) handler: DelegatedHandler<NodeId>,
}

#[derive(Default)]
pub(crate) struct ListenerTable {
    next_id: u64,
    listeners: Vec<Rc<Listener>>,
}

impl ListenerTable {
    pub(crate) fn add(
        &mut self,
        container: NodeId,
        kind: &str,
        matcher: Matcher,
        handler: DelegatedHandler<NodeId>,
    ) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.listeners.push(Rc::new(Listener {
            id,
            container,
            kind: kind.to_string(),
            matcher,
            handler,
        }));
        id
    }

    pub(crate) fn remove(&mut self, id: u64) {
        self.listeners.retain(|l| l.id != id);
    }

    pub(crate) fn is_live(&self, id: u64) -> bool {
        self.listeners.iter().any(|l| l.id == id)
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Listeners for `kind`, in registration order.
    pub(crate) fn snapshot(&self, kind: &str) -> Vec<Rc<Listener>> {
        self.listeners
            .iter()
            .filter(|l| l.kind == kind)
            .cloned()
            .collect()
    }
}

/// Subscription returned by [`MemDom`](crate::MemDom)'s delegated event registration.
#[derive(Debug)]
pub struct ListenerHandle {
    pub(crate) table: Weak<RefCell<ListenerTable>>,
    pub(crate) id: u64,
}

impl Subscription for ListenerHandle {
    fn stop(self) {
        if let Some(table) = self.table.upgrade() {
            table.borrow_mut().remove(self.id);
            log::trace!(target: "memdom", "listener {} stopped", self.id);
        }
    }
}
