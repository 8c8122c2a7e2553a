//! Logical ranges over a mutable host tree.
//!
//! This crate bundles the range engine ([`domrange`]) with the in-memory host
//! tree ([`memdom`]) it is usually exercised against:
//!
//! ```
//! use logical_ranges::{MemDom, Member, Range, RangeHost};
//!
//! let host = RangeHost::new(MemDom::new());
//! let dom = host.tree();
//! let list = dom.create_element("ul");
//! dom.append_child(dom.document(), list).unwrap();
//!
//! let item = dom.create_element("li");
//! let range = Range::new(&host, vec![Member::node(item)]).unwrap();
//! range.attach(&list, None).unwrap();
//! assert_eq!(range.contains_element(&item), Ok(true));
//! ```

pub use core_types::{DelegatedEvent, HostError, HostTree, Subscription};
pub use domrange::{
    Augmenter, EventAugmenter, EventClause, EventHandler, Member, Range, RangeError, RangeEvent,
    RangeHost, WeakRange, parse_event_spec,
};
pub use memdom::{MemDom, NodeId, NodeKind, UiHooks};

pub use domrange;
pub use memdom;
