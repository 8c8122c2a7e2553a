//! Logical ranges over a mutable host tree.
//!
//! A [`Range`] groups host nodes and nested ranges into one unit that can be
//! attached under a container, detached, and edited member by member while
//! the host tree is kept in step. Each range remembers its enclosing range
//! and each directly owned host node remembers its range (through the
//! [`RangeHost`] side table), which lets [`Range::contains_element`] answer
//! containment in time proportional to nesting depth.
//!
//! Lifecycle observers implement [`Augmenter`]; [`EventAugmenter`] uses that
//! to scope delegated events to a range's own content.

mod ancestry;
mod augment;
mod error;
mod events;
mod host;
#[cfg(any(test, feature = "range-invariants"))]
mod invariants;
mod member;
mod range;

pub use augment::Augmenter;
pub use error::RangeError;
pub use events::{EventAugmenter, EventClause, EventHandler, RangeEvent, parse_event_spec};
pub use host::RangeHost;
pub use member::Member;
pub use range::{Range, WeakRange};
