//! Delegated event handling scoped to a range's logical content.
//!
//! A host tree delivers a delegated event to every subscription on the
//! container, so sibling ranges sharing a container would see each other's
//! events. [`EventAugmenter`] subscribes at attach time and drops any event
//! whose current target the range does not logically contain.

use crate::augment::Augmenter;
use crate::range::Range;
use core_types::{DelegatedEvent, DelegatedHandler, HostTree, Subscription};
use std::fmt;
use std::rc::Rc;

/// An event delivered to a range-scoped handler.
pub struct RangeEvent<'a, H: HostTree> {
    pub range: &'a Range<H>,
    pub kind: &'a str,
    pub target: &'a H::Node,
    pub current_target: &'a H::Node,
}

pub type EventHandler<H> = Rc<dyn Fn(&RangeEvent<'_, H>)>;

/// One `kind selector` clause of an event pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventClause {
    pub kind: String,
    /// Empty when the clause names only an event kind.
    pub selector: String,
}

/// Split an event pattern such as `"click .button, keydown input"` into clauses.
///
/// Clauses are separated by commas. Within a clause the first
/// whitespace-separated token is the event kind and the remaining tokens,
/// joined by single spaces, form the selector. Blank clauses are skipped.
pub fn parse_event_spec(spec: &str) -> Vec<EventClause> {
    spec.split(',')
        .filter_map(|clause| {
            let mut tokens = clause.split_whitespace();
            let kind = tokens.next()?;
            Some(EventClause {
                kind: kind.to_string(),
                selector: tokens.collect::<Vec<_>>().join(" "),
            })
        })
        .collect()
}

/// Augmenter that keeps delegated subscriptions alive while its range is attached.
pub struct EventAugmenter<H: HostTree> {
    bindings: Vec<(EventClause, EventHandler<H>)>,
    handles: Vec<H::Subscription>,
}

impl<H: HostTree> EventAugmenter<H> {
    /// Build from `(pattern, handler)` pairs; see [`parse_event_spec`] for the pattern syntax.
    pub fn new<'s>(event_map: impl IntoIterator<Item = (&'s str, EventHandler<H>)>) -> Self {
        let mut augmenter = Self::default();
        for (spec, handler) in event_map {
            augmenter = augmenter.on(spec, handler);
        }
        augmenter
    }

    pub fn on(mut self, spec: &str, handler: EventHandler<H>) -> Self {
        for clause in parse_event_spec(spec) {
            self.bindings.push((clause, Rc::clone(&handler)));
        }
        self
    }

    pub fn clauses(&self) -> impl Iterator<Item = &EventClause> {
        self.bindings.iter().map(|(clause, _)| clause)
    }

    /// Live host subscriptions; non-zero only while the range is attached.
    pub fn subscription_count(&self) -> usize {
        self.handles.len()
    }
}

impl<H: HostTree> Default for EventAugmenter<H> {
    fn default() -> Self {
        Self {
            bindings: Vec::new(),
            handles: Vec::new(),
        }
    }
}

impl<H: HostTree> Augmenter<H> for EventAugmenter<H> {
    fn attach(&mut self, range: &Range<H>, container: &H::Node) {
        for (clause, handler) in &self.bindings {
            let weak = range.downgrade();
            let handler = Rc::clone(handler);
            let wrapper: DelegatedHandler<H::Node> =
                Rc::new(move |evt: &DelegatedEvent<'_, H::Node>| {
                    let Some(range) = weak.upgrade() else {
                        return;
                    };
                    match range.contains_element(evt.current_target) {
                        Ok(true) => (*handler)(&RangeEvent {
                            range: &range,
                            kind: evt.kind,
                            target: evt.target,
                            current_target: evt.current_target,
                        }),
                        Ok(false) => {
                            log::trace!(
                                target: "domrange.events",
                                "{} on {:?} is outside {range:?}",
                                evt.kind,
                                evt.current_target
                            );
                        }
                        Err(err) => {
                            log::debug!(target: "domrange.events", "dropping {}: {err}", evt.kind);
                        }
                    }
                });
            let handle = range
                .tree()
                .subscribe_delegated(container, &clause.kind, &clause.selector, wrapper);
            self.handles.push(handle);
        }
        log::trace!(
            target: "domrange.events",
            "{} subscription(s) for {range:?}",
            self.handles.len()
        );
    }

    fn detach(&mut self, _range: &Range<H>, _container: &H::Node) {
        for handle in self.handles.drain(..) {
            handle.stop();
        }
    }
}

impl<H: HostTree> fmt::Debug for EventAugmenter<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventAugmenter")
            .field("clauses", &self.clauses().collect::<Vec<_>>())
            .field("subscriptions", &self.handles.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn clause(kind: &str, selector: &str) -> EventClause {
        EventClause {
            kind: kind.to_string(),
            selector: selector.to_string(),
        }
    }

    #[rstest]
    #[case("click", vec![clause("click", "")])]
    #[case("click .button", vec![clause("click", ".button")])]
    #[case("click  div   > p", vec![clause("click", "div > p")])]
    #[case(
        "click .a, keydown input",
        vec![clause("click", ".a"), clause("keydown", "input")]
    )]
    #[case("click .a,,  ", vec![clause("click", ".a")])]
    #[case("", vec![])]
    fn parses_event_patterns(#[case] spec: &str, #[case] expected: Vec<EventClause>) {
        assert_eq!(parse_event_spec(spec), expected);
    }
}
