use crate::syntax::{Combinator, ComplexSelector, Compound, Selector, SelectorList};

/// Read-only view of an element, as needed for selector matching.
pub trait Element: Sized {
    fn local_name(&self) -> &str;
    fn attribute(&self, name: &str) -> Option<&str>;
    /// Parent element, or `None` at the top of the tree or under a non-element parent.
    fn parent_element(&self) -> Option<Self>;
}

impl SelectorList {
    pub fn matches<E: Element>(&self, element: &E) -> bool {
        self.selectors.iter().any(|s| s.matches(element))
    }
}

impl ComplexSelector {
    pub fn matches<E: Element>(&self, element: &E) -> bool {
        self.subject.matches(element) && matches_ancestors(&self.ancestors, element)
    }
}

impl Compound {
    pub fn matches<E: Element>(&self, element: &E) -> bool {
        self.parts.iter().all(|part| matches_simple(element, part))
    }
}

// Walk outward from `element`, matching the next compound for each combinator.
fn matches_ancestors<E: Element>(rest: &[(Combinator, Compound)], element: &E) -> bool {
    let Some(((combinator, compound), tail)) = rest.split_first() else {
        return true;
    };
    match combinator {
        Combinator::Child => element
            .parent_element()
            .is_some_and(|parent| compound.matches(&parent) && matches_ancestors(tail, &parent)),
        Combinator::Descendant => {
            let mut current = element.parent_element();
            while let Some(ancestor) = current {
                if compound.matches(&ancestor) && matches_ancestors(tail, &ancestor) {
                    return true;
                }
                current = ancestor.parent_element();
            }
            false
        }
    }
}

// Check if an element matches a simple selector
fn matches_simple<E: Element>(element: &E, selector: &Selector) -> bool {
    match selector {
        Selector::Universal => true,
        Selector::Type(t) => element.local_name().eq_ignore_ascii_case(t),
        Selector::Id(want) => element.attribute("id").is_some_and(|v| v == want),
        Selector::Class(want) => element
            .attribute("class")
            .is_some_and(|classlist| classlist.split_whitespace().any(|c| c == want)),
        Selector::Attribute { name, value } => match (element.attribute(name), value) {
            (Some(actual), Some(want)) => actual == want,
            (Some(_), None) => true,
            (None, _) => false,
        },
    }
}
