use crate::range::Range;
use core_types::HostTree;

/// Observer of a range's attach/detach lifecycle.
///
/// Hooks run after the host tree has been updated, in registration order.
/// Relocations (`Range::move_to`, `Range::move_member`) never fire them.
/// Both hooks default to doing nothing.
pub trait Augmenter<H: HostTree> {
    fn attach(&mut self, _range: &Range<H>, _container: &H::Node) {}

    /// `container` is the node the range was attached under before detaching.
    fn detach(&mut self, _range: &Range<H>, _container: &H::Node) {}
}
