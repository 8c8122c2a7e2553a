//! Footprint verification, compiled in for tests and the `range-invariants` feature.

use crate::range::Range;
use core_types::HostTree;

/// Check that an attached range occupies a contiguous run of siblings under
/// its host parent, in member order.
pub(crate) fn verify_footprint<H: HostTree>(range: &Range<H>) {
    if !range.is_attached() {
        return;
    }
    if let Err(msg) = footprint_mismatch(range) {
        log::error!(target: "domrange.range", "footprint mismatch in {range:?}: {msg}");
        debug_assert!(false, "footprint mismatch: {msg}");
    }
}

fn footprint_mismatch<H: HostTree>(range: &Range<H>) -> Result<(), String> {
    let container = range.attached_parent().map_err(|err| err.to_string())?;
    let nodes = range.host_nodes().map_err(|err| err.to_string())?;
    let tree = range.tree();
    let mut expected = nodes.iter();
    let Some(first) = expected.next() else {
        return Err("attached range has an empty footprint".to_string());
    };
    if tree.parent(first).as_ref() != Some(&container) {
        return Err(format!("{first:?} is not a child of {container:?}"));
    }
    let mut current = first.clone();
    for node in expected {
        match tree.next_sibling(&current) {
            Some(next) if &next == node => current = next,
            other => return Err(format!("expected {node:?} after {current:?}, found {other:?}")),
        }
    }
    Ok(())
}
