//! Structural path computation
//!
//! A path is the chain of `tag:nth-child(i)` segments from just below the
//! root down to the element, joined with `" > "`. The index counts every
//! element child of the parent, not only same-tag siblings, so two siblings
//! never share a path. The resulting string is itself a valid selector.

use dom_snapshot::{Document, NodeId};

pub const PATH_SEPARATOR: &str = " > ";

/// Path from `element` up to (excluding) `root`.
///
/// The walk also stops at the first node without a parent element, so an
/// element outside `root` yields the path up to its topmost ancestor.
pub fn compute_path(doc: &Document, element: NodeId, root: NodeId) -> String {
    compute_path_until(doc, element, |node| node == root)
}

/// Path relative to the page: stops at `<body>` or the document element,
/// whichever the walk reaches first.
pub fn capture_path(doc: &Document, element: NodeId) -> String {
    let body = doc.body();
    let document_element = doc.document_element();
    compute_path_until(doc, element, |node| {
        Some(node) == body || Some(node) == document_element
    })
}

fn compute_path_until(
    doc: &Document,
    element: NodeId,
    is_root: impl Fn(NodeId) -> bool,
) -> String {
    let mut segments = Vec::new();
    let mut current = doc.element(element);

    while let Some(el) = current {
        if is_root(el.node_id()) {
            break;
        }
        let Some(parent) = el.parent_element() else {
            break;
        };
        let index = el.child_index().unwrap_or(1);
        segments.push(format!("{}:nth-child({})", el.tag_name(), index));
        current = Some(parent);
    }

    segments.reverse();
    segments.join(PATH_SEPARATOR)
}
