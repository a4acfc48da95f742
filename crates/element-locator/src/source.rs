//! Source-location lookups
//!
//! Dev builds stamp elements with `data-__source-code-location`
//! (`file:line:column`). Review records store that location, so it is the
//! first handle on an element before any fingerprint exists.

use dom_snapshot::{Document, NodeId};

pub const SOURCE_LOCATION_ATTRIBUTE: &str = "data-__source-code-location";

/// Source location stamped on `node`, if any (empty values do not count).
pub fn source_location(doc: &Document, node: NodeId) -> Option<&str> {
    doc.element(node)?
        .attribute(SOURCE_LOCATION_ATTRIBUTE)
        .filter(|location| !location.is_empty())
}

/// First connected element stamped with exactly `location`.
pub fn find_by_source_location(doc: &Document, location: &str) -> Option<NodeId> {
    if location.is_empty() {
        return None;
    }
    doc.elements()
        .into_iter()
        .find(|node| source_location(doc, *node) == Some(location))
}

/// `node` itself or its closest stamped ancestor.
pub fn nearest_source_located(doc: &Document, node: NodeId) -> Option<NodeId> {
    let mut current = doc.element(node);
    while let Some(el) = current {
        if source_location(doc, el.node_id()).is_some() {
            return Some(el.node_id());
        }
        current = el.parent_element();
    }
    None
}

/// The nearest stamped element and every stamped ancestor above it,
/// innermost first.
pub fn source_located_chain(doc: &Document, node: NodeId) -> Vec<NodeId> {
    let mut chain = Vec::new();
    let mut next = nearest_source_located(doc, node);
    while let Some(found) = next {
        chain.push(found);
        next = doc
            .element(found)
            .and_then(|el| el.parent_element())
            .and_then(|parent| nearest_source_located(doc, parent.node_id()));
    }
    chain
}
