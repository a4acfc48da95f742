//! Nodes the overlay must never target
//!
//! The overlay's own widgets (floating panels, labels) live in the same
//! document as the page. Marking their root here keeps hover and capture
//! from picking them up.

use std::collections::HashSet;

use dom_snapshot::{Document, NodeId};

#[derive(Debug, Clone, Default)]
pub struct IgnoreSet {
    marked: HashSet<NodeId>,
}

impl IgnoreSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `node` and, implicitly, its whole subtree. Returns `false` if it
    /// was already marked.
    pub fn mark(&mut self, node: NodeId) -> bool {
        self.marked.insert(node)
    }

    pub fn unmark(&mut self, node: NodeId) -> bool {
        self.marked.remove(&node)
    }

    /// Whether `node` itself was marked
    pub fn contains(&self, node: NodeId) -> bool {
        self.marked.contains(&node)
    }

    /// Whether `node` or one of its ancestors is marked.
    pub fn is_ignored(&self, doc: &Document, node: NodeId) -> bool {
        if self.marked.is_empty() {
            return false;
        }
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if self.marked.contains(&current) {
                return true;
            }
            cursor = doc.parent(current);
        }
        false
    }

    pub fn len(&self) -> usize {
        self.marked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marked.is_empty()
    }

    pub fn clear(&mut self) {
        self.marked.clear();
    }
}
