use dom_snapshot::{Document, NodeId};
use tracing::debug;

use crate::ignore::IgnoreSet;
use crate::renderer::OverlayRenderer;

/// What an [`OverlaySession::update`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayUpdate {
    /// Nothing repainted: same element, nothing to clear, or an ignored node
    Unchanged,
    /// A new element is highlighted
    Highlighted(NodeId),
    /// The previous highlight was removed
    Cleared,
}

/// Tracks the highlighted element for one overlay.
///
/// Feeding the same element twice in a row is a no-op, so callers can
/// pass every resolution result through `update` without checking.
pub struct OverlaySession<R: OverlayRenderer> {
    renderer: R,
    ignore: IgnoreSet,
    current: Option<NodeId>,
}

impl<R: OverlayRenderer> OverlaySession<R> {
    pub fn new(renderer: R) -> Self {
        Self::with_ignore(renderer, IgnoreSet::new())
    }

    pub fn with_ignore(renderer: R, ignore: IgnoreSet) -> Self {
        Self {
            renderer,
            ignore,
            current: None,
        }
    }

    /// Highlight `target`, or clear the overlay when `target` is `None`.
    pub fn update(&mut self, doc: &Document, target: Option<NodeId>) -> OverlayUpdate {
        let Some(node) = target else {
            return self.clear();
        };

        if self.current == Some(node) {
            return OverlayUpdate::Unchanged;
        }
        if !doc.is_element(node) {
            debug!(node = %node, "refusing to highlight a non-element node");
            return OverlayUpdate::Unchanged;
        }
        if self.ignore.is_ignored(doc, node) {
            debug!(node = %node, "refusing to highlight an ignored node");
            return OverlayUpdate::Unchanged;
        }

        if self.current.is_some() {
            self.renderer.clear();
        }
        self.renderer.highlight(doc, node);
        self.current = Some(node);
        OverlayUpdate::Highlighted(node)
    }

    /// Currently highlighted element
    pub fn current(&self) -> Option<NodeId> {
        self.current
    }

    /// Drop the highlight, e.g. when the window loses focus.
    pub fn reset(&mut self) {
        self.clear();
    }

    pub fn ignore(&self) -> &IgnoreSet {
        &self.ignore
    }

    pub fn ignore_mut(&mut self) -> &mut IgnoreSet {
        &mut self.ignore
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }

    fn clear(&mut self) -> OverlayUpdate {
        if self.current.take().is_none() {
            return OverlayUpdate::Unchanged;
        }
        self.renderer.clear();
        OverlayUpdate::Cleared
    }
}
