use dom_snapshot::{Document, NodeId};
use tracing::info;

/// Paints and removes highlight decorations.
pub trait OverlayRenderer {
    /// Draw the highlight for `node`, replacing any previous one.
    fn highlight(&mut self, doc: &Document, node: NodeId);

    /// Remove every decoration.
    fn clear(&mut self);
}

/// Renderer for headless use: reports highlights through `tracing`.
#[derive(Debug, Default)]
pub struct TracingRenderer {
    painted: usize,
}

impl TracingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of highlights drawn so far
    pub fn painted(&self) -> usize {
        self.painted
    }
}

impl OverlayRenderer for TracingRenderer {
    fn highlight(&mut self, doc: &Document, node: NodeId) {
        self.painted += 1;
        match doc.element(node) {
            Some(el) => info!(
                node = %node,
                tag = el.tag_name(),
                id = el.id().unwrap_or_default(),
                "highlight element"
            ),
            None => info!(node = %node, "highlight non-element node"),
        }
    }

    fn clear(&mut self) {
        info!("clear highlight");
    }
}
