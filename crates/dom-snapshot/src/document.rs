//! Arena document and borrowed element views

use crate::errors::{DomError, SelectorError};
use crate::model::{ElementData, Node, NodeId, NodeKind};
use crate::selector::SelectorList;

/// In-memory document tree.
///
/// Node 0 is always the Document node. Elements created without a parent, or
/// removed with [`Document::detach`], stay in the arena but are no longer
/// connected, so queries and id lookups skip them.
#[derive(Clone, Debug)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Document,
            }],
            root: NodeId(0),
        }
    }

    /// The Document node (not an element).
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Create an element, appended to `parent` when one is given.
    pub fn create_element<I, K, V>(
        &mut self,
        parent: Option<NodeId>,
        tag_name: &str,
        attributes: I,
    ) -> Result<NodeId, DomError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        if let Some(parent) = parent {
            self.ensure_container(parent)?;
        }
        let mut data = ElementData::new(tag_name);
        for (key, value) in attributes {
            // first occurrence wins, as in HTML
            if data.attribute(key.as_ref()).is_none() {
                data.set_attribute(key.as_ref(), value.into());
            }
        }
        Ok(self.push_node(parent, NodeKind::Element(data)))
    }

    pub fn append_text(
        &mut self,
        parent: NodeId,
        text: impl Into<String>,
    ) -> Result<NodeId, DomError> {
        self.ensure_container(parent)?;
        Ok(self.push_node(Some(parent), NodeKind::Text(text.into())))
    }

    /// Move `child` (with its subtree) to the end of `parent`'s children.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.ensure_container(parent)?;
        self.node(child).ok_or(DomError::InvalidNode(child))?;
        if child == self.root {
            return Err(DomError::HierarchyRequest(
                "the document node cannot be re-parented".into(),
            ));
        }
        if child == parent || self.is_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest(format!(
                "{child} is an ancestor of {parent}"
            )));
        }
        self.detach(child)?;
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        Ok(())
    }

    /// Remove a node from its parent. The subtree stays intact.
    pub fn detach(&mut self, node: NodeId) -> Result<(), DomError> {
        let parent = self.node(node).ok_or(DomError::InvalidNode(node))?.parent;
        if let Some(parent) = parent {
            self.nodes[parent.0].children.retain(|child| *child != node);
            self.nodes[node.0].parent = None;
        }
        Ok(())
    }

    pub fn set_attribute(
        &mut self,
        node: NodeId,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), DomError> {
        match self.nodes.get_mut(node.0).map(|n| &mut n.kind) {
            Some(NodeKind::Element(data)) => {
                data.set_attribute(name, value.into());
                Ok(())
            }
            _ => Err(DomError::InvalidNode(node)),
        }
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<(), DomError> {
        match self.nodes.get_mut(node.0).map(|n| &mut n.kind) {
            Some(NodeKind::Element(data)) => {
                data.remove_attribute(name);
                Ok(())
            }
            _ => Err(DomError::InvalidNode(node)),
        }
    }

    /// Replace all children of `node` with a single text node.
    pub fn set_text_content(
        &mut self,
        node: NodeId,
        text: impl Into<String>,
    ) -> Result<(), DomError> {
        self.ensure_container(node)?;
        let children = std::mem::take(&mut self.nodes[node.0].children);
        for child in children {
            self.nodes[child.0].parent = None;
        }
        let text = text.into();
        if !text.is_empty() {
            self.push_node(Some(node), NodeKind::Text(text));
        }
        Ok(())
    }

    pub fn element(&self, node: NodeId) -> Option<ElementRef<'_>> {
        match &self.node(node)?.kind {
            NodeKind::Element(data) => Some(ElementRef {
                doc: self,
                node,
                data,
            }),
            _ => None,
        }
    }

    pub fn is_element(&self, node: NodeId) -> bool {
        self.element(node).is_some()
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node)?.parent
    }

    /// Whether the node hangs off the Document node.
    pub fn is_connected(&self, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == self.root {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// First element child of the Document node (`<html>` for full pages).
    pub fn document_element(&self) -> Option<NodeId> {
        self.nodes[self.root.0]
            .children
            .iter()
            .copied()
            .find(|child| self.is_element(*child))
    }

    /// First connected `<body>` element in document order.
    pub fn body(&self) -> Option<NodeId> {
        self.elements()
            .into_iter()
            .find(|node| self.element(*node).is_some_and(|el| el.tag_name() == "body"))
    }

    /// All connected elements in document (pre-)order.
    pub fn elements(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[self.root.0].children.iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            let node = &self.nodes[current.0];
            if matches!(node.kind, NodeKind::Element(_)) {
                out.push(current);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// First connected element whose `id` attribute equals `id`.
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        if id.is_empty() {
            return None;
        }
        self.elements()
            .into_iter()
            .find(|node| self.element(*node).and_then(|el| el.id()) == Some(id))
    }

    /// Connected elements matching `selector`, in document order.
    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>, SelectorError> {
        let parsed = SelectorList::parse(selector)?;
        Ok(self
            .elements()
            .into_iter()
            .filter(|node| parsed.matches(self, *node))
            .collect())
    }

    pub fn query_selector(&self, selector: &str) -> Result<Option<NodeId>, SelectorError> {
        let parsed = SelectorList::parse(selector)?;
        Ok(self
            .elements()
            .into_iter()
            .find(|node| parsed.matches(self, *node)))
    }

    /// Lazily walk connected elements matching an already parsed selector.
    pub fn select<'a>(&'a self, selector: &'a SelectorList) -> impl Iterator<Item = NodeId> + 'a {
        self.elements()
            .into_iter()
            .filter(move |node| selector.matches(self, *node))
    }

    /// Whether `node` itself matches `selector`. Non-elements never match.
    pub fn matches(&self, node: NodeId, selector: &str) -> Result<bool, SelectorError> {
        let parsed = SelectorList::parse(selector)?;
        Ok(self.is_element(node) && parsed.matches(self, node))
    }

    pub(crate) fn node(&self, node: NodeId) -> Option<&Node> {
        self.nodes.get(node.0)
    }

    pub(crate) fn element_data(&self, node: NodeId) -> Option<&ElementData> {
        match &self.node(node)?.kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    /// Element siblings of `node` (including itself), in order.
    pub(crate) fn element_siblings(&self, node: NodeId) -> Vec<NodeId> {
        let Some(parent) = self.parent(node) else {
            return vec![node];
        };
        self.nodes[parent.0]
            .children
            .iter()
            .copied()
            .filter(|child| self.is_element(*child))
            .collect()
    }

    pub(crate) fn previous_element_sibling(&self, node: NodeId) -> Option<NodeId> {
        let siblings = self.element_siblings(node);
        let pos = siblings.iter().position(|sibling| *sibling == node)?;
        pos.checked_sub(1).map(|prev| siblings[prev])
    }

    fn push_node(&mut self, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            kind,
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        id
    }

    fn ensure_container(&self, node: NodeId) -> Result<(), DomError> {
        match self.node(node).map(|n| &n.kind) {
            Some(NodeKind::Document | NodeKind::Element(_)) => Ok(()),
            _ => Err(DomError::InvalidNode(node)),
        }
    }

    fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = self.parent(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }
}

/// Borrowed view of an element node.
#[derive(Clone, Copy, Debug)]
pub struct ElementRef<'a> {
    doc: &'a Document,
    node: NodeId,
    data: &'a ElementData,
}

impl<'a> ElementRef<'a> {
    pub fn node_id(&self) -> NodeId {
        self.node
    }

    pub fn document(&self) -> &'a Document {
        self.doc
    }

    /// Lower-case tag name
    pub fn tag_name(&self) -> &'a str {
        &self.data.tag_name
    }

    /// The `id` attribute, when present and non-empty
    pub fn id(&self) -> Option<&'a str> {
        self.attribute("id").filter(|id| !id.is_empty())
    }

    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.data.attribute(name)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.data.attribute(name).is_some()
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.data
            .attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Class tokens in source order, without duplicates.
    pub fn class_list(&self) -> Vec<&'a str> {
        let mut classes: Vec<&'a str> = Vec::new();
        if let Some(raw) = self.attribute("class") {
            for token in raw.split_ascii_whitespace() {
                if !classes.contains(&token) {
                    classes.push(token);
                }
            }
        }
        classes
    }

    pub fn has_class(&self, class_name: &str) -> bool {
        self.data.has_class(class_name)
    }

    /// Concatenated text of every descendant text node.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        let mut stack = vec![self.node];
        while let Some(current) = stack.pop() {
            let Some(node) = self.doc.node(current) else {
                continue;
            };
            if let NodeKind::Text(text) = &node.kind {
                out.push_str(text);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Parent, if it is an element. The Document node does not count.
    pub fn parent_element(&self) -> Option<ElementRef<'a>> {
        self.doc.parent(self.node).and_then(|p| self.doc.element(p))
    }

    pub fn element_children(&self) -> Vec<ElementRef<'a>> {
        self.doc
            .node(self.node)
            .map(|node| {
                node.children
                    .iter()
                    .filter_map(|child| self.doc.element(*child))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// 1-based position among the parent's element children.
    pub fn child_index(&self) -> Option<usize> {
        self.doc.parent(self.node)?;
        self.doc
            .element_siblings(self.node)
            .iter()
            .position(|sibling| *sibling == self.node)
            .map(|pos| pos + 1)
    }

    pub fn is_connected(&self) -> bool {
        self.doc.is_connected(self.node)
    }
}

impl PartialEq for ElementRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.node == other.node
    }
}

impl Eq for ElementRef<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let html = doc.create_element(Some(doc.root()), "HTML", Vec::<(&str, &str)>::new()).unwrap();
        let body = doc.create_element(Some(html), "body", Vec::<(&str, &str)>::new()).unwrap();
        let button = doc
            .create_element(
                Some(body),
                "Button",
                [("class", "btn  btn-primary btn"), ("id", "save")],
            )
            .unwrap();
        doc.append_text(button, "  Save  ").unwrap();
        (doc, html, body, button)
    }

    #[test]
    fn test_element_accessors() {
        let (doc, _, body, button) = sample();
        let el = doc.element(button).unwrap();
        assert_eq!(el.tag_name(), "button");
        assert_eq!(el.id(), Some("save"));
        assert_eq!(el.class_list(), vec!["btn", "btn-primary"]);
        assert!(el.has_class("btn-primary"));
        assert!(!el.has_class("btn-secondary"));
        assert_eq!(el.text_content(), "  Save  ");
        assert_eq!(el.parent_element().unwrap().node_id(), body);
        assert_eq!(el.child_index(), Some(1));
    }

    #[test]
    fn test_document_element_has_no_parent_element() {
        let (doc, html, body, _) = sample();
        assert_eq!(doc.document_element(), Some(html));
        assert_eq!(doc.body(), Some(body));
        assert!(doc.element(html).unwrap().parent_element().is_none());
    }

    #[test]
    fn test_detach_disconnects_subtree() {
        let (mut doc, _, _, button) = sample();
        assert_eq!(doc.get_element_by_id("save"), Some(button));
        doc.detach(button).unwrap();
        assert!(!doc.is_connected(button));
        assert_eq!(doc.get_element_by_id("save"), None);
        assert!(doc.query_selector_all("button").unwrap().is_empty());
        // the detached element can still be inspected
        assert_eq!(doc.element(button).unwrap().tag_name(), "button");
    }

    #[test]
    fn test_append_child_rejects_cycles() {
        let (mut doc, html, body, _) = sample();
        let result = doc.append_child(body, html);
        assert!(matches!(result, Err(DomError::HierarchyRequest(_))));
    }

    #[test]
    fn test_append_child_moves_node() {
        let (mut doc, html, body, button) = sample();
        doc.append_child(html, button).unwrap();
        assert_eq!(doc.parent(button), Some(html));
        assert!(doc.element(body).unwrap().element_children().is_empty());
        assert_eq!(doc.element(button).unwrap().child_index(), Some(2));
    }

    #[test]
    fn test_invalid_node_handle() {
        let (mut doc, _, _, _) = sample();
        let bogus = NodeId(999);
        assert!(doc.element(bogus).is_none());
        assert_eq!(doc.detach(bogus), Err(DomError::InvalidNode(bogus)));
    }

    #[test]
    fn test_set_text_content_replaces_children() {
        let (mut doc, _, _, button) = sample();
        doc.set_text_content(button, "Saved").unwrap();
        assert_eq!(doc.element(button).unwrap().text_content(), "Saved");
    }

    #[test]
    fn test_select_with_parsed_selector() {
        let (doc, _, _, button) = sample();
        let selector = SelectorList::parse("body > .btn").unwrap();
        let mut hits = doc.select(&selector);
        assert_eq!(hits.next(), Some(button));
        assert_eq!(hits.next(), None);
    }
}
