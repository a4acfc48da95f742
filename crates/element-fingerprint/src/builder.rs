//! Fingerprint capture
//!
//! Reads everything a later resolution attempt may need from one element:
//! tag, classes, id, a short text sample, the stable attributes and the
//! structural path. Capture never fails for an element and never touches
//! the document.

use dom_snapshot::{Document, NodeId};
use tracing::debug;

use crate::model::ElementFingerprint;
use crate::path::capture_path;

/// Attributes worth keeping: test hooks and semantic markers that survive
/// re-renders far better than generated class names.
pub const STABLE_ATTRIBUTES: [&str; 7] = [
    "data-testid",
    "data-cy",
    "data-qa",
    "data-test",
    "role",
    "type",
    "name",
];

pub const TEXT_SNIPPET_MAX_CHARS: usize = 50;

/// Trimmed text cut to [`TEXT_SNIPPET_MAX_CHARS`] characters, or `None`
/// when nothing visible is left.
pub fn text_snippet(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(TEXT_SNIPPET_MAX_CHARS).collect())
}

pub(crate) fn is_stable_attribute(name: &str) -> bool {
    STABLE_ATTRIBUTES.contains(&name)
}

/// Snapshot the element behind `node`.
///
/// Returns `None` only when `node` is not an element (text node, the
/// document node, or an id from another document).
pub fn capture(doc: &Document, node: NodeId) -> Option<ElementFingerprint> {
    let element = doc.element(node)?;

    let mut fingerprint = ElementFingerprint::new(element.tag_name())
        .with_classes(element.class_list());

    if let Some(id) = element.id() {
        fingerprint = fingerprint.with_id(id);
    }
    if let Some(snippet) = text_snippet(&element.text_content()) {
        fingerprint = fingerprint.with_text_snippet(snippet);
    }
    for key in STABLE_ATTRIBUTES {
        if let Some(value) = element.attribute(key) {
            fingerprint = fingerprint.with_attribute(key, value);
        }
    }

    let fingerprint = fingerprint.with_dom_path(capture_path(doc, node));
    debug!(
        node = %node,
        tag = fingerprint.tag_name(),
        path = fingerprint.dom_path(),
        "captured element fingerprint"
    );
    Some(fingerprint)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Document {
        Document::parse_html(
            r#"<html><body>
                <form>
                  <input id="email" class="field field--wide" type="email" name="login" data-cy="email" placeholder="you@x">
                  <button class="btn btn-primary" type="submit" data-testid="save">  Save changes  </button>
                </form>
              </body></html>"#,
        )
        .unwrap()
    }

    #[test]
    fn test_capture_reads_every_field() {
        let doc = page();
        let input = doc.get_element_by_id("email").unwrap();
        let fp = capture(&doc, input).unwrap();

        assert_eq!(fp.tag_name(), "input");
        assert_eq!(fp.id(), Some("email"));
        assert_eq!(fp.class_list(), ["field".to_string(), "field--wide".to_string()]);
        assert!(fp.text_snippet().is_none());
        assert_eq!(fp.dom_path(), "form:nth-child(1) > input:nth-child(1)");

        let attrs = fp.attributes().unwrap();
        let keys: Vec<_> = attrs.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["data-cy", "type", "name"]);
        assert!(!attrs.contains_key("placeholder"));
    }

    #[test]
    fn test_capture_trims_text() {
        let doc = page();
        let button = doc.query_selector("button").unwrap().unwrap();
        let fp = capture(&doc, button).unwrap();
        assert_eq!(fp.text_snippet(), Some("Save changes"));
        assert!(fp.id().is_none());
    }

    #[test]
    fn test_text_snippet_truncates_by_character() {
        let long = "é".repeat(80);
        let snippet = text_snippet(&long).unwrap();
        assert_eq!(snippet.chars().count(), TEXT_SNIPPET_MAX_CHARS);
        assert!(text_snippet(" \n\t ").is_none());
        assert_eq!(text_snippet("  ok "), Some("ok".to_string()));
    }

    #[test]
    fn test_capture_non_element_is_none() {
        let mut doc = Document::new();
        let div = doc
            .create_element(Some(doc.root()), "div", Vec::<(&str, &str)>::new())
            .unwrap();
        let text = doc.append_text(div, "hello").unwrap();
        assert!(capture(&doc, text).is_none());
        assert!(capture(&doc, doc.root()).is_none());
    }

    #[test]
    fn test_capture_orphan_has_empty_path() {
        let mut doc = Document::new();
        let orphan = doc
            .create_element(None, "section", [("class", "panel")])
            .unwrap();
        let fp = capture(&doc, orphan).unwrap();
        assert_eq!(fp.dom_path(), "");
        assert_eq!(fp.class_list(), ["panel".to_string()]);
    }

    #[test]
    fn test_empty_attribute_value_is_kept() {
        let doc = Document::parse_html(r#"<body><div role>x</div></body>"#).unwrap();
        let div = doc.query_selector("div").unwrap().unwrap();
        let fp = capture(&doc, div).unwrap();
        assert_eq!(fp.attributes().unwrap().get("role").map(String::as_str), Some(""));
    }
}
