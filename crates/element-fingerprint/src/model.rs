use indexmap::IndexMap;
use serde::Serialize;

/// Structural + content snapshot of one element.
///
/// Fields are private: a fingerprint is created once (by capture or by
/// decoding a stored string) and never edited in place. The `with_*`
/// methods return a new value and silently skip empty inputs, so every
/// optional field is either absent or non-empty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementFingerprint {
    tag_name: String,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    class_list: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    text_snippet: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    attributes: Option<IndexMap<String, String>>,

    #[serde(skip_serializing_if = "String::is_empty")]
    dom_path: String,
}

impl ElementFingerprint {
    /// Bare fingerprint for `tag_name` (lower-cased).
    pub fn new(tag_name: &str) -> Self {
        Self {
            tag_name: tag_name.trim().to_ascii_lowercase(),
            class_list: Vec::new(),
            id: None,
            text_snippet: None,
            attributes: None,
            dom_path: String::new(),
        }
    }

    pub fn with_classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for class in classes {
            let class = class.into();
            if !class.is_empty() && !self.class_list.contains(&class) {
                self.class_list.push(class);
            }
        }
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        self.id = (!id.is_empty()).then_some(id);
        self
    }

    pub fn with_text_snippet(mut self, snippet: impl Into<String>) -> Self {
        let snippet = snippet.into();
        self.text_snippet = (!snippet.is_empty()).then_some(snippet);
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes
            .get_or_insert_with(IndexMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_dom_path(mut self, dom_path: impl Into<String>) -> Self {
        self.dom_path = dom_path.into();
        self
    }

    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    /// Captured class tokens; empty when the element had none.
    pub fn class_list(&self) -> &[String] {
        &self.class_list
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn text_snippet(&self) -> Option<&str> {
        self.text_snippet.as_deref()
    }

    /// Allow-listed attributes in capture order.
    pub fn attributes(&self) -> Option<&IndexMap<String, String>> {
        self.attributes.as_ref()
    }

    /// Structural path, empty when the element had no parent element.
    pub fn dom_path(&self) -> &str {
        &self.dom_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_methods_skip_empty_values() {
        let fp = ElementFingerprint::new(" BUTTON ")
            .with_classes(["btn", "", "btn"])
            .with_id("")
            .with_text_snippet("");
        assert_eq!(fp.tag_name(), "button");
        assert_eq!(fp.class_list(), ["btn".to_string()]);
        assert!(fp.id().is_none());
        assert!(fp.text_snippet().is_none());
        assert!(fp.attributes().is_none());
        assert_eq!(fp.dom_path(), "");
    }

    #[test]
    fn test_serialization_omits_absent_fields() {
        let fp = ElementFingerprint::new("button")
            .with_classes(["btn", "btn-primary"])
            .with_text_snippet("Submit");
        let json = serde_json::to_string(&fp).unwrap();
        assert_eq!(
            json,
            r#"{"tagName":"button","classList":["btn","btn-primary"],"textSnippet":"Submit"}"#
        );
    }

    #[test]
    fn test_attribute_order_is_preserved() {
        let fp = ElementFingerprint::new("input")
            .with_attribute("type", "email")
            .with_attribute("name", "login")
            .with_attribute("data-cy", "email-field");
        let keys: Vec<_> = fp.attributes().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["type", "name", "data-cy"]);
    }
}
