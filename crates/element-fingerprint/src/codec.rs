//! Stored-string codec
//!
//! Stored fingerprints come back from persistence as untrusted JSON. The
//! wire struct accepts every field as optional (including explicit nulls)
//! and the result is normalized before it becomes an [`ElementFingerprint`].

use std::str::FromStr;

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::warn;

use crate::builder::{is_stable_attribute, TEXT_SNIPPET_MAX_CHARS};
use crate::errors::FingerprintError;
use crate::model::ElementFingerprint;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireFingerprint {
    tag_name: Option<String>,
    class_list: Option<Vec<Option<String>>>,
    id: Option<String>,
    #[serde(alias = "textContent")]
    text_snippet: Option<String>,
    attributes: Option<IndexMap<String, Option<String>>>,
    dom_path: Option<String>,
}

impl WireFingerprint {
    fn normalize(self) -> Result<ElementFingerprint, FingerprintError> {
        let tag_name = self.tag_name.unwrap_or_default();
        if tag_name.trim().is_empty() {
            return Err(FingerprintError::Invalid("tagName is missing or empty".into()));
        }

        let mut fingerprint = ElementFingerprint::new(&tag_name)
            .with_classes(self.class_list.into_iter().flatten().flatten());

        if let Some(id) = self.id {
            fingerprint = fingerprint.with_id(id);
        }
        // not re-trimmed: a truncated capture may legitimately end in whitespace
        if let Some(snippet) = self.text_snippet.filter(|s| !s.trim().is_empty()) {
            let snippet: String = snippet.chars().take(TEXT_SNIPPET_MAX_CHARS).collect();
            fingerprint = fingerprint.with_text_snippet(snippet);
        }
        for (key, value) in self.attributes.into_iter().flatten() {
            let Some(value) = value else {
                continue;
            };
            if !is_stable_attribute(&key) {
                warn!(attribute = %key, "dropping attribute outside the stable allow-list");
                continue;
            }
            fingerprint = fingerprint.with_attribute(key, value);
        }
        if let Some(path) = self.dom_path {
            fingerprint = fingerprint.with_dom_path(path.trim());
        }

        Ok(fingerprint)
    }
}

impl ElementFingerprint {
    /// Decode a stored fingerprint string.
    pub fn from_json(payload: &str) -> Result<Self, FingerprintError> {
        let wire: WireFingerprint = serde_json::from_str(payload)
            .map_err(|e| FingerprintError::Parse(e.to_string()))?;
        wire.normalize()
    }

    /// Serialize for storage.
    pub fn to_json(&self) -> String {
        // Strings, a string list and a string map: nothing here can fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl FromStr for ElementFingerprint {
    type Err = FingerprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_json(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_full_payload() {
        let fp = ElementFingerprint::from_json(
            r#"{
                "tagName": "BUTTON",
                "classList": ["btn", "btn-primary", "btn"],
                "id": "save",
                "textSnippet": "Save",
                "attributes": {"type": "submit", "data-testid": "save-btn"},
                "domPath": "form:nth-child(1) > button:nth-child(3)"
            }"#,
        )
        .unwrap();
        assert_eq!(fp.tag_name(), "button");
        assert_eq!(fp.class_list().len(), 2);
        assert_eq!(fp.id(), Some("save"));
        assert_eq!(fp.text_snippet(), Some("Save"));
        assert_eq!(fp.attributes().unwrap().len(), 2);
        assert_eq!(fp.dom_path(), "form:nth-child(1) > button:nth-child(3)");
    }

    #[test]
    fn test_legacy_text_content_key() {
        let fp = ElementFingerprint::from_json(r#"{"tagName":"a","textContent":"Docs"}"#).unwrap();
        assert_eq!(fp.text_snippet(), Some("Docs"));
    }

    #[test]
    fn test_empty_and_null_fields_are_dropped() {
        let fp = ElementFingerprint::from_json(
            r#"{"tagName":"div","classList":["", null],"id":"","textSnippet":"   ","attributes":{},"domPath":null}"#,
        )
        .unwrap();
        assert!(fp.class_list().is_empty());
        assert!(fp.id().is_none());
        assert!(fp.text_snippet().is_none());
        assert!(fp.attributes().is_none());
        assert_eq!(fp.dom_path(), "");
        assert_eq!(fp.to_json(), r#"{"tagName":"div"}"#);
    }

    #[test]
    fn test_unknown_attribute_keys_are_dropped() {
        let fp = ElementFingerprint::from_json(
            r#"{"tagName":"div","attributes":{"onclick":"steal()","role":"dialog"}}"#,
        )
        .unwrap();
        let attrs = fp.attributes().unwrap();
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs.get("role").map(String::as_str), Some("dialog"));
    }

    #[test]
    fn test_overlong_snippet_is_truncated() {
        let payload = format!(r#"{{"tagName":"p","textSnippet":"{}"}}"#, "x".repeat(120));
        let fp = ElementFingerprint::from_json(&payload).unwrap();
        assert_eq!(fp.text_snippet().unwrap().len(), 50);
    }

    #[test]
    fn test_missing_tag_is_invalid() {
        let err = ElementFingerprint::from_json(r#"{"id":"x"}"#).unwrap_err();
        assert!(matches!(err, FingerprintError::Invalid(_)));
        let err = ElementFingerprint::from_json(r#"{"tagName":"  "}"#).unwrap_err();
        assert!(matches!(err, FingerprintError::Invalid(_)));
    }

    #[test]
    fn test_malformed_payloads_are_parse_errors() {
        for payload in ["", "not json", "[1,2]", r#"{"tagName":5}"#, r#"{"classList":"btn"}"#] {
            let err = ElementFingerprint::from_json(payload).unwrap_err();
            assert!(
                matches!(err, FingerprintError::Parse(_)),
                "payload {payload:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_from_str_matches_from_json() {
        let fp: ElementFingerprint = r#"{"tagName":"span","id":"x"}"#.parse().unwrap();
        assert_eq!(fp.to_json(), r#"{"tagName":"span","id":"x"}"#);
    }
}
