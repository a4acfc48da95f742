//! Candidate validation
//!
//! Tiers 1-4 only accept a candidate that is still consistent with the
//! captured fingerprint. Classes are a subset check (markup grows state
//! classes) and text is a containment check (captures are truncated).

use dom_snapshot::ElementRef;
use element_fingerprint::ElementFingerprint;

/// Whether `element` is consistent with `fingerprint`.
pub fn validate(element: &ElementRef<'_>, fingerprint: &ElementFingerprint) -> bool {
    if element.tag_name() != fingerprint.tag_name() {
        return false;
    }

    if let Some(id) = fingerprint.id() {
        if element.id() != Some(id) {
            return false;
        }
    }

    if !fingerprint
        .class_list()
        .iter()
        .all(|class| element.has_class(class))
    {
        return false;
    }

    if let Some(attributes) = fingerprint.attributes() {
        let all_equal = attributes
            .iter()
            .all(|(key, value)| element.attribute(key) == Some(value.as_str()));
        if !all_equal {
            return false;
        }
    }

    if let Some(snippet) = fingerprint.text_snippet() {
        if !element.text_content().trim().contains(snippet) {
            return false;
        }
    }

    true
}
