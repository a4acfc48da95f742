//! Match scoring for the fallback tier
//!
//! Scores are relative plausibility, not probabilities. Only the ordering
//! between candidates of one resolution attempt is meaningful.

use dom_snapshot::ElementRef;
use element_fingerprint::ElementFingerprint;

pub const TAG_WEIGHT: i64 = 10;
pub const ID_WEIGHT: i64 = 50;
/// Per fingerprint class present on the candidate
pub const CLASS_WEIGHT: i64 = 5;
/// Per stable attribute with the captured value
pub const ATTRIBUTE_WEIGHT: i64 = 10;
pub const TEXT_WEIGHT: i64 = 15;

pub fn score(element: &ElementRef<'_>, fingerprint: &ElementFingerprint) -> i64 {
    let mut score = 0;

    if element.tag_name() == fingerprint.tag_name() {
        score += TAG_WEIGHT;
    }

    if let Some(id) = fingerprint.id() {
        if element.id() == Some(id) {
            score += ID_WEIGHT;
        }
    }

    let classes = fingerprint
        .class_list()
        .iter()
        .filter(|class| element.has_class(class))
        .count() as i64;
    score += classes * CLASS_WEIGHT;

    if let Some(attributes) = fingerprint.attributes() {
        let matching = attributes
            .iter()
            .filter(|(key, value)| element.attribute(key) == Some(value.as_str()))
            .count() as i64;
        score += matching * ATTRIBUTE_WEIGHT;
    }

    if let Some(snippet) = fingerprint.text_snippet() {
        if element.text_content().trim().contains(snippet) {
            score += TEXT_WEIGHT;
        }
    }

    score
}
