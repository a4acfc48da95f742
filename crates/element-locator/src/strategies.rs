//! Matching tiers
//!
//! Five tiers in default cascade order:
//! 1. Id - `id` lookup
//! 2. Attribute - one `tag[key="value"]` selector per stable attribute
//! 3. ClassCombination - `tag` plus every captured class
//! 4. Path - the captured structural path
//! 5. Fallback - loose selector, ranked with the scorer
//!
//! Tiers 1-4 return the first candidate in document order that validates
//! and stop scanning there. The fallback tier looks at every candidate.

use dom_snapshot::{Document, NodeId, SelectorList};
use element_fingerprint::ElementFingerprint;
use tracing::debug;

use crate::{errors::LocatorError, scorer::score, types::*, validate::validate};

/// One step of the resolution cascade.
pub trait MatchTier: Send + Sync {
    /// Attempt to locate the fingerprinted element with this tier.
    ///
    /// `Ok(None)` means the tier had nothing to work with or found no
    /// acceptable candidate.
    fn try_match(
        &self,
        fingerprint: &ElementFingerprint,
        doc: &Document,
    ) -> Result<Option<NodeId>, LocatorError>;

    /// Get tier type
    fn tier(&self) -> LocatorTier;

    /// Like [`MatchTier::try_match`], keeping tier details.
    fn try_resolve(
        &self,
        fingerprint: &ElementFingerprint,
        doc: &Document,
    ) -> Result<Option<Resolution>, LocatorError> {
        Ok(self
            .try_match(fingerprint, doc)?
            .map(|node| Resolution::new(node, self.tier())))
    }

    /// Get tier name
    fn name(&self) -> &'static str {
        self.tier().name()
    }
}

/// Build the tier implementation for `tier`.
pub fn tier_for(tier: LocatorTier) -> Box<dyn MatchTier> {
    match tier {
        LocatorTier::Id => Box::new(IdTier),
        LocatorTier::Attribute => Box::new(AttributeTier),
        LocatorTier::ClassCombination => Box::new(ClassCombinationTier),
        LocatorTier::Path => Box::new(PathTier),
        LocatorTier::Fallback => Box::new(FallbackTier),
    }
}

/// Id lookup
pub struct IdTier;

impl MatchTier for IdTier {
    fn try_match(
        &self,
        fingerprint: &ElementFingerprint,
        doc: &Document,
    ) -> Result<Option<NodeId>, LocatorError> {
        let Some(id) = fingerprint.id() else {
            return Ok(None);
        };
        Ok(doc
            .get_element_by_id(id)
            .and_then(|node| doc.element(node))
            .filter(|el| validate(el, fingerprint))
            .map(|el| el.node_id()))
    }

    fn tier(&self) -> LocatorTier {
        LocatorTier::Id
    }
}

/// Stable attribute lookup, one selector per captured attribute
pub struct AttributeTier;

impl MatchTier for AttributeTier {
    fn try_match(
        &self,
        fingerprint: &ElementFingerprint,
        doc: &Document,
    ) -> Result<Option<NodeId>, LocatorError> {
        let Some(attributes) = fingerprint.attributes() else {
            return Ok(None);
        };
        for (key, value) in attributes {
            let selector = format!(
                "{}[{}={}]",
                fingerprint.tag_name(),
                key,
                quote_attribute_value(value)
            );
            if let Some(node) = first_validated(self.tier(), &selector, fingerprint, doc)? {
                return Ok(Some(node));
            }
        }
        Ok(None)
    }

    fn tier(&self) -> LocatorTier {
        LocatorTier::Attribute
    }
}

/// All captured classes chained onto the tag
pub struct ClassCombinationTier;

impl MatchTier for ClassCombinationTier {
    fn try_match(
        &self,
        fingerprint: &ElementFingerprint,
        doc: &Document,
    ) -> Result<Option<NodeId>, LocatorError> {
        if fingerprint.class_list().is_empty() {
            return Ok(None);
        }
        let classes: String = fingerprint
            .class_list()
            .iter()
            .map(|class| format!(".{class}"))
            .collect();
        let selector = format!("{}{}", fingerprint.tag_name(), classes);
        first_validated(self.tier(), &selector, fingerprint, doc)
    }

    fn tier(&self) -> LocatorTier {
        LocatorTier::ClassCombination
    }
}

/// Captured structural path, used verbatim as a selector
pub struct PathTier;

impl MatchTier for PathTier {
    fn try_match(
        &self,
        fingerprint: &ElementFingerprint,
        doc: &Document,
    ) -> Result<Option<NodeId>, LocatorError> {
        if fingerprint.dom_path().is_empty() {
            return Ok(None);
        }
        first_validated(self.tier(), fingerprint.dom_path(), fingerprint, doc)
    }

    fn tier(&self) -> LocatorTier {
        LocatorTier::Path
    }
}

/// Last resort: `tag#id.first-class`, ranked by score
pub struct FallbackTier;

impl FallbackTier {
    fn loose_selector(fingerprint: &ElementFingerprint) -> String {
        let mut selector = fingerprint.tag_name().to_string();
        if let Some(id) = fingerprint.id() {
            selector.push('#');
            selector.push_str(&escape_identifier(id));
        }
        if let Some(class) = fingerprint.class_list().first() {
            selector.push('.');
            selector.push_str(class);
        }
        selector
    }
}

impl MatchTier for FallbackTier {
    fn try_match(
        &self,
        fingerprint: &ElementFingerprint,
        doc: &Document,
    ) -> Result<Option<NodeId>, LocatorError> {
        Ok(self
            .try_resolve(fingerprint, doc)?
            .map(|resolution| resolution.node))
    }

    fn tier(&self) -> LocatorTier {
        LocatorTier::Fallback
    }

    fn try_resolve(
        &self,
        fingerprint: &ElementFingerprint,
        doc: &Document,
    ) -> Result<Option<Resolution>, LocatorError> {
        let selector = Self::loose_selector(fingerprint);
        let candidates = doc
            .query_selector_all(&selector)
            .map_err(|e| LocatorError::selector(self.tier(), e))?;
        debug!(
            selector = %selector,
            candidates = candidates.len(),
            "fallback tier gathered candidates"
        );

        match candidates.as_slice() {
            [] => Ok(None),
            // the only structurally plausible element, taken unvalidated
            [only] => Ok(Some(Resolution::new(*only, self.tier()))),
            _ => {
                let mut best: Option<(NodeId, i64)> = None;
                for node in candidates {
                    let Some(el) = doc.element(node) else {
                        continue;
                    };
                    let candidate_score = score(&el, fingerprint);
                    // strict comparison keeps the earliest candidate on ties
                    if best.map_or(true, |(_, top)| candidate_score > top) {
                        best = Some((node, candidate_score));
                    }
                }
                Ok(best.map(|(node, top)| Resolution::new(node, self.tier()).with_score(top)))
            }
        }
    }
}

/// First selector match, in document order, that passes validation.
fn first_validated(
    tier: LocatorTier,
    selector: &str,
    fingerprint: &ElementFingerprint,
    doc: &Document,
) -> Result<Option<NodeId>, LocatorError> {
    let parsed = SelectorList::parse(selector).map_err(|e| LocatorError::selector(tier, e))?;
    debug!(tier = tier.name(), selector = %selector, "scanning selector matches");
    let found = doc
        .select(&parsed)
        .find(|node| doc.element(*node).is_some_and(|el| validate(&el, fingerprint)));
    Ok(found)
}

/// CSS identifier escape, so `id` can only ever select by id.
fn escape_identifier(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for (i, ch) in value.chars().enumerate() {
        let leading = i == 0 || (i == 1 && value.starts_with('-'));
        match ch {
            '0'..='9' if leading => escaped.push_str(&format!("\\{:x} ", ch as u32)),
            '-' if value == "-" => escaped.push_str("\\-"),
            c if c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() => {
                escaped.push(c)
            }
            c if c.is_ascii_control() => escaped.push_str(&format!("\\{:x} ", c as u32)),
            c => {
                escaped.push('\\');
                escaped.push(c);
            }
        }
    }
    escaped
}

/// Double-quoted CSS string for an attribute value.
fn quote_attribute_value(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for ch in value.chars() {
        match ch {
            '"' | '\\' => {
                quoted.push('\\');
                quoted.push(ch);
            }
            '\n' => quoted.push_str("\\a "),
            _ => quoted.push(ch),
        }
    }
    quoted.push('"');
    quoted
}
