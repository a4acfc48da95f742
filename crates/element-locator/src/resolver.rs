//! Element resolver with tier cascade orchestration

use dom_snapshot::{Document, NodeId};
use element_fingerprint::ElementFingerprint;
use tracing::{debug, info, warn};

use crate::{errors::LocatorError, strategies::*, types::*};

/// Runs matching tiers in order until one produces an element.
///
/// The resolver holds no per-call state; concurrent or overlapping
/// resolutions are independent.
pub struct Resolver {
    tiers: Vec<Box<dyn MatchTier>>,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver {
    /// Create a resolver running every tier in default order
    pub fn new() -> Self {
        Self::with_chain(LocatorTier::default_chain())
    }

    /// Create a resolver running `chain` in the given order.
    ///
    /// Repeated tiers are ignored after their first occurrence.
    pub fn with_chain(chain: Vec<LocatorTier>) -> Self {
        let mut seen = Vec::with_capacity(chain.len());
        for tier in chain {
            if !seen.contains(&tier) {
                seen.push(tier);
            }
        }
        Self {
            tiers: seen.into_iter().map(tier_for).collect(),
        }
    }

    /// Append a custom tier at the end of the cascade
    pub fn with_tier(mut self, tier: Box<dyn MatchTier>) -> Self {
        self.tiers.push(tier);
        self
    }

    /// Tiers in the order they run
    pub fn chain(&self) -> Vec<LocatorTier> {
        self.tiers.iter().map(|tier| tier.tier()).collect()
    }

    /// Locate the element described by `fingerprint`, or `None`.
    pub fn resolve(&self, fingerprint: &ElementFingerprint, doc: &Document) -> Option<NodeId> {
        self.resolve_detailed(fingerprint, doc)
            .map(|resolution| resolution.node)
    }

    /// Like [`Resolver::resolve`], reporting which tier matched.
    pub fn resolve_detailed(
        &self,
        fingerprint: &ElementFingerprint,
        doc: &Document,
    ) -> Option<Resolution> {
        debug!(
            tag = fingerprint.tag_name(),
            path = fingerprint.dom_path(),
            "Resolving element fingerprint"
        );

        for tier in &self.tiers {
            debug!("Trying tier: {}", tier.name());

            match tier.try_resolve(fingerprint, doc) {
                Ok(Some(resolution)) => {
                    info!(
                        "Resolved element using {} tier: {}{}",
                        tier.name(),
                        resolution.node,
                        resolution
                            .score
                            .map(|score| format!(" (score: {score})"))
                            .unwrap_or_default()
                    );
                    return Some(resolution);
                }
                Ok(None) => {
                    debug!("Tier {} produced no candidate", tier.name());
                }
                Err(e) => {
                    warn!("Tier {} failed: {}", tier.name(), e);
                }
            }
        }

        info!(
            "Element not found: all tiers exhausted for <{}>",
            fingerprint.tag_name()
        );
        None
    }

    /// Decode a stored fingerprint string and resolve it.
    ///
    /// A payload that cannot be decoded is logged and treated as not found.
    pub fn resolve_serialized(&self, payload: &str, doc: &Document) -> Option<NodeId> {
        match decode_fingerprint(payload) {
            Ok(fingerprint) => self.resolve(&fingerprint, doc),
            Err(e) => {
                warn!("Failed to decode stored fingerprint: {}", e);
                None
            }
        }
    }
}

/// Decode a stored fingerprint string.
pub fn decode_fingerprint(payload: &str) -> Result<ElementFingerprint, LocatorError> {
    Ok(ElementFingerprint::from_json(payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedTier(Option<NodeId>);

    impl MatchTier for FixedTier {
        fn try_match(
            &self,
            _fingerprint: &ElementFingerprint,
            _doc: &Document,
        ) -> Result<Option<NodeId>, LocatorError> {
            Ok(self.0)
        }

        fn tier(&self) -> LocatorTier {
            LocatorTier::Fallback
        }
    }

    #[test]
    fn test_with_chain_drops_duplicates() {
        let resolver = Resolver::with_chain(vec![
            LocatorTier::Path,
            LocatorTier::Id,
            LocatorTier::Path,
        ]);
        assert_eq!(resolver.chain(), vec![LocatorTier::Path, LocatorTier::Id]);
        assert_eq!(Resolver::new().chain(), LocatorTier::default_chain());
    }

    #[test]
    fn test_empty_chain_never_resolves() {
        let doc = Document::parse_html(r#"<body><p id="x">x</p></body>"#).unwrap();
        let fp = ElementFingerprint::new("p").with_id("x");
        assert_eq!(Resolver::with_chain(Vec::new()).resolve(&fp, &doc), None);
    }

    #[test]
    fn test_custom_tier_runs_last() {
        let doc = Document::parse_html(r#"<body><p>x</p></body>"#).unwrap();
        let p = doc.query_selector("p").unwrap().unwrap();
        let fp = ElementFingerprint::new("section");

        let resolver = Resolver::with_chain(vec![LocatorTier::Id]).with_tier(Box::new(FixedTier(Some(p))));
        assert_eq!(resolver.resolve(&fp, &doc), Some(p));
    }

    #[test]
    fn test_resolve_serialized_tolerates_garbage() {
        let doc = Document::parse_html(r#"<body><p>x</p></body>"#).unwrap();
        let resolver = Resolver::new();
        assert_eq!(resolver.resolve_serialized("{not json", &doc), None);
        assert_eq!(resolver.resolve_serialized(r#"{"tagName":""}"#, &doc), None);
        assert!(resolver.resolve_serialized(r#"{"tagName":"p"}"#, &doc).is_some());
    }

    #[test]
    fn test_decode_failures_are_classified() {
        assert!(matches!(
            decode_fingerprint("{not json"),
            Err(LocatorError::Parse(_))
        ));
        assert!(matches!(
            decode_fingerprint(r#"{"tagName":"  "}"#),
            Err(LocatorError::InvalidFingerprint(_))
        ));
        assert_eq!(decode_fingerprint(r#"{"tagName":"P"}"#).unwrap().tag_name(), "p");
    }
}
