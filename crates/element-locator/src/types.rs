//! Core types for the locator

use std::fmt;
use std::str::FromStr;

use dom_snapshot::NodeId;
use serde::{Deserialize, Serialize};

/// Matching tier enumeration
///
/// One variant per strategy of the resolution cascade, listed in the
/// default order:
/// - Id: exact `id` lookup
/// - Attribute: `tag[key="value"]` per stable attribute
/// - ClassCombination: `tag.c1.c2...`
/// - Path: the captured structural path
/// - Fallback: loose selector plus scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LocatorTier {
    Id,
    Attribute,
    ClassCombination,
    Path,
    Fallback,
}

impl LocatorTier {
    /// Get tier name as string
    pub fn name(&self) -> &'static str {
        match self {
            LocatorTier::Id => "id",
            LocatorTier::Attribute => "attribute",
            LocatorTier::ClassCombination => "class-combination",
            LocatorTier::Path => "path",
            LocatorTier::Fallback => "fallback",
        }
    }

    /// All tiers in cascade order
    pub fn default_chain() -> Vec<LocatorTier> {
        vec![
            LocatorTier::Id,
            LocatorTier::Attribute,
            LocatorTier::ClassCombination,
            LocatorTier::Path,
            LocatorTier::Fallback,
        ]
    }

    /// Whether candidates from this tier must pass validation.
    pub fn validates(&self) -> bool {
        !matches!(self, LocatorTier::Fallback)
    }
}

impl fmt::Display for LocatorTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LocatorTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LocatorTier::default_chain()
            .into_iter()
            .find(|tier| tier.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown locator tier '{s}'"))
    }
}

/// Element resolution result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Resolved element
    pub node: NodeId,

    /// Tier that produced the element
    pub tier: LocatorTier,

    /// Winning score, set only when the fallback tier ranked several candidates
    pub score: Option<i64>,
}

impl Resolution {
    pub fn new(node: NodeId, tier: LocatorTier) -> Self {
        Self {
            node,
            tier,
            score: None,
        }
    }

    pub fn with_score(mut self, score: i64) -> Self {
        self.score = Some(score);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_names() {
        assert_eq!(LocatorTier::Id.name(), "id");
        assert_eq!(LocatorTier::ClassCombination.to_string(), "class-combination");
        assert_eq!("PATH".parse::<LocatorTier>(), Ok(LocatorTier::Path));
        assert!("css".parse::<LocatorTier>().is_err());
    }

    #[test]
    fn test_default_chain() {
        let chain = LocatorTier::default_chain();
        assert_eq!(chain.len(), 5);
        assert_eq!(chain[0], LocatorTier::Id);
        assert_eq!(chain[4], LocatorTier::Fallback);
        assert_eq!(chain.iter().filter(|t| t.validates()).count(), 4);
    }

    #[test]
    fn test_tier_serde_names_match_display() {
        for tier in LocatorTier::default_chain() {
            let json = serde_json::to_string(&tier).unwrap();
            assert_eq!(json, format!("\"{}\"", tier.name()));
        }
    }
}
