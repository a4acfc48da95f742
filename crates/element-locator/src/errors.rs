//! Error types for the locator

use dom_snapshot::SelectorError;
use element_fingerprint::FingerprintError;
use thiserror::Error;

use crate::types::LocatorTier;

/// Locator error enumeration
///
/// "Element not found" is deliberately absent: it is an `Option::None`
/// result, not a failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LocatorError {
    /// Stored fingerprint string is not valid serialized data
    #[error("fingerprint parse error: {0}")]
    Parse(String),

    /// A tier generated a selector the engine cannot parse
    #[error("tier '{tier}' built invalid selector '{selector}': {reason}")]
    Selector {
        tier: LocatorTier,
        selector: String,
        reason: String,
    },

    /// Fingerprint decoded but breaks an invariant
    #[error("invalid fingerprint: {0}")]
    InvalidFingerprint(String),
}

impl LocatorError {
    pub fn selector(tier: LocatorTier, err: SelectorError) -> Self {
        LocatorError::Selector {
            tier,
            selector: err.selector,
            reason: err.reason,
        }
    }
}

impl From<FingerprintError> for LocatorError {
    fn from(err: FingerprintError) -> Self {
        match err {
            FingerprintError::Parse(msg) => LocatorError::Parse(msg),
            FingerprintError::Invalid(msg) => LocatorError::InvalidFingerprint(msg),
        }
    }
}
