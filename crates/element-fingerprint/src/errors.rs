use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FingerprintError {
    /// Stored payload is not a fingerprint-shaped JSON document
    #[error("fingerprint parse error: {0}")]
    Parse(String),

    /// Payload parsed but breaks a fingerprint invariant
    #[error("invalid fingerprint: {0}")]
    Invalid(String),
}
