use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

/// Errors raised while handling review records.
#[derive(Debug, Error, Clone)]
pub enum RecordError {
    #[error("invalid review id: {0}")]
    InvalidId(String),

    #[error("malformed review records: {0}")]
    Malformed(String),
}

#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ReviewId(pub String);

impl ReviewId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn parse(raw: &str) -> Result<Self, RecordError> {
        Uuid::parse_str(raw)
            .map(|id| Self(id.to_string()))
            .map_err(|_| RecordError::InvalidId(raw.to_string()))
    }
}

impl Default for ReviewId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A reviewer's note attached to one UI element.
///
/// Owned by the persistence layer; the locator only reads `path` and
/// fills `stable_id` when it is missing.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-full", serde(rename_all = "camelCase"))]
#[derive(Clone, Debug, PartialEq)]
pub struct ReviewRecord {
    #[cfg_attr(feature = "serde-full", serde(default))]
    pub id: ReviewId,

    /// Display name of the element (component or tag)
    pub name: String,

    /// Source code location (`file:line:column`)
    pub path: String,

    #[cfg_attr(
        feature = "serde-full",
        serde(rename = "type", default, skip_serializing_if = "Option::is_none")
    )]
    pub kind: Option<String>,

    #[cfg_attr(feature = "serde-full", serde(default, skip_serializing_if = "Option::is_none"))]
    pub comment: Option<String>,

    /// Opaque screenshot reference (data URL or blob key)
    #[cfg_attr(feature = "serde-full", serde(default, skip_serializing_if = "Option::is_none"))]
    pub screenshot: Option<String>,

    /// Serialized element fingerprint
    #[cfg_attr(feature = "serde-full", serde(default, skip_serializing_if = "Option::is_none"))]
    pub stable_id: Option<String>,

    #[cfg_attr(feature = "serde-full", serde(default))]
    pub is_submitted: bool,

    #[cfg_attr(feature = "serde-full", serde(default))]
    pub is_fixed: bool,

    #[cfg_attr(feature = "serde-full", serde(default = "Utc::now"))]
    pub created_at: DateTime<Utc>,
}

impl ReviewRecord {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: ReviewId::new(),
            name: name.into(),
            path: path.into(),
            kind: None,
            comment: None,
            screenshot: None,
            stable_id: None,
            is_submitted: false,
            is_fixed: false,
            created_at: Utc::now(),
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_stable_id(mut self, stable_id: impl Into<String>) -> Self {
        self.stable_id = Some(stable_id.into());
        self
    }

    /// Whether a fingerprint has already been stored for this record.
    pub fn has_stable_id(&self) -> bool {
        self.stable_id.as_deref().is_some_and(|s| !s.trim().is_empty())
    }
}

#[cfg(feature = "serde-full")]
pub fn parse_records(raw: &str) -> Result<Vec<ReviewRecord>, RecordError> {
    serde_json::from_str(raw).map_err(|err| RecordError::Malformed(err.to_string()))
}
