//! Error types for the document snapshot

use thiserror::Error;

use crate::model::NodeId;

/// A selector string that could not be parsed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid selector '{selector}': {reason}")]
pub struct SelectorError {
    /// Selector as it was handed to the engine
    pub selector: String,

    /// Why parsing stopped
    pub reason: String,
}

impl SelectorError {
    pub fn new(selector: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            reason: reason.into(),
        }
    }
}

/// Document construction and mutation errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomError {
    /// Markup could not be turned into a tree
    #[error("html parse error: {0}")]
    HtmlParse(String),

    /// Node handle does not belong to this document
    #[error("invalid node: {0}")]
    InvalidNode(NodeId),

    /// Insertion would break the tree shape
    #[error("hierarchy request error: {0}")]
    HierarchyRequest(String),

    /// Selector failure surfaced through a document call
    #[error(transparent)]
    Selector(#[from] SelectorError),
}
