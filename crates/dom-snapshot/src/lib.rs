//! Document snapshot used by the fingerprint and locator crates
//!
//! This crate provides the "live document" every other layer queries:
//! - Arena-backed node tree with stable `NodeId` handles
//! - Lenient HTML fragment parser for fixtures and captured markup
//! - CSS selector engine (`query_selector_all`) reporting malformed syntax
//!   as `SelectorError` instead of panicking

pub mod document;
pub mod errors;
mod html;
pub mod model;
pub mod selector;

pub use document::{Document, ElementRef};
pub use errors::{DomError, SelectorError};
pub use model::NodeId;
pub use selector::SelectorList;
