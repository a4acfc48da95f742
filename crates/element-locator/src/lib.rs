//! Element locator - tiered resolution of stored fingerprints
//!
//! This crate turns a fingerprint captured earlier back into a live element:
//! - Id, attribute, class-combination and path tiers with validation
//! - Fuzzy fallback tier ranked by a weighted match score
//! - Configurable tier order; the first tier with a result wins
//! - Source-location lookups and fingerprint back-fill for review records
//!
//! "Not found" is an ordinary `None`, never an error.

pub mod errors;
pub mod records;
pub mod resolver;
pub mod scorer;
pub mod source;
pub mod strategies;
pub mod types;
pub mod validate;

pub use errors::*;
pub use records::*;
pub use resolver::*;
pub use scorer::*;
pub use source::*;
pub use strategies::*;
pub use types::*;
pub use validate::*;
