//! Element fingerprints
//!
//! A fingerprint is the serializable description of "this element" taken at
//! capture time:
//! - `builder` snapshots tag, classes, id, text, stable attributes
//! - `path` computes the `tag:nth-child(i) > ...` structural path
//! - `codec` turns stored strings back into validated fingerprints

pub mod builder;
pub mod codec;
pub mod errors;
pub mod model;
pub mod path;

pub use builder::{capture, text_snippet, STABLE_ATTRIBUTES, TEXT_SNIPPET_MAX_CHARS};
pub use errors::FingerprintError;
pub use model::ElementFingerprint;
pub use path::{capture_path, compute_path, PATH_SEPARATOR};
