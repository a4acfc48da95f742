//! Overlay session - who is highlighted right now
//!
//! The locator is stateless; the only state that survives between
//! resolutions lives here, owned by whoever drives the overlay:
//! - `OverlaySession` remembers the highlighted element and skips
//!   redundant repaints
//! - `IgnoreSet` marks overlay-owned subtrees that must never be targeted

pub mod ignore;
pub mod renderer;
pub mod session;

pub use ignore::IgnoreSet;
pub use renderer::{OverlayRenderer, TracingRenderer};
pub use session::{OverlaySession, OverlayUpdate};
