//! Pinmark library
//!
//! Exposes the CLI plumbing and configuration for integration testing

pub mod cli;
pub mod config;
pub mod page;

pub use config::{Config, ConfigError};
