pub mod app;
pub mod attach;
pub mod capture;
pub mod commands;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod env;
pub mod output;
pub mod path;
pub mod resolve;
pub mod runtime;
pub mod score;

pub use app::run;
pub use context::CliContext;
pub use env::CliArgs;
