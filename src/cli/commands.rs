use clap::Subcommand;

use super::attach::AttachArgs;
use super::capture::CaptureArgs;
use super::config::ConfigArgs;
use super::path::PathArgs;
use super::resolve::ResolveArgs;
use super::score::ScoreArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Capture the fingerprint of an element in an HTML snapshot
    Capture(CaptureArgs),

    /// Re-locate a stored fingerprint in an HTML snapshot
    Resolve(ResolveArgs),

    /// Print the structural path of an element
    Path(PathArgs),

    /// Score every element matching a selector against a fingerprint
    Score(ScoreArgs),

    /// Fill in missing fingerprints of review records from source locations
    Attach(AttachArgs),

    /// Manage Pinmark configuration
    Config(ConfigArgs),
}
