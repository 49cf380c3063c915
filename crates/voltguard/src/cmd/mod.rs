use clap::{Args, Subcommand};
use std::path::PathBuf;

use voltguard_feed::DEFAULT_ENDPOINT;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod streak;
pub mod tier;
pub mod version;
pub mod watch;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Classify streak metrics into a tier.
    Tier(TierArgs),
    /// List every tier with its eligibility and pet profile.
    Tiers,
    /// Summarise a streak snapshot document.
    Streak(StreakArgs),
    /// Pull frames from a camera feed server.
    Watch(WatchArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Tier(args) => tier::run(args, format),
        Command::Tiers => tier::list(format),
        Command::Streak(args) => streak::run(args, format),
        Command::Watch(args) => watch::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct TierArgs {
    /// Current streak in days.
    #[arg(long, allow_negative_numbers = true)]
    pub streak: i64,
    /// Average efficiency score (0-100).
    #[arg(long, allow_negative_numbers = true)]
    pub efficiency: f64,
    /// Days missed in the current period.
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub missed: i64,
}

#[derive(Args, Debug)]
pub struct StreakArgs {
    /// Snapshot JSON file. Reads stdin when omitted.
    pub file: Option<PathBuf>,
    /// Fail on malformed documents instead of falling back to defaults.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Frame server address (host:port).
    #[arg(long, env = "VOLTGUARD_FEED_ADDR", default_value = DEFAULT_ENDPOINT)]
    pub addr: String,
    /// Exit after receiving N frames.
    #[arg(long)]
    pub count: Option<usize>,
    /// Write the latest frame to this file.
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,
    /// Delay before re-requesting after a server error (e.g. 1s, 250ms).
    #[arg(long, default_value = "1000ms")]
    pub retry_delay: String,
    /// Connection timeout (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub connect_timeout: String,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
