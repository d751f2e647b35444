use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};
use humantime::parse_duration;

#[allow(clippy::struct_excessive_bools)]
#[derive(Parser, Debug)]
#[command(author, version, about = "Self-replenishing wall of notification blurbs", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file (missing file means defaults).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the number of blurbs kept on screen.
    #[arg(long, value_parser = clap::value_parser!(usize))]
    pub capacity: Option<usize>,

    /// Seed for placement and timing randomness.
    #[arg(long, value_parser = clap::value_parser!(u64))]
    pub seed: Option<u64>,

    /// Stop after this long instead of waiting for Ctrl-C (e.g. "2m").
    #[arg(long, value_parser = parse_duration, value_name = "DURATION")]
    pub run_for: Option<Duration>,

    /// Allow a plain-HTTP content endpoint.
    #[arg(long, action = ArgAction::SetTrue)]
    pub insecure: bool,

    /// Keep blurbs off the desktop and only log what would be shown.
    #[arg(long, action = ArgAction::SetTrue)]
    pub dry_run: bool,

    /// Emit logs as JSON (needs `--features json-logs`).
    #[arg(long, action = ArgAction::SetTrue)]
    pub json_logs: bool,

    /// Explicit log filter (e.g. "blurbs=debug").
    #[arg(long, value_name = "FILTER")]
    pub log_filter: Option<String>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
