// src/cli.rs

use crate::config::MetricsConfig;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the git repository to analyze
    #[arg(short, long)]
    pub repo: PathBuf,

    /// Refactoring detector JSON report; commits with refactorings become targets
    #[arg(long, required_unless_present = "target")]
    pub refactorings: Option<PathBuf>,

    /// Target commit hash (repeatable), in addition to the report's
    #[arg(short, long)]
    pub target: Vec<String>,

    /// File to write the metrics JSON to (stdout if omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also export the target commits with their diffs to this file
    #[arg(long)]
    pub commits_out: Option<PathBuf>,

    /// Trailing window for the committer's recent activity, in days
    #[arg(long, default_value_t = 30)]
    pub recent_days: u64,

    /// Line share below which a contributor counts as minor
    #[arg(long, default_value_t = 0.05)]
    pub minor_threshold: f64,

    /// Log per-commit progress
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn metrics_config(&self) -> MetricsConfig {
        MetricsConfig {
            recent_days: self.recent_days,
            minor_threshold: self.minor_threshold,
        }
    }
}
