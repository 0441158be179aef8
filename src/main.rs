// src/main.rs

use anyhow::{Context, Result};
use clap::Parser;
use refactor_metrics::cli::Args;
use refactor_metrics::history::load_history;
use refactor_metrics::report::{target_exports, write_json, MetricsReport};
use refactor_metrics::targets::{verify_targets, RefactoringReport};
use refactor_metrics::MetricsEngine;
use std::collections::HashSet;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let start_time = Instant::now();

    let mut hashes = Vec::new();
    if let Some(path) = &args.refactorings {
        let report = RefactoringReport::from_path(path)
            .with_context(|| format!("Failed to read refactoring report {}", path.display()))?;
        hashes.extend(report.target_hashes());
    }
    hashes.extend(args.target.iter().cloned());
    let target_set: HashSet<String> = hashes.iter().cloned().collect();

    let history = load_history(&args.repo, &target_set)
        .with_context(|| format!("Failed to load history of {}", args.repo.display()))?;
    verify_targets(&history, &hashes)?;
    info!("History loaded in {:.2?}", start_time.elapsed());

    let engine = MetricsEngine::new(args.metrics_config());
    let metrics = engine.compute(&history)?;

    write_json(&MetricsReport::new(&metrics), args.output.as_deref())
        .context("Failed to write metrics")?;
    if let Some(path) = &args.commits_out {
        write_json(&target_exports(&history), Some(path)).context("Failed to write target commits")?;
    }

    info!(
        "Computed metrics for {} commits in {:.2?}",
        metrics.len(),
        start_time.elapsed()
    );
    Ok(())
}
