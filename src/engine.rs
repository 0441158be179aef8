// src/engine.rs

use crate::cochange::CoChangeScanner;
use crate::config::MetricsConfig;
use crate::error::{MetricsError, Result};
use crate::ledger::HistoryLedger;
use crate::metrics::synthesize;
use crate::model::{Commit, CommitMetrics};
use crate::targets::select_targets;
use tracing::{debug, info};

/// Computes metrics for every flagged commit of a history.
#[derive(Debug, Clone, Default)]
pub struct MetricsEngine {
    config: MetricsConfig,
}

impl MetricsEngine {
    pub fn new(config: MetricsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MetricsConfig {
        &self.config
    }

    /// Runs over `history`, which must be in ascending author-date order.
    /// Either every target gets its record or the run fails.
    pub fn compute(&self, history: &[Commit]) -> Result<Vec<CommitMetrics>> {
        check_order(history)?;

        let targets = select_targets(history);
        info!("Computing metrics for {} of {} commits", targets.len(), history.len());

        let mut scanner = CoChangeScanner::new();
        let mut ledger = HistoryLedger::new();
        let mut results = Vec::with_capacity(targets.len());

        for index in targets {
            let target = &history[index];
            let window = scanner.scan(history, target)?;
            ledger.absorb_through(history, window.target_index);

            let metrics = synthesize(history, target, &window, &ledger, &self.config);
            debug!(
                hash = %target.hash,
                files = metrics.file_metrics.len(),
                ncomm = metrics.general_metrics.ncomm,
                "target processed"
            );
            results.push(metrics);
        }

        results.sort_by_key(|m| m.date);
        Ok(results)
    }
}

fn check_order(history: &[Commit]) -> Result<()> {
    match history.windows(2).find(|pair| pair[1].date < pair[0].date) {
        Some(pair) => Err(MetricsError::HistoryOutOfOrder {
            hash: pair[1].hash.clone(),
        }),
        None => Ok(()),
    }
}
