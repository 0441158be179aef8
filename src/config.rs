// src/config.rs

use chrono::Duration;

/// Tunables of a metrics run.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsConfig {
    /// Trailing window for the committer's recent activity (REXP), in days
    pub recent_days: u64,
    /// Line share below which a contributor counts as minor (MINOR)
    pub minor_threshold: f64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            recent_days: 30,
            minor_threshold: 0.05,
        }
    }
}

impl MetricsConfig {
    pub fn recent_window(&self) -> Duration {
        Duration::days(self.recent_days as i64)
    }
}
