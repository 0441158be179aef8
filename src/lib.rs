// src/lib.rs

//! Commit-level and file-level evolution metrics for refactoring commits.

pub mod cli;
pub mod cochange;
pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod ledger;
pub mod metrics;
pub mod model;
pub mod package;
pub mod report;
pub mod targets;

pub use config::MetricsConfig;
pub use engine::MetricsEngine;
pub use error::{MetricsError, Result};
pub use model::{Commit, CommitMetrics, FileChange, FileMetric, GeneralMetric};
