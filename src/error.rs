// src/error.rs

use thiserror::Error;

/// Errors that can occur while loading history or computing metrics
#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("target commit {hash} is not part of the supplied history")]
    TargetNotInHistory { hash: String },

    #[error("target commit {hash} precedes the previously processed target")]
    TargetOutOfOrder { hash: String },

    #[error("history is not in ascending date order at commit {hash}")]
    HistoryOutOfOrder { hash: String },

    #[error("commit {hash} has an unrepresentable author timestamp {seconds}")]
    InvalidTimestamp { hash: String, seconds: i64 },

    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MetricsError>;
