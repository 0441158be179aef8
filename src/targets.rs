// src/targets.rs

//! Selection of the commits that metrics are produced for.

use crate::error::{MetricsError, Result};
use crate::model::Commit;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// The refactoring detector's JSON report.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefactoringReport {
    #[serde(default)]
    pub commits: Vec<RefactoringCommit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefactoringCommit {
    pub sha1: String,
    #[serde(default)]
    pub refactorings: Vec<serde_json::Value>,
}

impl RefactoringReport {
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Hashes of commits with at least one detected refactoring, in report order.
    pub fn target_hashes(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.commits
            .iter()
            .filter(|c| !c.refactorings.is_empty())
            .filter(|c| seen.insert(c.sha1.as_str()))
            .map(|c| c.sha1.clone())
            .collect()
    }
}

/// Indices of the flagged commits, in history order.
pub fn select_targets(history: &[Commit]) -> Vec<usize> {
    history
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_target)
        .map(|(i, _)| i)
        .collect()
}

/// Fails on the first requested hash that is missing from `history`.
pub fn verify_targets(history: &[Commit], hashes: &[String]) -> Result<()> {
    let known: HashSet<&str> = history.iter().map(|c| c.hash.as_str()).collect();
    match hashes.iter().find(|h| !known.contains(h.as_str())) {
        Some(missing) => Err(MetricsError::TargetNotInHistory { hash: missing.clone() }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn commit(hash: &str, target: bool) -> Commit {
        Commit::new(hash, "msg", "a", "a", Utc.timestamp_opt(0, 0).unwrap()).with_target(target)
    }

    #[test]
    fn test_target_hashes_skip_empty_refactorings() {
        let raw = r#"{"commits": [
            {"repository": "r", "sha1": "aaa", "url": "u", "refactorings": [{"type": "Extract Method"}]},
            {"repository": "r", "sha1": "bbb", "url": "u", "refactorings": []},
            {"repository": "r", "sha1": "ccc", "url": "u", "refactorings": [{"type": "Rename Class"}]},
            {"repository": "r", "sha1": "aaa", "url": "u", "refactorings": [{"type": "Move Method"}]}
        ]}"#;
        let report = RefactoringReport::from_json(raw).unwrap();
        assert_eq!(report.target_hashes(), vec!["aaa".to_string(), "ccc".to_string()]);
    }

    #[test]
    fn test_select_targets_in_history_order() {
        let history = vec![commit("a", false), commit("b", true), commit("c", false), commit("d", true)];
        assert_eq!(select_targets(&history), vec![1, 3]);
    }

    #[test]
    fn test_verify_targets_reports_missing_hash() {
        let history = vec![commit("a", false), commit("b", true)];
        assert!(verify_targets(&history, &["b".to_string()]).is_ok());
        match verify_targets(&history, &["b".to_string(), "zz".to_string()]) {
            Err(MetricsError::TargetNotInHistory { hash }) => assert_eq!(hash, "zz"),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
