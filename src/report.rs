// src/report.rs

//! JSON shapes handed to downstream tools.

use crate::error::Result;
use crate::model::{Commit, CommitMetrics};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Top-level metrics document.
#[derive(Debug, Serialize)]
pub struct MetricsReport<'a> {
    pub commits_metrics: &'a [CommitMetrics],
}

impl<'a> MetricsReport<'a> {
    pub fn new(commits_metrics: &'a [CommitMetrics]) -> Self {
        Self { commits_metrics }
    }
}

#[derive(Debug, Serialize)]
pub struct DiffStat<'a> {
    pub filename: &'a str,
    pub old_path: Option<&'a str>,
    pub new_path: Option<&'a str>,
    pub added_lines: u64,
    pub deleted_lines: u64,
    pub diff_text: &'a str,
}

/// A target commit with its diffs, as exported next to the metrics.
#[derive(Debug, Serialize)]
pub struct TargetCommitExport<'a> {
    pub current_hash: &'a str,
    pub previous_hash: Option<&'a str>,
    pub msg: &'a str,
    pub diff_stats: Vec<DiffStat<'a>>,
}

impl<'a> From<&'a Commit> for TargetCommitExport<'a> {
    fn from(commit: &'a Commit) -> Self {
        Self {
            current_hash: &commit.hash,
            previous_hash: commit.parent.as_deref(),
            msg: &commit.message,
            diff_stats: commit
                .files()
                .iter()
                .map(|f| DiffStat {
                    filename: &f.name,
                    old_path: f.old_path.as_deref(),
                    new_path: f.new_path.as_deref(),
                    added_lines: f.added_lines,
                    deleted_lines: f.deleted_lines,
                    diff_text: &f.diff,
                })
                .collect(),
        }
    }
}

/// Flagged commits of `history`, oldest first.
pub fn target_exports(history: &[Commit]) -> Vec<TargetCommitExport<'_>> {
    history.iter().filter(|c| c.is_target).map(Into::into).collect()
}

/// Pretty-prints `value` to `path`, or to stdout when no path is given.
pub fn write_json<T: Serialize>(value: &T, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            let mut writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(&mut writer, value)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, value)?;
            writer.write_all(b"\n")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FileChange, FileMetric, GeneralMetric};
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn test_metrics_field_names() {
        let record = CommitMetrics {
            hash: "abc".into(),
            message: "Extract method".into(),
            date: Utc.timestamp_opt(0, 0).unwrap(),
            file_metrics: vec![FileMetric {
                filename: "A.java".into(),
                new_path: Some("src/A.java".into()),
                entropy: 1.0,
                ..Default::default()
            }],
            general_metrics: GeneralMetric {
                nf: 1,
                fix: true,
                ..Default::default()
            },
        };
        let records = [record];
        let value = serde_json::to_value(MetricsReport::new(&records)).unwrap();
        let first = &value["commits_metrics"][0];
        assert_eq!(first["refactor_hash"], json!("abc"));
        assert_eq!(first["refactor_msg"], json!("Extract method"));
        assert!(first.get("date").is_none());
        assert_eq!(first["general_metrics"]["NF"], json!(1));
        assert_eq!(first["general_metrics"]["FIX"], json!(true));
        let file = &first["file_metrics"][0];
        assert_eq!(file["filename"], json!("A.java"));
        assert_eq!(file["old_path"], json!(null));
        assert_eq!(file["ENTROPY"], json!(1.0));
        for key in ["COMM", "ADEV", "DDEV", "ADD", "DEL", "OWN", "MINOR", "OEXP", "LA", "LD", "NDEV", "NUC", "LT", "AGE", "SEXP"] {
            assert!(file.get(key).is_some(), "missing {}", key);
        }
    }

    #[test]
    fn test_target_exports_only_flagged() {
        let date = Utc.timestamp_opt(0, 0).unwrap();
        let history = vec![
            Commit::new("a", "init", "x", "x", date),
            Commit::new("b", "rename", "x", "x", date)
                .with_parent(Some("a".into()))
                .with_target(true)
                .with_files(vec![FileChange::new("B.java", Some("B.java".into()), Some("A.java".into()))
                    .with_lines(1, 1, Some(3))
                    .with_diff("@@ -1 +1 @@")]),
        ];
        let exports = target_exports(&history);
        assert_eq!(exports.len(), 1);
        let value = serde_json::to_value(&exports[0]).unwrap();
        assert_eq!(value["current_hash"], json!("b"));
        assert_eq!(value["previous_hash"], json!("a"));
        assert_eq!(value["diff_stats"][0]["old_path"], json!("A.java"));
        assert_eq!(value["diff_stats"][0]["diff_text"], json!("@@ -1 +1 @@"));
    }

    #[test]
    fn test_write_json_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/metrics.json");
        let records: Vec<CommitMetrics> = Vec::new();
        write_json(&MetricsReport::new(&records), Some(&path)).unwrap();
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, json!({"commits_metrics": []}));
    }
}
