// src/metrics.rs

//! Turns a co-change window and a ledger snapshot into output records.

use crate::cochange::CoChangeWindow;
use crate::config::MetricsConfig;
use crate::ledger::HistoryLedger;
use crate::model::{Commit, CommitMetrics, FileChange, FileMetric, GeneralMetric};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

static FIX_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Rounds the exact binary value to two decimals, ties to even.
pub fn round2(value: f64) -> f64 {
    format!("{:.2}", value).parse().unwrap_or(value)
}

/// `value / total`, or 0 when `total` is not positive.
fn ratio(value: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        value as f64 / total as f64
    }
}

/// Whether the message references a fixed bug or issue, e.g. "Fixes #12".
pub fn is_fix(message: &str) -> bool {
    FIX_PATTERN
        .get_or_init(|| {
            Regex::new(r"(?i)(Fix\w*|BugFix\w*|Bug\w*|Solv\w*)\s+#\d+").expect("valid fix regex")
        })
        .is_match(message)
}

/// Geometric mean over the positive values; 0 when there are none.
pub fn geometric_mean(values: impl IntoIterator<Item = u64>) -> f64 {
    let (log_sum, count) = values
        .into_iter()
        .filter(|v| *v > 0)
        .fold((0.0_f64, 0_usize), |(sum, n), v| (sum + (v as f64).ln(), n + 1));
    if count == 0 {
        return 0.0;
    }
    (log_sum / count as f64).exp()
}

/// Distinct parent-directory components over old and new paths.
pub fn distinct_directories(files: &[FileChange]) -> usize {
    let mut dirs: HashSet<&str> = HashSet::new();
    for file in files {
        for path in [file.old_path.as_deref(), file.new_path.as_deref()].into_iter().flatten() {
            let parts: Vec<&str> = path.split('/').collect();
            if let Some((_, parents)) = parts.split_last() {
                dirs.extend(parents.iter().copied());
            }
        }
    }
    dirs.len()
}

/// Distinct resolved package names.
pub fn distinct_packages(files: &[FileChange]) -> usize {
    files
        .iter()
        .filter_map(|f| f.package.as_deref())
        .collect::<HashSet<_>>()
        .len()
}

/// Builds the metrics of `target` from its window and the ledger, which must
/// have absorbed history up to and including the target.
pub fn synthesize(
    history: &[Commit],
    target: &Commit,
    window: &CoChangeWindow,
    ledger: &HistoryLedger,
    config: &MetricsConfig,
) -> CommitMetrics {
    let names: Vec<&str> = target.file_names().collect();

    let general = GeneralMetric {
        nadev: window.authors.len(),
        nddev: ledger.cochange_authors(history, &names).len(),
        ncomm: window.co_changes,
        exp: round2(geometric_mean(ledger.author_line_totals())),
        nd: distinct_directories(target.files()),
        ns: distinct_packages(target.files()),
        nf: target.total_files,
        fix: is_fix(&target.message),
        cexp: ledger.committer_commits(&target.committer),
        rexp: ledger.recent_committer_commits(&target.committer, config.recent_window()),
    };

    let file_metrics = target
        .files()
        .iter()
        .map(|file| file_metric(target, file, window, ledger, config))
        .collect();

    CommitMetrics {
        hash: target.hash.clone(),
        message: target.message.clone(),
        date: target.date,
        file_metrics,
        general_metrics: general,
    }
}

fn file_metric(
    target: &Commit,
    file: &FileChange,
    window: &CoChangeWindow,
    ledger: &HistoryLedger,
    config: &MetricsConfig,
) -> FileMetric {
    let mut metric = FileMetric {
        new_path: file.new_path.clone(),
        old_path: file.old_path.clone(),
        filename: file.name.clone(),
        la: file.added_lines,
        ld: file.deleted_lines,
        entropy: round2(ratio(file.changed_lines(), target.total_lines)),
        ..Default::default()
    };

    if let Some(activity) = window.file(&file.name) {
        metric.comm = activity.commits;
        metric.adev = activity.authors.len();
        metric.ndev = metric.adev;
    }

    if let Some(package) = &file.package {
        metric.sexp = ledger.same_package_files(&target.author, package);
    }

    let Some(history) = ledger.file(&file.name) else {
        return metric;
    };

    metric.ddev = history.contributors.len();
    metric.nuc = history.touch_count();
    metric.add = round2(ratio(file.added_lines, history.added_total));
    metric.del = round2(ratio(file.deleted_lines, history.deleted_total));
    metric.minor = history.minor_contributors(config.minor_threshold);
    metric.lt = history.prior_nloc.unwrap_or(0);
    metric.age = round2(history.mean_age_days());

    if let Some((owner, contribution)) = history.dominant_contributor() {
        metric.own = round2(ratio(contribution.lines, history.line_volume()));
        metric.oexp = round2(ratio(ledger.author_lines(owner), ledger.total_author_lines()));
    }

    metric
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fix_pattern() {
        assert!(is_fix("Fixes bug #123 in parser"));
        assert!(is_fix("fixed #7"));
        assert!(is_fix("Solves #42: NPE on empty input"));
        assert!(is_fix("BUGFIX  #1"));
        assert!(!is_fix("Refactor parser class"));
        assert!(!is_fix("Fix parser, see #12"));
        assert!(!is_fix("fix #abc"));
    }

    #[test]
    fn test_geometric_mean_skips_non_positive() {
        assert!((geometric_mean([100, 100]) - 100.0).abs() < 1e-9);
        assert!((geometric_mean([0, 100]) - 100.0).abs() < 1e-9);
        assert!((geometric_mean([4, 16]) - 8.0).abs() < 1e-9);
        assert_eq!(geometric_mean([0, 0]), 0.0);
        assert_eq!(geometric_mean(Vec::<u64>::new()), 0.0);
    }

    #[test]
    fn test_round2_ties_to_even() {
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(1.0 / 3.0), 0.33);
        assert_eq!(round2(2.0 / 3.0), 0.67);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn test_round2_near_ties_follow_binary_value() {
        // 1/40 is stored slightly above 0.025, 7/40 slightly below 0.175
        assert_eq!(round2(1.0 / 40.0), 0.03);
        assert_eq!(round2(7.0 / 40.0), 0.17);
        assert_eq!(round2(39.0 / 40.0), 0.97);
        assert_eq!(round2(2.675), 2.67);
    }

    #[test]
    fn test_distinct_directories_use_both_paths() {
        let files = vec![
            FileChange::new("A.java", Some("src/main/a/A.java".into()), Some("src/old/A.java".into())),
            FileChange::new("B.java", Some("src/main/B.java".into()), None),
            FileChange::new("README.md", None, Some("README.md".into())),
        ];
        // src, main, a, old
        assert_eq!(distinct_directories(&files), 4);
    }

    #[test]
    fn test_distinct_packages_ignore_missing() {
        let files = vec![
            FileChange::new("A.java", None, None).with_package(Some("core".into())),
            FileChange::new("B.java", None, None).with_package(Some("core".into())),
            FileChange::new("C.java", None, None).with_package(Some("util".into())),
            FileChange::new("pom.xml", None, None),
        ];
        assert_eq!(distinct_packages(&files), 2);
    }
}
