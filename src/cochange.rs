// src/cochange.rs

//! Bounded co-change scan between consecutive target commits.
//!
//! The window for a target starts where the previous target sat and ends just
//! before the target itself. Files are matched by base name.

use crate::error::{MetricsError, Result};
use crate::model::Commit;
use std::collections::{BTreeMap, BTreeSet};

/// Per-file activity inside a window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileWindow {
    pub commits: usize,
    pub authors: BTreeSet<String>,
}

/// Result of scanning one window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoChangeWindow {
    /// Index of the target commit; the next window starts here
    pub target_index: usize,
    /// Window commits whose file set contains every file of the target
    pub co_changes: usize,
    pub authors: BTreeSet<String>,
    pub files: BTreeMap<String, FileWindow>,
}

impl CoChangeWindow {
    pub fn file(&self, name: &str) -> Option<&FileWindow> {
        self.files.get(name)
    }
}

/// Scans `history[start..]` up to `target`, which is never counted against itself.
pub fn scan_window(history: &[Commit], start: usize, target: &Commit) -> Result<CoChangeWindow> {
    let mut window = CoChangeWindow {
        files: target
            .file_names()
            .map(|n| (n.to_string(), FileWindow::default()))
            .collect(),
        ..Default::default()
    };

    for (index, commit) in history.iter().enumerate().skip(start) {
        if commit.hash == target.hash {
            window.target_index = index;
            return Ok(window);
        }

        if commit.touches_all(target.file_names()) {
            window.co_changes += 1;
            window.authors.insert(commit.author.clone());
        }

        for (name, file) in window.files.iter_mut() {
            if commit.touches(name) {
                file.commits += 1;
                file.authors.insert(commit.author.clone());
            }
        }
    }

    if history.iter().take(start).any(|c| c.hash == target.hash) {
        Err(MetricsError::TargetOutOfOrder { hash: target.hash.clone() })
    } else {
        Err(MetricsError::TargetNotInHistory { hash: target.hash.clone() })
    }
}

/// Keeps the window position across targets. Targets must arrive in
/// ascending date order, so the position only moves forward.
#[derive(Debug, Default)]
pub struct CoChangeScanner {
    cursor: usize,
}

impl CoChangeScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn scan(&mut self, history: &[Commit], target: &Commit) -> Result<CoChangeWindow> {
        let window = scan_window(history, self.cursor, target)?;
        self.cursor = window.target_index;
        Ok(window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FileChange;
    use chrono::{Duration, TimeZone, Utc};

    fn commit(i: i64, author: &str, files: &[&str]) -> Commit {
        let date = Utc.timestamp_opt(1_600_000_000, 0).unwrap() + Duration::days(i);
        Commit::new(format!("c{}", i), "msg", author, author, date)
            .with_files(files.iter().map(|f| FileChange::new(*f, Some(f.to_string()), None)))
    }

    fn history() -> Vec<Commit> {
        vec![
            commit(0, "alice", &["A.java", "B.java"]),
            commit(1, "bob", &["A.java"]),
            commit(2, "carol", &["A.java", "B.java", "C.java"]),
            commit(3, "dave", &["A.java", "B.java"]),
            commit(4, "erin", &["B.java"]),
            commit(5, "frank", &["A.java", "B.java"]),
        ]
    }

    #[test]
    fn test_superset_commits_are_counted() {
        let history = history();
        let window = scan_window(&history, 0, &history[3]).unwrap();
        assert_eq!(window.target_index, 3);
        assert_eq!(window.co_changes, 2);
        assert_eq!(
            window.authors.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["alice", "carol"]
        );
    }

    #[test]
    fn test_per_file_counts_include_partial_overlap() {
        let history = history();
        let window = scan_window(&history, 0, &history[3]).unwrap();
        let a = window.file("A.java").unwrap();
        assert_eq!(a.commits, 3);
        assert_eq!(a.authors.len(), 3);
        let b = window.file("B.java").unwrap();
        assert_eq!(b.commits, 2);
    }

    #[test]
    fn test_scanner_advances_to_target() {
        let history = history();
        let mut scanner = CoChangeScanner::new();
        let first = scanner.scan(&history, &history[3]).unwrap();
        assert_eq!(scanner.cursor(), 3);
        assert_eq!(first.co_changes, 2);

        // The previous target opens the next window.
        let second = scanner.scan(&history, &history[5]).unwrap();
        assert_eq!(scanner.cursor(), 5);
        assert_eq!(second.co_changes, 1);
        assert!(second.authors.contains("dave"));
    }

    #[test]
    fn test_wider_window_never_loses_matches() {
        let history = history();
        let target = &history[5];
        let mut previous = 0;
        for start in (0..=5).rev() {
            let count = scan_window(&history, start, target).unwrap().co_changes;
            assert!(count >= previous);
            previous = count;
        }
    }

    #[test]
    fn test_target_behind_cursor_is_out_of_order() {
        let history = history();
        let mut scanner = CoChangeScanner::new();
        scanner.scan(&history, &history[5]).unwrap();
        assert!(matches!(
            scanner.scan(&history, &history[3]),
            Err(MetricsError::TargetOutOfOrder { .. })
        ));
    }

    #[test]
    fn test_unknown_target_is_rejected() {
        let history = history();
        let stray = commit(99, "zed", &["A.java"]);
        assert!(matches!(
            scan_window(&history, 0, &stray),
            Err(MetricsError::TargetNotInHistory { .. })
        ));
    }
}
