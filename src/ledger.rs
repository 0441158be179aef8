// src/ledger.rs

//! Whole-history accumulators.
//!
//! The ledger absorbs every commit of the history once, oldest first. Reading
//! it right after a target commit has been absorbed yields the statistics of
//! the history from its start through that target.

use crate::model::Commit;
use chrono::{DateTime, Duration, Utc};
use indexmap::IndexMap;
use std::collections::{BTreeSet, HashMap};

/// One developer's share of a file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Contribution {
    pub touches: u64,
    pub lines: u64,
}

/// Running statistics of one file, keyed by base name.
#[derive(Debug, Clone, Default)]
pub struct FileLedger {
    pub touch_dates: Vec<DateTime<Utc>>,
    /// Day gaps between consecutive touches; the first touch contributes 0
    pub gap_days: Vec<i64>,
    pub added_total: u64,
    pub deleted_total: u64,
    /// Insertion order is first-touch order
    pub contributors: IndexMap<String, Contribution>,
    /// Line count left by the most recent touch
    pub last_nloc: Option<u64>,
    /// Line count left by the touch before the most recent one
    pub prior_nloc: Option<u64>,
    /// Indices of the commits that touched the file
    pub commits: Vec<usize>,
    /// Latest touch's added and deleted lines
    pub last_added: u64,
    pub last_deleted: u64,
}

impl FileLedger {
    fn record(&mut self, index: usize, commit: &Commit, added: u64, deleted: u64, nloc: Option<u64>) {
        let gap = match self.touch_dates.last() {
            Some(previous) => (commit.date - *previous).num_days(),
            None => 0,
        };
        self.touch_dates.push(commit.date);
        self.gap_days.push(gap);

        self.added_total += added;
        self.deleted_total += deleted;
        self.last_added = added;
        self.last_deleted = deleted;

        let entry = self.contributors.entry(commit.author.clone()).or_default();
        entry.touches += 1;
        entry.lines += added + deleted;

        self.prior_nloc = self.last_nloc;
        self.last_nloc = nloc;
        self.commits.push(index);
    }

    pub fn touch_count(&self) -> usize {
        self.touch_dates.len()
    }

    pub fn line_volume(&self) -> u64 {
        self.contributors.values().map(|c| c.lines).sum()
    }

    /// The contributor with the most touches; ties go to the earliest one.
    pub fn dominant_contributor(&self) -> Option<(&str, &Contribution)> {
        let mut best: Option<(&str, &Contribution)> = None;
        for (name, contribution) in &self.contributors {
            match best {
                Some((_, b)) if contribution.touches <= b.touches => {}
                _ => best = Some((name.as_str(), contribution)),
            }
        }
        best
    }

    /// Contributors whose line share is below `threshold`.
    pub fn minor_contributors(&self, threshold: f64) -> usize {
        let volume = self.line_volume();
        if volume == 0 {
            return 0;
        }
        self.contributors
            .values()
            .filter(|c| (c.lines as f64 / volume as f64) < threshold)
            .count()
    }

    /// Mean of the inter-touch gaps in days, 0 when the file was never touched.
    pub fn mean_age_days(&self) -> f64 {
        if self.gap_days.is_empty() {
            return 0.0;
        }
        self.gap_days.iter().sum::<i64>() as f64 / self.gap_days.len() as f64
    }
}

/// Rolling per-author, per-committer and per-file accumulators.
#[derive(Debug, Default)]
pub struct HistoryLedger {
    absorbed: usize,
    author_lines: HashMap<String, u64>,
    committer_dates: HashMap<String, Vec<DateTime<Utc>>>,
    files: HashMap<String, FileLedger>,
    package_files: HashMap<(String, String), u64>,
}

impl HistoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of commits absorbed so far; also the index of the next one.
    pub fn absorbed(&self) -> usize {
        self.absorbed
    }

    /// Folds the next commit of the history into the accumulators.
    pub fn absorb(&mut self, commit: &Commit) {
        let index = self.absorbed;
        self.absorbed += 1;

        *self.author_lines.entry(commit.author.clone()).or_insert(0) += commit.total_lines;
        self.committer_dates
            .entry(commit.committer.clone())
            .or_default()
            .push(commit.date);

        for file in commit.files() {
            self.files.entry(file.name.clone()).or_default().record(
                index,
                commit,
                file.added_lines,
                file.deleted_lines,
                file.nloc,
            );
            if let Some(package) = &file.package {
                *self
                    .package_files
                    .entry((commit.author.clone(), package.clone()))
                    .or_insert(0) += 1;
            }
        }
    }

    /// Absorbs `history` up to and including `index`.
    pub fn absorb_through(&mut self, history: &[Commit], index: usize) {
        while self.absorbed <= index && self.absorbed < history.len() {
            self.absorb(&history[self.absorbed]);
        }
    }

    pub fn file(&self, name: &str) -> Option<&FileLedger> {
        self.files.get(name)
    }

    pub fn author_lines(&self, author: &str) -> u64 {
        self.author_lines.get(author).copied().unwrap_or(0)
    }

    pub fn total_author_lines(&self) -> u64 {
        self.author_lines.values().sum()
    }

    pub fn author_line_totals(&self) -> impl Iterator<Item = u64> + '_ {
        self.author_lines.values().copied()
    }

    pub fn committer_commits(&self, committer: &str) -> usize {
        self.committer_dates.get(committer).map_or(0, Vec::len)
    }

    /// The committer's commits no older than `window` before their latest one.
    pub fn recent_committer_commits(&self, committer: &str, window: Duration) -> usize {
        let Some(dates) = self.committer_dates.get(committer) else {
            return 0;
        };
        let Some(latest) = dates.iter().max() else {
            return 0;
        };
        let cutoff = *latest - window;
        dates.iter().filter(|d| **d >= cutoff).count()
    }

    /// Files of `author`'s commits that sit in `package`.
    pub fn same_package_files(&self, author: &str, package: &str) -> u64 {
        self.package_files
            .get(&(author.to_string(), package.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Authors of every absorbed commit whose file set contains all of `names`.
    pub fn cochange_authors<'h>(&self, history: &'h [Commit], names: &[&str]) -> BTreeSet<&'h str> {
        let absorbed = &history[..self.absorbed.min(history.len())];
        if names.is_empty() {
            return absorbed.iter().map(|c| c.author.as_str()).collect();
        }

        let mut postings = Vec::with_capacity(names.len());
        for name in names {
            match self.files.get(*name) {
                Some(file) => postings.push(&file.commits),
                None => return BTreeSet::new(),
            }
        }
        postings.sort_by_key(|p| p.len());
        let Some((shortest, rest)) = postings.split_first() else {
            return BTreeSet::new();
        };

        shortest
            .iter()
            .filter(|&&index| rest.iter().all(|p| p.binary_search(&index).is_ok()))
            .map(|&index| history[index].author.as_str())
            .collect()
    }
}
