// src/model.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

/// A single file touched by a commit.
#[derive(Debug, Clone, PartialEq)]
pub struct FileChange {
    /// Base name, the identity used for co-change and experience matching
    pub name: String,
    /// `None` when the file was deleted
    pub new_path: Option<String>,
    /// `None` when the file was created
    pub old_path: Option<String>,
    pub diff: String,
    pub added_lines: u64,
    pub deleted_lines: u64,
    /// Line count after the change, `None` if the file no longer exists
    pub nloc: Option<u64>,
    pub package: Option<String>,
}

impl FileChange {
    pub fn new(name: impl Into<String>, new_path: Option<String>, old_path: Option<String>) -> Self {
        Self {
            name: name.into(),
            new_path,
            old_path,
            diff: String::new(),
            added_lines: 0,
            deleted_lines: 0,
            nloc: None,
            package: None,
        }
    }

    pub fn with_lines(mut self, added: u64, deleted: u64, nloc: Option<u64>) -> Self {
        self.added_lines = added;
        self.deleted_lines = deleted;
        self.nloc = nloc;
        self
    }

    pub fn with_diff(mut self, diff: impl Into<String>) -> Self {
        self.diff = diff.into();
        self
    }

    pub fn with_package(mut self, package: Option<String>) -> Self {
        self.package = package;
        self
    }

    pub fn changed_lines(&self) -> u64 {
        self.added_lines + self.deleted_lines
    }
}

/// One commit of first-parent history. Identity is the hash.
#[derive(Debug, Clone)]
pub struct Commit {
    pub hash: String,
    pub message: String,
    pub author: String,
    pub committer: String,
    pub date: DateTime<Utc>,
    pub total_lines: u64,
    pub total_files: u64,
    pub parent: Option<String>,
    pub is_target: bool,
    files: Vec<FileChange>,
    names: HashSet<String>,
}

impl Commit {
    pub fn new(
        hash: impl Into<String>,
        message: impl Into<String>,
        author: impl Into<String>,
        committer: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            hash: hash.into(),
            message: message.into(),
            author: author.into(),
            committer: committer.into(),
            date,
            total_lines: 0,
            total_files: 0,
            parent: None,
            is_target: false,
            files: Vec::new(),
            names: HashSet::new(),
        }
    }

    pub fn with_totals(mut self, total_lines: u64, total_files: u64) -> Self {
        self.total_lines = total_lines;
        self.total_files = total_files;
        self
    }

    pub fn with_parent(mut self, parent: Option<String>) -> Self {
        self.parent = parent;
        self
    }

    pub fn with_target(mut self, is_target: bool) -> Self {
        self.is_target = is_target;
        self
    }

    /// Attaches the file changes, keeping the first record per base name and
    /// ordering them by name, case-insensitively.
    pub fn with_files(mut self, files: impl IntoIterator<Item = FileChange>) -> Self {
        let mut names = HashSet::new();
        let mut kept: Vec<FileChange> = files
            .into_iter()
            .filter(|f| names.insert(f.name.clone()))
            .collect();
        kept.sort_by_key(|f| f.name.to_lowercase());
        self.files = kept;
        self.names = names;
        self
    }

    pub fn files(&self) -> &[FileChange] {
        &self.files
    }

    pub fn file(&self, name: &str) -> Option<&FileChange> {
        self.files.iter().find(|f| f.name == name)
    }

    pub fn touches(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// True if every name in `names` is among this commit's files.
    pub fn touches_all<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> bool {
        names.into_iter().all(|n| self.touches(n))
    }

    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|f| f.name.as_str())
    }
}

impl PartialEq for Commit {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for Commit {}

impl Hash for Commit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

/// Commit-level metrics of a target commit.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GeneralMetric {
    #[serde(rename = "NADEV")]
    pub nadev: usize,
    #[serde(rename = "NDDEV")]
    pub nddev: usize,
    #[serde(rename = "NCOMM")]
    pub ncomm: usize,
    #[serde(rename = "EXP")]
    pub exp: f64,
    #[serde(rename = "ND")]
    pub nd: usize,
    #[serde(rename = "NS")]
    pub ns: usize,
    #[serde(rename = "NF")]
    pub nf: u64,
    #[serde(rename = "FIX")]
    pub fix: bool,
    #[serde(rename = "CEXP")]
    pub cexp: usize,
    #[serde(rename = "REXP")]
    pub rexp: usize,
}

/// Metrics of one file touched by a target commit.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FileMetric {
    pub new_path: Option<String>,
    pub old_path: Option<String>,
    pub filename: String,
    /// Window commits touching the file, the target excluded
    #[serde(rename = "COMM")]
    pub comm: usize,
    #[serde(rename = "ADEV")]
    pub adev: usize,
    /// Authors touching the file up to and including the target
    #[serde(rename = "DDEV")]
    pub ddev: usize,
    #[serde(rename = "ADD")]
    pub add: f64,
    #[serde(rename = "DEL")]
    pub del: f64,
    #[serde(rename = "OWN")]
    pub own: f64,
    #[serde(rename = "MINOR")]
    pub minor: usize,
    #[serde(rename = "OEXP")]
    pub oexp: f64,
    #[serde(rename = "ENTROPY")]
    pub entropy: f64,
    #[serde(rename = "LA")]
    pub la: u64,
    #[serde(rename = "LD")]
    pub ld: u64,
    #[serde(rename = "NDEV")]
    pub ndev: usize,
    #[serde(rename = "NUC")]
    pub nuc: usize,
    #[serde(rename = "LT")]
    pub lt: u64,
    #[serde(rename = "AGE")]
    pub age: f64,
    #[serde(rename = "SEXP")]
    pub sexp: u64,
}

/// Everything computed for one target commit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommitMetrics {
    #[serde(rename = "refactor_hash")]
    pub hash: String,
    #[serde(rename = "refactor_msg")]
    pub message: String,
    #[serde(skip)]
    pub date: DateTime<Utc>,
    pub file_metrics: Vec<FileMetric>,
    pub general_metrics: GeneralMetric,
}
