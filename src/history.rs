// src/history.rs

use crate::error::{MetricsError, Result};
use crate::model::{Commit, FileChange};
use crate::package::{declares_package, package_name};
use chrono::{DateTime, TimeZone, Utc};
use git2::{Delta, DiffDelta, DiffFindOptions, DiffOptions, Oid, Patch, Repository};
use indicatif::{ParallelProgressIterator, ProgressBar};
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// A file change whose package name is still to be resolved.
struct PendingFile {
    change: FileChange,
    source: Option<String>,
}

struct PendingCommit {
    commit: Commit,
    files: Vec<PendingFile>,
}

impl PendingCommit {
    fn resolve(self) -> Commit {
        let files = self.files.into_iter().map(|pending| {
            let package = pending.source.as_deref().and_then(package_name);
            pending.change.with_package(package)
        });
        self.commit.with_files(files)
    }
}

/// Loads the first-parent history of HEAD, oldest first. Commits whose hash
/// is in `targets` are flagged.
pub fn load_history(repo_path: &Path, targets: &HashSet<String>) -> Result<Vec<Commit>> {
    let repo = Repository::discover(repo_path)?;
    info!("Loading history of {}", repo_path.display());

    // 1. Collect the first-parent chain and walk it from the first commit
    let mut oids = Vec::new();
    let mut revwalk = repo.revwalk()?;
    revwalk.push_head()?;
    revwalk.simplify_first_parent()?;
    revwalk.set_sorting(git2::Sort::TIME)?;
    for oid in revwalk {
        oids.push(oid?);
    }
    oids.reverse();

    let bar = ProgressBar::new(oids.len() as u64);
    bar.set_message("Reading commits");

    // 2. Diff every commit against its first parent
    let mut pending = Vec::with_capacity(oids.len());
    for oid in &oids {
        pending.push(read_commit(&repo, *oid, targets)?);
        bar.inc(1);
    }
    bar.finish_with_message("History read");

    // 3. Resolve package names off the walk
    let resolve_bar = ProgressBar::new(pending.len() as u64);
    resolve_bar.set_message("Resolving packages");
    let mut commits: Vec<Commit> = pending
        .into_par_iter()
        .progress_with(resolve_bar)
        .map(PendingCommit::resolve)
        .collect();

    commits.sort_by_key(|c| c.date);
    info!(
        "Loaded {} commits, {} flagged",
        commits.len(),
        commits.iter().filter(|c| c.is_target).count()
    );
    Ok(commits)
}

fn read_commit(repo: &Repository, oid: Oid, targets: &HashSet<String>) -> Result<PendingCommit> {
    let commit = repo.find_commit(oid)?;
    let hash = oid.to_string();

    let parent = commit.parent(0).ok();
    let parent_tree = parent.as_ref().map(|p| p.tree()).transpose()?;
    let current_tree = commit.tree()?;

    let mut diff_opts = DiffOptions::new();
    diff_opts.include_untracked(false);
    diff_opts.ignore_filemode(true);
    let mut diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&current_tree), Some(&mut diff_opts))?;

    let mut find_opts = DiffFindOptions::new();
    find_opts.renames(true);
    diff.find_similar(Some(&mut find_opts))?;

    let stats = diff.stats()?;
    let mut files = Vec::with_capacity(diff.deltas().len());
    for idx in 0..diff.deltas().len() {
        let Some(delta) = diff.get_delta(idx) else {
            continue;
        };
        let Some(mut change) = describe_delta(&delta) else {
            continue;
        };

        if let Some(mut patch) = Patch::from_diff(&diff, idx)? {
            let (_, added, deleted) = patch.line_stats()?;
            let buf = patch.to_buf()?;
            change = change
                .with_lines(added as u64, deleted as u64, None)
                .with_diff(String::from_utf8_lossy(&buf));
        }

        let mut source = None;
        if change.new_path.is_some() {
            if let Ok(blob) = repo.find_blob(delta.new_file().id()) {
                change.nloc = Some(count_lines(blob.content()));
                if declares_package(&change.name) {
                    source = Some(String::from_utf8_lossy(blob.content()).into_owned());
                }
            }
        }
        files.push(PendingFile { change, source });
    }

    let author = commit.author();
    let committer = commit.committer();
    let date = author_date(&hash, author.when().seconds())?;

    let record = Commit::new(
        hash.clone(),
        commit.message().unwrap_or("").trim(),
        author.name().unwrap_or("Unknown"),
        committer.name().unwrap_or("Unknown"),
        date,
    )
    .with_totals((stats.insertions() + stats.deletions()) as u64, stats.files_changed() as u64)
    .with_parent(parent.map(|p| p.id().to_string()))
    .with_target(targets.contains(&hash));

    debug!(hash = %hash, files = files.len(), "read commit");
    Ok(PendingCommit { commit: record, files })
}

/// Base name and paths of a delta; `None` for entries without a path.
fn describe_delta(delta: &DiffDelta<'_>) -> Option<FileChange> {
    let old_path = delta.old_file().path().and_then(|p| p.to_str()).map(String::from);
    let new_path = delta.new_file().path().and_then(|p| p.to_str()).map(String::from);

    let (old_path, new_path) = match delta.status() {
        Delta::Added | Delta::Untracked => (None, new_path),
        Delta::Deleted => (old_path, None),
        _ => (old_path, new_path),
    };

    let name = new_path
        .as_deref()
        .or(old_path.as_deref())
        .and_then(|p| p.rsplit('/').next())
        .map(String::from)?;
    Some(FileChange::new(name, new_path, old_path))
}

fn author_date(hash: &str, seconds: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_opt(seconds, 0)
        .single()
        .ok_or_else(|| MetricsError::InvalidTimestamp {
            hash: hash.to_string(),
            seconds,
        })
}

fn count_lines(content: &[u8]) -> u64 {
    if content.is_empty() {
        return 0;
    }
    let newlines = content.iter().filter(|b| **b == b'\n').count() as u64;
    if content.ends_with(b"\n") {
        newlines
    } else {
        newlines + 1
    }
}
