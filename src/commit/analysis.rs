//! Per-commit analysis: aggregate file statistics and patch summaries.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::commit::patch;

pub const NO_FILES_SUMMARY: &str = "No files changed in this commit.";

/// Status of a changed file as reported by the hosting API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Modified,
    Removed,
    Renamed,
    Copied,
    Changed,
    Unchanged,
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FileStatus::Added => "added",
            FileStatus::Modified => "modified",
            FileStatus::Removed => "removed",
            FileStatus::Renamed => "renamed",
            FileStatus::Copied => "copied",
            FileStatus::Changed => "changed",
            FileStatus::Unchanged => "unchanged",
        };
        f.write_str(s)
    }
}

fn default_status() -> FileStatus {
    FileStatus::Modified
}

/// A file changed by the commit, as supplied by the hosting API.
///
/// Missing `additions`/`deletions` default to 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFile {
    pub filename: String,
    #[serde(default = "default_status")]
    pub status: FileStatus,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
    #[serde(default)]
    pub patch: Option<String>,
}

/// Commit metadata the analyzer needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitMeta {
    /// Parent commit SHAs. More than one means a merge commit.
    pub parents: Vec<String>,
}

impl CommitMeta {
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }
}

/// Rendered description of one file's changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileChangeSummary {
    pub filename: String,
    pub status: FileStatus,
    pub changes: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffStats {
    pub added: u64,
    pub deleted: u64,
    pub total: usize,
}

/// The structured summary of a commit consumed by message generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    pub summary: String,
    pub files: Vec<FileChangeSummary>,
    pub stats: DiffStats,
    pub is_merge: bool,
}

impl AnalysisRecord {
    fn empty() -> Self {
        Self {
            summary: NO_FILES_SUMMARY.to_string(),
            files: Vec::new(),
            stats: DiffStats::default(),
            is_merge: false,
        }
    }

    /// Filenames in input order.
    pub fn filenames(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.filename.as_str()).collect()
    }
}

/// Analyze a commit's changed files.
///
/// File order is preserved. An empty file list yields the fixed
/// "no files changed" record regardless of `meta`.
pub fn analyze(files: &[ChangedFile], meta: &CommitMeta) -> AnalysisRecord {
    if files.is_empty() {
        return AnalysisRecord::empty();
    }

    let mut added = 0u64;
    let mut deleted = 0u64;

    let summaries: Vec<FileChangeSummary> = files
        .iter()
        .map(|file| {
            added += file.additions;
            deleted += file.deletions;
            FileChangeSummary {
                filename: file.filename.clone(),
                status: file.status,
                changes: format!(
                    "{} lines added, {} lines deleted. {}",
                    file.additions,
                    file.deletions,
                    patch::summarize(file.patch.as_deref())
                ),
            }
        })
        .collect();

    let is_merge = meta.is_merge();
    let merge_clause = if is_merge {
        "This is a merge commit. "
    } else {
        ""
    };
    let names = summaries
        .iter()
        .map(|f| f.filename.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    AnalysisRecord {
        summary: format!(
            "Commit changed {} files ({added} added, {deleted} deleted lines). {merge_clause}Files: {names}",
            files.len()
        ),
        files: summaries,
        stats: DiffStats {
            added,
            deleted,
            total: files.len(),
        },
        is_merge,
    }
}
