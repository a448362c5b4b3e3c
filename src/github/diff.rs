//! Changed-file acquisition: single-commit lookup, range comparison, or a JSON file.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use octocrab::Octocrab;
use serde::Deserialize;
use tracing::{debug, info};

use crate::commit::{ChangedFile, CommitMeta};
use crate::error::GitHubError;

use super::status_code;

/// How the changed files of a push are obtained from the hosting API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Acquisition {
    /// Compare `before...sha` when a usable before-sha exists, else look up the commit.
    #[default]
    Auto,
    /// Look up the head commit alone.
    Commit,
    /// Compare the before-sha with the head commit.
    Compare,
}

/// Changed files of the head commit plus the metadata the pipeline needs.
#[derive(Debug, Clone, Default)]
pub struct CommitDiff {
    pub files: Vec<ChangedFile>,
    pub meta: CommitMeta,
    pub message: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// A source of changed files for one commit.
#[async_trait]
pub trait DiffSource: Send + Sync {
    async fn fetch(&self) -> Result<CommitDiff, GitHubError>;
}

#[derive(Debug, Deserialize)]
struct ParentRef {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct GitActor {
    #[serde(default)]
    date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    committer: Option<GitActor>,
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
    sha: String,
    #[serde(default)]
    parents: Vec<ParentRef>,
    commit: CommitDetail,
    #[serde(default)]
    files: Vec<ChangedFile>,
}

#[derive(Debug, Deserialize)]
struct CompareResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    total_commits: u64,
    #[serde(default)]
    commits: Vec<CommitResponse>,
    #[serde(default)]
    files: Vec<ChangedFile>,
}

/// A before-sha worth comparing against. Branch-creating pushes report all zeros.
pub fn usable_base(before: Option<&str>) -> Option<&str> {
    before
        .map(str::trim)
        .filter(|b| !b.is_empty() && !b.chars().all(|c| c == '0'))
}

/// Changed files fetched from the GitHub REST API.
pub struct GitHubDiffSource {
    client: Octocrab,
    owner: String,
    repo: String,
    head: String,
    base: Option<String>,
    acquisition: Acquisition,
}

impl GitHubDiffSource {
    pub fn new(
        client: Octocrab,
        owner: &str,
        repo: &str,
        head: &str,
        base: Option<&str>,
        acquisition: Acquisition,
    ) -> Self {
        Self {
            client,
            owner: owner.to_string(),
            repo: repo.to_string(),
            head: head.to_string(),
            base: base.map(str::to_string),
            acquisition,
        }
    }

    async fn fetch_commit(&self) -> Result<CommitDiff, GitHubError> {
        let route = format!("/repos/{}/{}/commits/{}", self.owner, self.repo, self.head);
        debug!("Fetching commit {}", self.head);

        let commit: CommitResponse = self
            .client
            .get(route, None::<&()>)
            .await
            .map_err(|e| self.map_error(e, Route::Commit(&self.head)))?;

        info!("Commit {} changed {} files", commit.sha, commit.files.len());

        Ok(CommitDiff {
            meta: meta_of(&commit),
            message: commit.commit.message.clone(),
            timestamp: commit.commit.committer.as_ref().and_then(|c| c.date),
            files: commit.files,
        })
    }

    async fn fetch_compare(&self, base: &str) -> Result<CommitDiff, GitHubError> {
        let basehead = format!("{}...{}", base, self.head);
        let route = format!("/repos/{}/{}/compare/{}", self.owner, self.repo, basehead);
        debug!("Comparing {basehead}");

        let compare: CompareResponse = self
            .client
            .get(route, None::<&()>)
            .await
            .map_err(|e| self.map_error(e, Route::Compare(&basehead)))?;

        info!(
            "Compared {basehead}: {} files, {} commits, status={}",
            compare.files.len(),
            compare.total_commits,
            compare.status.as_deref().unwrap_or("unknown")
        );

        let head_commit = compare
            .commits
            .iter()
            .find(|c| c.sha == self.head)
            .or_else(|| compare.commits.last());

        Ok(CommitDiff {
            meta: head_commit.map(meta_of).unwrap_or_default(),
            message: head_commit.and_then(|c| c.commit.message.clone()),
            timestamp: head_commit
                .and_then(|c| c.commit.committer.as_ref())
                .and_then(|c| c.date),
            files: compare.files,
        })
    }

    fn map_error(&self, e: octocrab::Error, route: Route<'_>) -> GitHubError {
        let display = e.to_string().to_lowercase();
        let reference = match route {
            Route::Commit(r) | Route::Compare(r) => r,
        };
        match status_code(&e) {
            Some(403) | Some(429) if display.contains("rate limit") => GitHubError::RateLimited {
                reset_time: "unknown".to_string(),
            },
            // The compare route answers 404 when either end of the range is unknown.
            Some(404) if matches!(route, Route::Compare(_)) => {
                GitHubError::CommitNotFound(reference.to_string())
            }
            Some(404) => GitHubError::RepositoryNotFound {
                owner: self.owner.clone(),
                repo: self.repo.clone(),
            },
            Some(422) => GitHubError::CommitNotFound(reference.to_string()),
            _ => GitHubError::FetchDiff(Box::new(e)),
        }
    }
}

/// The request a GitHub error came from, with the reference it named.
#[derive(Clone, Copy)]
enum Route<'a> {
    Commit(&'a str),
    Compare(&'a str),
}

fn meta_of(commit: &CommitResponse) -> CommitMeta {
    CommitMeta {
        parents: commit.parents.iter().map(|p| p.sha.clone()).collect(),
    }
}

#[async_trait]
impl DiffSource for GitHubDiffSource {
    async fn fetch(&self) -> Result<CommitDiff, GitHubError> {
        let base = self.base.as_deref().and_then(|b| usable_base(Some(b)));
        match (self.acquisition, base) {
            (Acquisition::Commit, _) | (Acquisition::Auto, None) => self.fetch_commit().await,
            (Acquisition::Compare, Some(base)) | (Acquisition::Auto, Some(base)) => {
                self.fetch_compare(base).await
            }
            (Acquisition::Compare, None) => {
                debug!("No usable before-sha to compare against; looking up the commit");
                self.fetch_commit().await
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FilesDocument {
    Bare(Vec<ChangedFile>),
    WithParents {
        files: Vec<ChangedFile>,
        #[serde(default)]
        parents: Vec<serde_json::Value>,
    },
}

/// Changed files read from a local JSON document.
///
/// Accepts either an array of changed files or `{"files": [...], "parents": [...]}`.
pub struct JsonFileDiffSource {
    path: PathBuf,
}

impl JsonFileDiffSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

fn parent_id(value: &serde_json::Value) -> String {
    value
        .get("sha")
        .and_then(|s| s.as_str())
        .or_else(|| value.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| value.to_string())
}

#[async_trait]
impl DiffSource for JsonFileDiffSource {
    async fn fetch(&self) -> Result<CommitDiff, GitHubError> {
        let path = self.path.display().to_string();
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| GitHubError::ReadFiles {
                path: path.clone(),
                source,
            })?;

        let document: FilesDocument =
            serde_json::from_str(&raw).map_err(|e| GitHubError::InvalidFiles {
                path,
                reason: e.to_string(),
            })?;

        let (files, parents) = match document {
            FilesDocument::Bare(files) => (files, Vec::new()),
            FilesDocument::WithParents { files, parents } => {
                (files, parents.iter().map(parent_id).collect())
            }
        };

        Ok(CommitDiff {
            files,
            meta: CommitMeta { parents },
            ..Default::default()
        })
    }
}
