//! Run context: where the pushed commit lives and what the push event says about it.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::error::InputError;
use crate::github::parse_repository;

/// The subset of a `push` event payload the pipeline uses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushEvent {
    #[serde(default)]
    pub before: Option<String>,
    #[serde(default)]
    pub head_commit: Option<HeadCommit>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HeadCommit {
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub message: Option<String>,
}

impl PushEvent {
    pub fn from_file(path: &Path) -> Result<Self, InputError> {
        let raw = std::fs::read_to_string(path).map_err(|e| InputError::EventPayload {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&raw).map_err(|e| InputError::EventPayload {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

/// Raw context values as given on the command line or by the Actions environment.
#[derive(Debug, Clone, Default)]
pub struct ContextInputs<'a> {
    pub repository: Option<&'a str>,
    pub sha: Option<&'a str>,
    pub git_ref: Option<&'a str>,
    pub event_path: Option<&'a Path>,
}

/// Resolved identity of the commit being processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionContext {
    pub owner: String,
    pub repo: String,
    pub sha: String,
    /// Branch name without `refs/heads/`, if the ref is a branch.
    pub branch: Option<String>,
    pub before: Option<String>,
    pub head_timestamp: Option<DateTime<Utc>>,
    pub head_message: Option<String>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// `refs/heads/main` → `main`. Tag and pull-request refs have no branch.
pub fn branch_from_ref(git_ref: &str) -> Option<String> {
    git_ref
        .strip_prefix("refs/heads/")
        .filter(|b| !b.is_empty())
        .map(str::to_string)
}

impl ActionContext {
    pub fn resolve(inputs: &ContextInputs<'_>) -> Result<Self, InputError> {
        let repository =
            non_empty(inputs.repository).ok_or(InputError::MissingContext("repository"))?;
        let (owner, repo) = parse_repository(repository)
            .ok_or_else(|| InputError::InvalidRepository(repository.to_string()))?;
        let sha = non_empty(inputs.sha).ok_or(InputError::MissingContext("sha"))?;

        let event = match inputs.event_path {
            Some(path) => PushEvent::from_file(path)?,
            None => PushEvent::default(),
        };
        let head = event.head_commit.unwrap_or_default();

        let context = Self {
            owner,
            repo,
            sha: sha.to_string(),
            branch: non_empty(inputs.git_ref).and_then(branch_from_ref),
            before: event.before.filter(|b| !b.is_empty()),
            head_timestamp: head.timestamp,
            head_message: head.message,
        };
        debug!("Context: {context:?}");
        Ok(context)
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}
