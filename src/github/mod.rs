//! GitHub API operations using octocrab.

pub mod auth;
pub mod contents;
pub mod diff;

use octocrab::Octocrab;

use crate::error::GitHubError;

pub use auth::get_github_token;
pub use contents::GitHubContentStore;
pub use diff::{Acquisition, CommitDiff, DiffSource, GitHubDiffSource, JsonFileDiffSource};

/// Build an authenticated client for the public GitHub API.
pub fn build_client(token: &str) -> Result<Octocrab, GitHubError> {
    Octocrab::builder()
        .personal_token(token.to_string())
        .build()
        .map_err(|e| GitHubError::FetchDiff(Box::new(e)))
}

/// HTTP status carried by a GitHub API error response, if any.
pub(crate) fn status_code(err: &octocrab::Error) -> Option<u16> {
    match err {
        octocrab::Error::GitHub { source, .. } => Some(source.status_code.as_u16()),
        _ => None,
    }
}

/// Split `owner/repo` into its parts.
pub fn parse_repository(full_name: &str) -> Option<(String, String)> {
    let (owner, repo) = full_name.trim().split_once('/')?;
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return None;
    }
    Some((owner.to_string(), repo.to_string()))
}
