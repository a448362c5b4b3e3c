//! Error types for papertrail modules using thiserror.

use thiserror::Error;

use crate::llm::Provider;

/// Errors from missing or invalid run inputs.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("Missing required input: {0}")]
    MissingCredential(&'static str),

    #[error("Missing required context: {0}. Set it via flag or environment variable")]
    MissingContext(&'static str),

    #[error("Invalid repository '{0}', expected owner/repo")]
    InvalidRepository(String),

    #[error("Failed to read event payload {path}: {reason}")]
    EventPayload { path: String, reason: String },

    #[error(
        "Amend mode rewrites the pushed commit and force-pushes the branch. Pass --allow-force-push to confirm"
    )]
    ForcePushNotConfirmed,
}

/// Errors from GitHub API operations and other changed-file sources.
#[derive(Error, Debug)]
pub enum GitHubError {
    #[error(
        "GitHub authentication failed: no valid auth found. Pass --repo-token or set GITHUB_TOKEN environment variable"
    )]
    AuthenticationFailed,

    #[error("Failed to fetch diff: {0}")]
    FetchDiff(#[source] Box<octocrab::Error>),

    #[error("Rate limited by GitHub API. Resets at: {reset_time}")]
    RateLimited { reset_time: String },

    #[error("Repository not found: {owner}/{repo}")]
    RepositoryNotFound { owner: String, repo: String },

    #[error("Commit not found: {0}")]
    CommitNotFound(String),

    #[error("Failed to read changed files from {path}: {source}")]
    ReadFiles {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Changed files in {path} are not valid JSON: {reason}")]
    InvalidFiles { path: String, reason: String },
}

/// Provider-level failures from the text-generation service.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("{0} returned no text in its response")]
    EmptyResponse(Provider),

    #[error("could not parse reply as {{\"message\", \"summary\"}}: {0}")]
    MalformedResponse(String),

    #[error("request to {provider} failed: {source}")]
    RequestFailed {
        provider: Provider,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} API returned HTTP {status}: {body}")]
    ApiError {
        provider: Provider,
        status: u16,
        body: String,
    },
}

/// Message generation failure. Every provider cause is surfaced through this one type.
#[derive(Error, Debug)]
#[error("LLM generation failed: {0}")]
pub struct GenerationError(#[from] pub LlmError);

impl GenerationError {
    /// The provider-level cause.
    pub fn cause(&self) -> &LlmError {
        &self.0
    }
}

/// Errors from a papertrail backing store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("revision mismatch: the file changed since it was read")]
    Conflict,

    #[error("GitHub API error: {0}")]
    GitHub(#[source] Box<octocrab::Error>),

    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),

    #[error("stored content could not be decoded: {0}")]
    Decode(String),
}

/// Errors from appending to the papertrail file.
#[derive(Error, Debug)]
pub enum PapertrailError {
    #[error("Conflict updating {path}; possible concurrent edit. Retry or check branch.")]
    Conflict { path: String },

    #[error("File update failed: {0}")]
    UpdateFailed(String),
}

impl PapertrailError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, PapertrailError::Conflict { .. })
    }
}

/// Errors from the amend-and-push deployment mode.
#[derive(Error, Debug)]
pub enum AmendError {
    #[error("git {operation} failed: {stderr}")]
    GitFailed { operation: String, stderr: String },

    #[error("Failed to run git {operation}: {source}")]
    SpawnFailed {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Checked-out HEAD is {actual}, expected {expected}. Refusing to amend")]
    HeadMismatch { expected: String, actual: String },

    #[error("Force push failed: {0}")]
    PushFailed(String),
}

/// Any stage-level failure of a papertrail run.
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Fetch(#[from] GitHubError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Papertrail(#[from] PapertrailError),

    #[error(transparent)]
    Amend(#[from] AmendError),
}
