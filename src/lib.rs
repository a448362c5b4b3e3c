//! papertrail - LLM-written commit summaries for every push.
//!
//! # Overview
//!
//! papertrail runs as a CI step on each push. It fetches the pushed commit's
//! changed files from GitHub, condenses them into an analysis record, asks a
//! text-generation service (or an offline stub) for a commit message and a
//! one-line summary, and appends both to a Markdown log in the repository.
//! Alternatively it amends the pushed commit's message and force-pushes it.

pub mod commit;
pub mod config;
pub mod error;
pub mod git;
pub mod github;
pub mod llm;
pub mod output;
pub mod papertrail;
pub mod run;

// Re-export commonly used types
pub use commit::{AnalysisRecord, ChangedFile, CommitMeta, GeneratedText, GenerationMode};
pub use config::ActionContext;
pub use error::{
    AmendError, GenerationError, GitHubError, InputError, LlmError, PapertrailError, RunError,
    StoreError,
};
pub use run::{Pipeline, RunOutcome, Sink};
