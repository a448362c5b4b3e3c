//! Commit analysis and LLM-written commit text.

pub mod analysis;
pub mod message;
pub mod patch;
pub mod prompt;

pub use analysis::{
    AnalysisRecord, ChangedFile, CommitMeta, DiffStats, FileChangeSummary, FileStatus, analyze,
};
pub use message::{GeneratedText, GenerationMode, generate_commit_text};
pub use patch::summarize;
pub use prompt::build_message_prompt;
