//! One commit, start to finish: fetch → analyze → generate → append or amend.

use tracing::{debug, info};

use crate::commit::{AnalysisRecord, GeneratedText, GenerationMode, analyze, generate_commit_text};
use crate::config::ActionContext;
use crate::error::RunError;
use crate::git::{GitExecutor, amend_and_push};
use crate::github::DiffSource;
use crate::papertrail::{LogEntry, LogStore, append_entry_with_retry};

/// Where the generated text ends up.
pub enum Sink {
    /// Append a section to the papertrail file.
    Papertrail {
        store: Box<dyn LogStore>,
        path: String,
        conflict_retries: u32,
    },
    /// Rewrite the pushed commit's message and force-push the branch.
    Amend {
        git: Box<dyn GitExecutor>,
        remote: String,
        branch: String,
    },
    /// Render the section without writing anything.
    DryRun,
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub analysis: AnalysisRecord,
    pub text: GeneratedText,
    /// The Markdown section for this commit.
    pub section: String,
    /// Sha of the rewritten commit, in amend mode.
    pub amended_sha: Option<String>,
}

pub struct Pipeline {
    pub source: Box<dyn DiffSource>,
    pub generation: GenerationMode,
    pub sink: Sink,
}

impl Pipeline {
    /// Process the commit in `context`. Each stage runs once; nothing is rolled back.
    pub async fn run(&self, context: &ActionContext) -> Result<RunOutcome, RunError> {
        let diff = self.source.fetch().await?;
        debug!(
            "Fetched {} changed files ({} parents)",
            diff.files.len(),
            diff.meta.parents.len()
        );

        let analysis = analyze(&diff.files, &diff.meta);
        debug!("Analysis: {analysis:?}");

        let text = generate_commit_text(&analysis, &self.generation).await?;
        debug!("Generated message: {}", text.message);
        debug!("Generated summary: {}", text.summary);

        let entry = LogEntry {
            sha: &context.sha,
            message: &text.message,
            summary: &text.summary,
            timestamp: context.head_timestamp.or(diff.timestamp),
        };
        let section = entry.section();

        let amended_sha = match &self.sink {
            Sink::Papertrail {
                store,
                path,
                conflict_retries,
            } => {
                append_entry_with_retry(store.as_ref(), path, &entry, *conflict_retries).await?;
                None
            }
            Sink::Amend {
                git,
                remote,
                branch,
            } => Some(amend_and_push(
                git.as_ref(),
                &context.sha,
                &text.message,
                context.head_message.as_deref().or(diff.message.as_deref()),
                remote,
                branch,
            )?),
            Sink::DryRun => {
                info!("Dry run: nothing written");
                None
            }
        };

        Ok(RunOutcome {
            analysis,
            text,
            section,
            amended_sha,
        })
    }
}
