//! Commit message and summary generation, stubbed or via an LLM provider.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::Deserialize;
use tracing::debug;

use crate::commit::analysis::AnalysisRecord;
use crate::commit::prompt::build_message_prompt;
use crate::error::{GenerationError, LlmError};
use crate::llm::extract_json;
use crate::llm::provider::{GenerationParams, TextGenerator};

/// Adjectives the stub appends in brackets.
pub const STUB_ADJECTIVES: [&str; 8] = [
    "Robust", "Swift", "Elegant", "Dynamic", "Stable", "Vivid", "Clear", "Bold",
];

/// Generated commit text. Both fields are non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GeneratedText {
    pub message: String,
    pub summary: String,
}

/// How commit text is produced.
pub enum GenerationMode {
    /// Offline, deterministic apart from the adjective. Never fails.
    Stub,
    /// One call to a text-generation service.
    Live {
        generator: Box<dyn TextGenerator>,
        params: GenerationParams,
    },
}

/// Generate the commit message and summary for an analysis record.
pub async fn generate_commit_text(
    analysis: &AnalysisRecord,
    mode: &GenerationMode,
) -> Result<GeneratedText, GenerationError> {
    match mode {
        GenerationMode::Stub => {
            let text = generate_stub(analysis, &mut rand::thread_rng());
            Ok(text)
        }
        GenerationMode::Live { generator, params } => {
            generate_live(analysis, generator.as_ref(), params).await
        }
    }
}

/// Compose stub text, picking the adjective with `rng`.
pub fn generate_stub<R: Rng + ?Sized>(analysis: &AnalysisRecord, rng: &mut R) -> GeneratedText {
    let adjective = STUB_ADJECTIVES.choose(rng).copied().unwrap_or("Clear");

    let files = if analysis.files.is_empty() {
        "no files".to_string()
    } else {
        analysis.filenames().join(", ")
    };

    GeneratedText {
        message: format!(
            "Modified files: {files}. Changes include {} additions and {} deletions. This update improves functionality. [{adjective}]",
            analysis.stats.added, analysis.stats.deleted
        ),
        summary: format!(
            "Updated {} files with {} additions.",
            analysis.stats.total, analysis.stats.added
        ),
    }
}

/// Ask the provider for a message and parse its single JSON reply.
pub async fn generate_live(
    analysis: &AnalysisRecord,
    generator: &dyn TextGenerator,
    params: &GenerationParams,
) -> Result<GeneratedText, GenerationError> {
    let prompt = build_message_prompt(analysis);
    debug!(
        provider = %generator.provider(),
        prompt_len = prompt.len(),
        "Requesting commit text"
    );

    let reply = generator
        .complete(&prompt, params)
        .await?
        .ok_or(LlmError::EmptyResponse(generator.provider()))?;

    Ok(parse_reply(&reply)?)
}

/// Parse a reply into [`GeneratedText`], rejecting blank fields.
pub fn parse_reply(reply: &str) -> Result<GeneratedText, LlmError> {
    let json = extract_json(reply);
    let text: GeneratedText = serde_json::from_str(&json).map_err(|e| {
        debug!("Raw reply: {reply}");
        LlmError::MalformedResponse(e.to_string())
    })?;

    if text.message.trim().is_empty() {
        return Err(LlmError::MalformedResponse("`message` is empty".to_string()));
    }
    if text.summary.trim().is_empty() {
        return Err(LlmError::MalformedResponse("`summary` is empty".to_string()));
    }

    Ok(GeneratedText {
        message: text.message.trim().to_string(),
        summary: text.summary.trim().to_string(),
    })
}
