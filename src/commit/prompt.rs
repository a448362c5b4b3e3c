//! Prompt construction for LLM-written commit messages.

use crate::commit::analysis::AnalysisRecord;

/// Build the instruction sent to the text-generation service.
///
/// Embeds the full analysis record as JSON and asks for a strict
/// `{"message", "summary"}` object in reply.
pub fn build_message_prompt(analysis: &AnalysisRecord) -> String {
    let analysis_json = serde_json::to_string_pretty(analysis).unwrap_or_default();

    format!(
        r#"You are a helpful Git commit analyst. Based on the following commit analysis (files changed, per-file hunk summaries, and line statistics), generate:

1. A detailed commit message of 2-4 sentences explaining what was done, why, and any impacts. Keep it professional and specific. Do NOT use vague verbs such as "fixed" or "updated". End the message with a single adjective in square brackets that characterizes the change, for example [Robust].

2. A concise summary of exactly one sentence for a quick overview.

## Commit Analysis
{analysis_json}

## Output Format
Respond with ONLY a JSON object (no markdown, no explanation):
{{"message": "...", "summary": "..."}}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::analysis::{ChangedFile, CommitMeta, FileStatus, analyze};

    fn sample() -> AnalysisRecord {
        let files = vec![ChangedFile {
            filename: "src/parser.rs".into(),
            status: FileStatus::Modified,
            additions: 12,
            deletions: 3,
            patch: None,
        }];
        analyze(&files, &CommitMeta::default())
    }

    #[test]
    fn test_prompt_structure() {
        let prompt = build_message_prompt(&sample());

        assert!(prompt.contains("## Commit Analysis"));
        assert!(prompt.contains("## Output Format"));
        assert!(prompt.contains(r#"{"message": "...", "summary": "..."}"#));
        assert!(prompt.contains("2-4 sentences"));
        assert!(prompt.contains("square brackets"));
    }

    #[test]
    fn test_prompt_bans_vague_terms() {
        let prompt = build_message_prompt(&sample());
        assert!(prompt.contains(r#""fixed""#));
        assert!(prompt.contains(r#""updated""#));
    }

    #[test]
    fn test_prompt_embeds_full_record() {
        let prompt = build_message_prompt(&sample());
        assert!(prompt.contains("src/parser.rs"));
        assert!(prompt.contains(r#""isMerge": false"#));
        assert!(prompt.contains(r#""added": 12"#));
        assert!(prompt.contains("No patch available."));
    }
}
