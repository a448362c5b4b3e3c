//! Papertrail section formatting.

use chrono::{DateTime, Utc};

/// Content of a papertrail file that does not exist yet.
pub const DEFAULT_HEADER: &str = "# Papertrail\n\nThis file tracks commit summaries and details.";

/// First seven characters of a commit sha.
pub fn short_sha(sha: &str) -> &str {
    match sha.char_indices().nth(7) {
        Some((idx, _)) => &sha[..idx],
        None => sha,
    }
}

/// Minute-precision, space-separated UTC timestamp.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M").to_string()
}

/// The commit's own timestamp when known, otherwise now.
pub fn entry_timestamp(commit_timestamp: Option<DateTime<Utc>>) -> DateTime<Utc> {
    commit_timestamp.unwrap_or_else(Utc::now)
}

/// Render the section appended for one commit, including its leading separator.
pub fn format_section(sha: &str, timestamp: &str, summary: &str, message: &str) -> String {
    format!(
        "\n\n## Commit {} ({timestamp})\n\n**Summary:** {summary}\n\n**Details:** {message}\n\n---",
        short_sha(sha)
    )
}

/// Commit message for the contents-API update.
pub fn update_commit_message(sha: &str) -> String {
    format!("Append analysis for commit {}", short_sha(sha))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_short_sha() {
        assert_eq!(short_sha("abc1234567890abcdef"), "abc1234");
        assert_eq!(short_sha("abc"), "abc");
    }

    #[test]
    fn test_timestamp_is_minute_precision() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 59).unwrap();
        assert_eq!(format_timestamp(ts), "2024-03-09 14:05");
    }

    #[test]
    fn test_entry_timestamp_prefers_commit_time() {
        let ts = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(entry_timestamp(Some(ts)), ts);
        assert!(entry_timestamp(None) > ts);
    }

    #[test]
    fn test_section_layout() {
        let section = format_section(
            "abc1234567890",
            "2024-03-09 14:05",
            "Adds a parser.",
            "Introduces a parser. [Clear]",
        );
        assert_eq!(
            section,
            "\n\n## Commit abc1234 (2024-03-09 14:05)\n\n**Summary:** Adds a parser.\n\n**Details:** Introduces a parser. [Clear]\n\n---"
        );
    }

    #[test]
    fn test_update_commit_message() {
        assert_eq!(
            update_commit_message("abc1234567890"),
            "Append analysis for commit abc1234"
        );
    }
}
