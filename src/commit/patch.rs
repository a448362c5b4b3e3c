//! Bounded, human-readable summaries of unified-diff patches.
//!
//! The hosting API hands us each file's patch as unified-diff text. We only
//! describe its hunks (line ranges and the kind of each changed line); the
//! content itself is left for the LLM prompt to carry elsewhere.

use std::fmt;

use thiserror::Error;
use tracing::debug;

/// At most this many hunks are rendered per file.
pub const MAX_HUNKS: usize = 3;

/// Characters of raw patch kept when the patch cannot be parsed.
pub const RAW_EXCERPT_CHARS: usize = 500;

pub const NO_PATCH: &str = "No patch available.";
pub const EMPTY_PATCH: &str = "Empty patch.";

/// Kind of a single line inside a hunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOp {
    Context,
    Add,
    Delete,
}

impl fmt::Display for LineOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineOp::Context => write!(f, "context"),
            LineOp::Add => write!(f, "add"),
            LineOp::Delete => write!(f, "delete"),
        }
    }
}

/// An inclusive line range on one side of a hunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: u32,
    pub count: u32,
}

impl LineRange {
    /// Last line covered. Empty ranges (count 0) end where they start.
    pub fn end(&self) -> u32 {
        self.start.saturating_add(self.count.saturating_sub(1))
    }
}

/// A parsed hunk: source range, destination range, and its line operations in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    pub source: LineRange,
    pub destination: LineRange,
    pub ops: Vec<LineOp>,
}

impl Hunk {
    fn render(&self) -> String {
        let ops = self
            .ops
            .iter()
            .map(LineOp::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "Chunk: Lines {}-{} -> {}-{}. Changes: {}",
            self.source.start,
            self.source.end(),
            self.destination.start,
            self.destination.end(),
            ops
        )
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PatchParseError {
    #[error("malformed hunk header on line {line}: {text}")]
    BadHeader { line: usize, text: String },

    #[error("unexpected line {line} inside hunk: {text}")]
    UnexpectedLine { line: usize, text: String },
}

/// Summarize a file patch for the analysis record.
///
/// Never fails: patches that cannot be parsed degrade to a raw excerpt.
pub fn summarize(patch: Option<&str>) -> String {
    let patch = match patch {
        Some(p) if !p.is_empty() => p,
        _ => return NO_PATCH.to_string(),
    };

    match parse_hunks(patch) {
        Ok(hunks) if hunks.is_empty() => EMPTY_PATCH.to_string(),
        Ok(hunks) => hunks
            .iter()
            .take(MAX_HUNKS)
            .map(Hunk::render)
            .collect::<Vec<_>>()
            .join("; "),
        Err(e) => {
            debug!("Falling back to raw patch excerpt: {e}");
            raw_excerpt(patch)
        }
    }
}

fn raw_excerpt(patch: &str) -> String {
    let excerpt: String = patch.chars().take(RAW_EXCERPT_CHARS).collect();
    format!("Raw patch snippet: {excerpt}...")
}

/// Parse unified-diff text into hunks.
///
/// File header lines (`diff --git`, `index`, `---`, `+++`, mode and rename
/// lines) before or between hunks are skipped. Inside a hunk, every line must
/// be context, an addition, a deletion, or a `\ No newline` marker until the
/// header's line counts are used up. Patches truncated mid-hunk are accepted.
pub fn parse_hunks(patch: &str) -> Result<Vec<Hunk>, PatchParseError> {
    let mut hunks: Vec<Hunk> = Vec::new();
    // Remaining (source, destination) lines of the current hunk.
    let mut remaining: Option<(u32, u32)> = None;

    for (idx, line) in patch.lines().enumerate() {
        let line_no = idx + 1;

        if line.starts_with("@@") {
            let (source, destination) =
                parse_hunk_header(line).ok_or_else(|| PatchParseError::BadHeader {
                    line: line_no,
                    text: line.to_string(),
                })?;
            remaining = Some((source.count, destination.count));
            hunks.push(Hunk {
                source,
                destination,
                ops: Vec::new(),
            });
            continue;
        }

        let Some((old_left, new_left)) = remaining else {
            // Outside a hunk: file headers and anything else are not ours to describe.
            continue;
        };

        if old_left == 0 && new_left == 0 {
            remaining = None;
            continue;
        }

        if line.starts_with('\\') {
            continue;
        }

        let op = match line.chars().next() {
            Some('+') => LineOp::Add,
            Some('-') => LineOp::Delete,
            // Some tools strip the single space from blank context lines.
            Some(' ') | None => LineOp::Context,
            Some(_) => {
                return Err(PatchParseError::UnexpectedLine {
                    line: line_no,
                    text: line.to_string(),
                });
            }
        };

        let (old_left, new_left) = match op {
            LineOp::Add => (old_left, new_left.saturating_sub(1)),
            LineOp::Delete => (old_left.saturating_sub(1), new_left),
            LineOp::Context => (old_left.saturating_sub(1), new_left.saturating_sub(1)),
        };
        remaining = Some((old_left, new_left));

        if let Some(hunk) = hunks.last_mut() {
            hunk.ops.push(op);
        }
    }

    Ok(hunks)
}

/// Parse `@@ -a[,b] +c[,d] @@[ section]` into its two ranges.
fn parse_hunk_header(line: &str) -> Option<(LineRange, LineRange)> {
    let rest = line.strip_prefix("@@ ")?;
    let end = rest.find(" @@")?;
    let mut ranges = rest[..end].split_whitespace();

    let source = parse_range(ranges.next()?.strip_prefix('-')?)?;
    let destination = parse_range(ranges.next()?.strip_prefix('+')?)?;

    if ranges.next().is_some() {
        return None;
    }

    Some((source, destination))
}

fn parse_range(value: &str) -> Option<LineRange> {
    let mut parts = value.splitn(2, ',');
    let start = parts.next()?.parse::<u32>().ok()?;
    let count = match parts.next() {
        Some(c) => c.parse::<u32>().ok()?,
        None => 1,
    };
    // A range whose last line does not fit in u32 is not a real header.
    start.checked_add(count.saturating_sub(1))?;
    Some(LineRange { start, count })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_patch() {
        assert_eq!(summarize(None), NO_PATCH);
        assert_eq!(summarize(Some("")), NO_PATCH);
    }

    #[test]
    fn test_single_hunk_rendering() {
        let patch = "@@ -10,3 +10,4 @@ fn main() {\n   let a = 1;\n-  let b = 2;\n+  let b = 3;\n+  let c = 4;\n   a + b\n";
        assert_eq!(
            summarize(Some(patch)),
            "Chunk: Lines 10-12 -> 10-13. Changes: context, delete, add, add, context"
        );
    }

    #[test]
    fn test_header_with_trailing_section_text() {
        let patch = "@@ -1 +1 @@ console.log(\"Updated\");";
        assert_eq!(
            summarize(Some(patch)),
            "Chunk: Lines 1-1 -> 1-1. Changes: "
        );
    }

    #[test]
    fn test_new_file_range_starts_at_zero() {
        let patch = "@@ -0,0 +1,2 @@\n+line one\n+line two";
        assert_eq!(
            summarize(Some(patch)),
            "Chunk: Lines 0-0 -> 1-2. Changes: add, add"
        );
    }

    #[test]
    fn test_at_most_three_hunks_rendered() {
        let patch = (1..=5)
            .map(|i| format!("@@ -{i}0,1 +{i}0,1 @@\n-old{i}\n+new{i}"))
            .collect::<Vec<_>>()
            .join("\n");

        let summary = summarize(Some(&patch));
        assert_eq!(summary.matches("Chunk:").count(), MAX_HUNKS);
        assert!(summary.contains("Lines 30-30"));
        assert!(!summary.contains("Lines 40-40"));
        assert_eq!(summary.matches("; ").count(), MAX_HUNKS - 1);
    }

    #[test]
    fn test_patch_without_hunks_is_empty() {
        assert_eq!(summarize(Some("Binary files differ")), EMPTY_PATCH);
    }

    #[test]
    fn test_skips_file_headers() {
        let patch = "diff --git a/x b/x\nindex 123..456 100644\n--- a/x\n+++ b/x\n@@ -1,2 +1,2 @@\n-a\n+b\n c";
        let hunks = parse_hunks(patch).unwrap();
        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].ops, vec![LineOp::Delete, LineOp::Add, LineOp::Context]);
    }

    #[test]
    fn test_no_newline_marker_ignored() {
        let patch = "@@ -1 +1 @@\n-a\n\\ No newline at end of file\n+b\n\\ No newline at end of file";
        let hunks = parse_hunks(patch).unwrap();
        assert_eq!(hunks[0].ops, vec![LineOp::Delete, LineOp::Add]);
    }

    #[test]
    fn test_malformed_header_falls_back_to_excerpt() {
        let patch = "@@ this is not a header @@\n+x";
        assert!(matches!(
            parse_hunks(patch),
            Err(PatchParseError::BadHeader { line: 1, .. })
        ));
        assert_eq!(summarize(Some(patch)), format!("Raw patch snippet: {patch}..."));
    }

    #[test]
    fn test_unexpected_line_inside_hunk_falls_back() {
        let patch = "@@ -10,2 +10,5 @@ function example() {\n-  old();\n+  new();\n}";
        assert!(matches!(
            parse_hunks(patch),
            Err(PatchParseError::UnexpectedLine { line: 4, .. })
        ));
        assert!(summarize(Some(patch)).starts_with("Raw patch snippet: @@ -10,2"));
    }

    #[test]
    fn test_raw_excerpt_is_truncated_to_500_chars() {
        let patch = format!("@@ broken @@\n{}", "x".repeat(2000));
        let summary = summarize(Some(&patch));
        let excerpt = summary
            .strip_prefix("Raw patch snippet: ")
            .and_then(|s| s.strip_suffix("..."))
            .unwrap();
        assert_eq!(excerpt.chars().count(), RAW_EXCERPT_CHARS);
    }

    #[test]
    fn test_raw_excerpt_respects_char_boundaries() {
        let patch = format!("@@ broken @@\n{}", "é".repeat(600));
        let summary = summarize(Some(&patch));
        assert!(summary.ends_with("..."));
    }

    #[test]
    fn test_never_returns_empty_for_arbitrary_input() {
        for input in ["", "@@", "@@ -1 +1", "+++", "\n\n\n", "@@ -a,b +c,d @@", "random text"] {
            assert!(!summarize(Some(input)).is_empty(), "empty summary for {input:?}");
        }
    }

    #[test]
    fn test_line_range_end() {
        assert_eq!(LineRange { start: 5, count: 3 }.end(), 7);
        assert_eq!(LineRange { start: 5, count: 0 }.end(), 5);
        assert_eq!(LineRange { start: u32::MAX, count: 9 }.end(), u32::MAX);
    }

    #[test]
    fn test_ranges_past_u32_fall_back_to_excerpt() {
        for patch in [
            "@@ -4294967295,2 +1,1 @@\n-a\n-b\n+c",
            "@@ -1,1 +4294967295,3 @@\n-a\n+b\n+c\n+d",
        ] {
            assert!(matches!(
                parse_hunks(patch),
                Err(PatchParseError::BadHeader { line: 1, .. })
            ));
            assert!(summarize(Some(patch)).starts_with("Raw patch snippet: "));
        }
    }

    #[test]
    fn test_range_ending_exactly_at_u32_max_is_accepted() {
        let patch = "@@ -4294967295 +4294967294,2 @@\n-a\n+b\n+c";
        assert_eq!(
            summarize(Some(patch)),
            "Chunk: Lines 4294967295-4294967295 -> 4294967294-4294967295. Changes: delete, add, add"
        );
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_summary_never_empty(s in "\\PC{0,300}") {
                prop_assert!(!summarize(Some(&s)).is_empty());
            }

            #[test]
            fn test_summary_bounded_to_three_hunks(s in "(@@ -[0-9]{1,3},[0-9] \\+[0-9]{1,3},[0-9] @@\n[-+ ][a-z]{0,5}\n){0,8}") {
                prop_assert!(summarize(Some(&s)).matches("Chunk:").count() <= MAX_HUNKS);
            }

            #[test]
            fn test_any_u32_header_is_handled(
                src_start in any::<u32>(),
                src_count in any::<u32>(),
                dst_start in any::<u32>(),
                dst_count in any::<u32>(),
            ) {
                let patch = format!("@@ -{src_start},{src_count} +{dst_start},{dst_count} @@\n-a\n+b");
                let summary = summarize(Some(&patch));
                let fits = |start: u32, count: u32| start.checked_add(count.saturating_sub(1)).is_some();
                if fits(src_start, src_count) && fits(dst_start, dst_count) {
                    prop_assert!(summary.starts_with("Chunk: Lines "), "{}", summary);
                } else {
                    prop_assert!(summary.starts_with("Raw patch snippet: "), "{}", summary);
                }
            }
        }
    }
}
