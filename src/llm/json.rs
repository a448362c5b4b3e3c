//! Locating the JSON object inside a model reply.
//!
//! Models asked for "only JSON" still wrap it in markdown fences now and
//! then. This strips the wrapper; it does not repair invalid JSON.

/// Extract the JSON object from a reply that may be fenced or padded with prose.
///
/// Tries, in order:
/// 1. A ` ```json ... ``` ` fenced block
/// 2. A bare ` ``` ... ``` ` fenced block whose content starts with `{`
/// 3. The first balanced `{ ... }` span that parses as JSON
/// 4. The trimmed input unchanged, so the caller's parse error describes the real reply
pub fn extract_json(reply: &str) -> String {
    let trimmed = reply.trim();

    if let Some(start) = trimmed.find("```json")
        && let Some(end) = trimmed[start + 7..].find("```")
    {
        return trimmed[start + 7..start + 7 + end].trim().to_string();
    }

    if let Some(start) = trimmed.find("```")
        && let Some(end) = trimmed[start + 3..].find("```")
    {
        let inner = trimmed[start + 3..start + 3 + end].trim();
        if inner.starts_with('{') {
            return inner.to_string();
        }
    }

    if let Some(object) = find_json_object(trimmed) {
        return object;
    }

    trimmed.to_string()
}

fn find_json_object(text: &str) -> Option<String> {
    for (start, _) in text.match_indices('{') {
        if let Some(candidate) = balanced_span(&text[start..])
            && serde_json::from_str::<serde_json::Value>(candidate).is_ok()
        {
            return Some(candidate.to_string());
        }
    }
    None
}

/// The prefix of `text` up to the brace closing its opening `{`, string-literal aware.
fn balanced_span(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (idx, ch) in text.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[..=idx]);
                }
            }
            _ => {}
        }
    }

    None
}
