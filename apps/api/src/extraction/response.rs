//! Reduces raw model text to a `ResumeData`.
//!
//! Model replies are often wrapped in code fences, surrounded by prose, or
//! carry trailing commas. This is a small repair pipeline, not a schema
//! validator: fences, brace-balanced extraction, trailing commas, parse, and
//! one aggressive retry.

use serde_json::Value;
use tracing::{debug, warn};

use super::{ExtractionError, MALFORMED_RESPONSE_MESSAGE};
use crate::models::resume::ResumeData;

/// Parses and normalizes a raw model reply.
pub fn parse_resume(raw: &str) -> Result<ResumeData, ExtractionError> {
    let value = parse_json_object(raw)?;
    normalize(value)
}

/// Runs the repair pipeline and returns the first JSON object found.
pub fn parse_json_object(raw: &str) -> Result<Value, ExtractionError> {
    let candidate = remove_trailing_commas(extract_object(strip_json_fences(raw)).trim());

    let value = match serde_json::from_str::<Value>(&candidate) {
        Ok(value) => value,
        Err(first) => {
            debug!("Model reply did not parse ({first}); trying aggressive cleanup");
            let Some(cleaned) = trim_to_braces(&candidate) else {
                warn!("Model reply could not be reduced to JSON: {first}");
                return Err(malformed());
            };
            serde_json::from_str::<Value>(cleaned).map_err(|e| {
                warn!("Model reply could not be reduced to JSON: {e}");
                malformed()
            })?
        }
    };

    if !value.is_object() {
        warn!("Model reply parsed to a non-object JSON value");
        return Err(malformed());
    }
    Ok(value)
}

/// Maps a parsed object onto `ResumeData`: missing or non-array lists become
/// empty, missing or empty scalars become absent, numbers become text.
pub fn normalize(value: Value) -> Result<ResumeData, ExtractionError> {
    let mut data: ResumeData = serde_json::from_value(value).map_err(|e| {
        warn!("Model reply has an unusable shape: {e}");
        malformed()
    })?;
    // A fresh extraction never carries editor state.
    data.custom_elements.clear();
    Ok(data)
}

fn malformed() -> ExtractionError {
    ExtractionError::MalformedResponse(MALFORMED_RESPONSE_MESSAGE.to_string())
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

/// Returns the first `{` through its matching `}`.
///
/// Braces inside string literals do not count toward depth. When the object
/// never closes, falls back to the span from the first `{` to the last `}`,
/// and when there is no `{` at all, returns the input unchanged.
pub fn extract_object(text: &str) -> &str {
    let Some(start) = text.find('{') else {
        return text;
    };

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return &text[start..start + offset + 1];
                }
            }
            _ => {}
        }
    }

    match text.rfind('}') {
        Some(end) if end > start => &text[start..=end],
        _ => text,
    }
}

/// Drops commas that directly precede `}` or `]`, ignoring string contents.
pub fn remove_trailing_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            out.push(c);
            continue;
        }
        if c == '"' {
            in_string = true;
        } else if c == ',' {
            let next = chars[i + 1..].iter().find(|n| !n.is_whitespace());
            if matches!(next, Some('}') | Some(']')) {
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Removes everything before the first `{` and after the last `}`.
/// `None` when that changes nothing, so the retry is skipped.
fn trim_to_braces(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    let trimmed = &text[start..=end];
    (trimmed.len() != text.len()).then_some(trimmed)
}
