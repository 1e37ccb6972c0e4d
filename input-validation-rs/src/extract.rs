//! Pulling a JSON document out of free-form model output

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use serde_json::Value;

use crate::errors::{ValidationError, ValidationReason, ValidationResult};

lazy_static! {
    static ref FENCE_REGEX: Regex = Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)```").unwrap();
}

/// Find the JSON document in `text`.
///
/// Tries, in order: the whole text, each fenced code block, and each span
/// from an opening `{` or `[` to its matching closing bracket.
pub fn extract_json(text: &str) -> ValidationResult<Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(unparsable("output is empty"));
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Ok(value);
    }

    for body in FENCE_REGEX.captures_iter(trimmed).filter_map(|caps| caps.get(1)) {
        if let Ok(value) = serde_json::from_str::<Value>(body.as_str().trim()) {
            debug!("Extracted JSON from fenced block");
            return Ok(value);
        }
    }

    let mut from = 0;
    while let Some(found) = trimmed[from..].find(['{', '[']) {
        let start = from + found;
        if let Some(span) = balanced_span(&trimmed[start..]) {
            if let Ok(value) = serde_json::from_str::<Value>(span) {
                debug!("Extracted JSON from surrounding prose");
                return Ok(value);
            }
        }
        from = start + 1;
    }

    Err(unparsable("no JSON object or array in output"))
}

fn unparsable(message: &str) -> ValidationError {
    ValidationError::new("$", ValidationReason::Unparsable(message.to_string()))
}

/// Slice from the opening bracket at the start of `text` to the bracket
/// that closes it, skipping brackets inside string literals
fn balanced_span(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[..offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}
