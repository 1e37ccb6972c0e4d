//! PII redaction
//!
//! Applied to the request text before it is persisted as an audit preview.

use once_cell::sync::Lazy;
use regex::Regex;

/// Characters of redacted request text kept in an audit preview.
pub const DEFAULT_PREVIEW_CHARS: usize = 200;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap());
static CREDIT_CARD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{4}[- ]?\d{4}[- ]?\d{4}[- ]?\d{4}\b").unwrap());
static SSN_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").unwrap());
static PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+\d{1,3}[\s.-]?)?\(?\b\d{3}\)?[\s.-]?\d{3}[\s.-]?\d{3,4}\b").unwrap()
});

/// PII redaction patterns
#[derive(Debug, Clone, Copy, Default)]
pub struct PiiRedactor;

impl PiiRedactor {
    pub fn new() -> Self {
        Self
    }

    pub fn redact(&self, text: &str) -> String {
        // cards before phones, a card number contains phone-shaped runs
        let result = EMAIL_PATTERN.replace_all(text, "[EMAIL_REDACTED]");
        let result = CREDIT_CARD_PATTERN.replace_all(&result, "[CARD_REDACTED]");
        let result = SSN_PATTERN.replace_all(&result, "[SSN_REDACTED]");
        let result = PHONE_PATTERN.replace_all(&result, "[PHONE_REDACTED]");
        result.into_owned()
    }
}

/// Redacted, whitespace-collapsed and truncated form of `text`.
pub fn preview(text: &str, max_chars: usize) -> String {
    let redacted = PiiRedactor::new().redact(text);
    let collapsed = redacted.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }
    let mut truncated: String = collapsed.chars().take(max_chars).collect();
    truncated.push('…');
    truncated
}
