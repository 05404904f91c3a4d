//! Defensive parsing of free-text completion replies.
//!
//! The completion service is asked for JSON but answers in prose: the
//! payload may be wrapped in a code fence, prefixed with commentary, or
//! followed by a sign-off. Recovery here is purely local reinterpretation
//! of the text already received:
//!
//! 1. strip leading/trailing code fences (with optional language tag)
//! 2. trim surrounding whitespace
//! 3. parse strictly
//! 4. on failure, parse the span from the first opening delimiter to the
//!    last closing delimiter
//! 5. on failure, report the raw reply

use serde::de::DeserializeOwned;
use thiserror::Error;

const FENCE: &str = "```";

/// A reply that could not be reinterpreted as the requested structure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Reply did not contain a valid JSON {expected}")]
pub struct MalformedReply {
    pub expected: &'static str,
    pub raw: String,
}

/// Remove decorative code fences from both ends of a reply.
///
/// A reply without fences is returned unchanged, and the result is a fixed
/// point: stripping it again is a no-op.
pub fn strip_fences(raw: &str) -> &str {
    let mut current = raw;
    while let Some(next) = strip_fence_pair(current) {
        current = next;
    }
    current
}

/// Strip one leading and/or one trailing fence. `None` when neither exists.
fn strip_fence_pair(s: &str) -> Option<&str> {
    let mut out = s;
    let mut changed = false;

    if let Some(rest) = out.trim_start().strip_prefix(FENCE) {
        let tag_len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+')))
            .unwrap_or(rest.len());
        out = rest[tag_len..].trim_start();
        changed = true;
    }

    if let Some(rest) = out.trim_end().strip_suffix(FENCE) {
        out = rest.trim_end();
        changed = true;
    }

    changed.then_some(out)
}

/// Parse a reply expected to hold a JSON array of `T`
pub fn parse_list<T: DeserializeOwned>(raw: &str) -> Result<Vec<T>, MalformedReply> {
    parse_delimited(raw, '[', ']', "array")
}

/// Parse a reply expected to hold a single JSON object `T`
pub fn parse_object<T: DeserializeOwned>(raw: &str) -> Result<T, MalformedReply> {
    parse_delimited(raw, '{', '}', "object")
}

fn parse_delimited<T: DeserializeOwned>(
    raw: &str,
    open: char,
    close: char,
    expected: &'static str,
) -> Result<T, MalformedReply> {
    let cleaned = strip_fences(raw).trim();

    if let Ok(value) = serde_json::from_str(cleaned) {
        return Ok(value);
    }

    if let Some(span) = outer_span(cleaned, open, close) {
        if let Ok(value) = serde_json::from_str(span) {
            return Ok(value);
        }
    }

    Err(MalformedReply {
        expected,
        raw: raw.to_string(),
    })
}

/// Text from the first `open` to the last `close`, inclusive
fn outer_span(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (start < end).then(|| &text[start..=end])
}
