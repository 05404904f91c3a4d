//! Extracted text value object

use std::fmt;

/// Characters of extracted text sent along when deriving topics
pub const TOPIC_PREFIX_CHARS: usize = 10_000;

/// Characters of source text sent along as evaluation context
pub const EVALUATION_PREFIX_CHARS: usize = 3_000;

/// Plain text derived from exactly one artifact.
/// Never empty or whitespace-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    content: String,
}

impl ExtractedText {
    /// Wrap extracted content. Returns `None` when nothing but whitespace remains.
    pub fn new(content: impl Into<String>) -> Option<Self> {
        let content = content.into();
        if content.trim().is_empty() {
            None
        } else {
            Some(Self { content })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.content
    }

    pub fn into_string(self) -> String {
        self.content
    }

    /// Bounded prefix for remote requests
    pub fn prefix(&self, max_chars: usize) -> &str {
        char_prefix(&self.content, max_chars)
    }

    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }
}

impl fmt::Display for ExtractedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.content)
    }
}

/// Longest prefix of `text` holding at most `max_chars` characters,
/// cut on a char boundary.
pub fn char_prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
