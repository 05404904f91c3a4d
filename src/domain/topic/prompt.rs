//! Topic derivation prompt value object

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::domain::artifact::{ExtractedText, TOPIC_PREFIX_CHARS};
use crate::domain::error::InvalidOptionError;

const RANGE_INSTRUCTION: &str = r#"Extract 3-5 key topics from this text. Return ONLY a JSON array like:
[{"name": "Topic 1", "description": "..."}, {"name": "Topic 2", "description": "..."}]"#;

const EXACT_INSTRUCTION: &str = r#"You must respond with ONLY valid JSON. Extract exactly 5 key topics from this text and return them as a JSON array. If the text has fewer distinct topics, create subtopics or related concepts to reach 5 topics.

Format: [{"name": "Topic Name", "description": "Brief description"}]

Do not include any other text, explanations, or markdown formatting. Only return the JSON array with exactly 5 topics."#;

/// How many topics the completion service is asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TopicCount {
    /// Between three and five topics
    #[default]
    Range,
    /// Exactly five topics (stricter prompt)
    Exact,
}

impl TopicCount {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Range => "range",
            Self::Exact => "exact",
        }
    }

    /// Number of topics the prompt asks for
    pub const fn expected(&self) -> RangeInclusive<usize> {
        match self {
            Self::Range => 3..=5,
            Self::Exact => 5..=5,
        }
    }

    const fn instruction(&self) -> &'static str {
        match self {
            Self::Range => RANGE_INSTRUCTION,
            Self::Exact => EXACT_INSTRUCTION,
        }
    }
}

impl FromStr for TopicCount {
    type Err = InvalidOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "range" => Ok(Self::Range),
            "exact" | "strict" => Ok(Self::Exact),
            _ => Err(InvalidOptionError {
                option: "topic count",
                input: s.to_string(),
                valid: "range, exact",
            }),
        }
    }
}

impl fmt::Display for TopicCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The single user message sent to derive topics from extracted text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicPrompt {
    content: String,
}

impl TopicPrompt {
    /// Build the prompt around a bounded prefix of the text
    pub fn build(text: &ExtractedText, count: TopicCount) -> Self {
        let content = format!(
            "{}\n\nText: {}",
            count.instruction(),
            text.prefix(TOPIC_PREFIX_CHARS)
        );
        Self { content }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn into_content(self) -> String {
        self.content
    }
}
