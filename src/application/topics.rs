//! Topic derivation use case

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::guard::CallGuard;
use super::ports::{CompletionClient, CompletionError};
use crate::domain::artifact::ExtractedText;
use crate::domain::completion::{parse_list, CompletionRequest};
use crate::domain::config::DEFAULT_MAX_TOKENS;
use crate::domain::topic::{Topic, TopicCount, TopicPrompt, TopicSet};

/// Errors from topic derivation
#[derive(Debug, Error)]
pub enum TopicError {
    #[error("Topic derivation failed: {0}")]
    Completion(#[from] CompletionError),

    #[error("The completion service did not return a usable topic list")]
    Malformed { raw: String },
}

#[derive(Debug, Deserialize)]
struct RawTopic {
    name: String,
    #[serde(default)]
    description: String,
}

/// Derives a topic set from extracted text via the completion service
pub struct TopicExtractionService<C: CompletionClient> {
    completion: C,
    guard: CallGuard,
    count: TopicCount,
    max_tokens: u32,
}

impl<C: CompletionClient> TopicExtractionService<C> {
    pub fn new(completion: C, guard: CallGuard) -> Self {
        Self {
            completion,
            guard,
            count: TopicCount::default(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_count(mut self, count: TopicCount) -> Self {
        self.count = count;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Ask for topics and parse the reply. Every topic starts at zero
    /// mastery and keeps the full text as its source.
    pub async fn derive_topics(&self, text: &ExtractedText) -> Result<TopicSet, TopicError> {
        let prompt = TopicPrompt::build(text, self.count);
        let request = CompletionRequest::user_text(prompt.into_content(), self.max_tokens);

        let reply = self.guard.run(self.completion.complete(&request)).await?;
        topics_from_reply(&reply, text, self.count)
    }
}

/// Reinterpret a completion reply as a topic set
pub fn topics_from_reply(
    reply: &str,
    text: &ExtractedText,
    count: TopicCount,
) -> Result<TopicSet, TopicError> {
    let malformed = || TopicError::Malformed {
        raw: reply.to_string(),
    };

    let parsed: Vec<RawTopic> = parse_list(reply).map_err(|e| {
        debug!(raw = %e.raw, "unparseable topic reply");
        malformed()
    })?;

    if parsed.is_empty() || parsed.iter().any(|t| t.name.trim().is_empty()) {
        debug!(raw = %reply, "topic reply holds no topics or a nameless topic");
        return Err(malformed());
    }

    let topics = parsed
        .into_iter()
        .map(|t| Topic::new(t.name, t.description).with_source_text(text.as_str()))
        .collect();

    let (set, dropped) = TopicSet::dedup(topics);
    if !dropped.is_empty() {
        warn!(dropped = ?dropped, "dropped duplicate topic names");
    }
    if !count.expected().contains(&set.len()) {
        warn!(
            got = set.len(),
            expected = ?count.expected(),
            "topic count outside the requested range"
        );
    }
    Ok(set)
}
