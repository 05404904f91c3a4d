//! Application configuration value object

use serde::{Deserialize, Serialize};

use super::backends::{PdfReaderKind, StoreKind};
use crate::domain::timing::Timeout;
use crate::domain::topic::{MasteryPolicy, TopicCount};

/// Default completion model
pub const DEFAULT_MODEL: &str = "claude-3-haiku-20240307";

/// Default output token budget for topic derivation and evaluation
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Default companion server (PDF parsing and topic persistence)
pub const DEFAULT_SERVER_URL: &str = "http://localhost:3001";

/// Default identity for local, unauthenticated use
pub const DEFAULT_IDENTITY: &str = "local";

/// Companion server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    pub url: Option<String>,
    pub token: Option<String>,
}

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub timeout: Option<String>,
    pub mastery_policy: Option<String>,
    pub topic_count: Option<String>,
    pub pdf_reader: Option<String>,
    pub store: Option<String>,
    pub identity: Option<String>,
    pub language: Option<String>,
    pub server: Option<ServerConfig>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            api_key: None,
            model: Some(DEFAULT_MODEL.to_string()),
            max_tokens: Some(DEFAULT_MAX_TOKENS),
            timeout: Some(Timeout::default().to_string()),
            mastery_policy: Some(MasteryPolicy::default().to_string()),
            topic_count: Some(TopicCount::default().to_string()),
            pdf_reader: Some(PdfReaderKind::default().to_string()),
            store: Some(StoreKind::default().to_string()),
            identity: Some(DEFAULT_IDENTITY.to_string()),
            language: Some("en-US".to_string()),
            server: Some(ServerConfig {
                url: Some(DEFAULT_SERVER_URL.to_string()),
                token: None,
            }),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            api_key: other.api_key.or(self.api_key),
            model: other.model.or(self.model),
            max_tokens: other.max_tokens.or(self.max_tokens),
            timeout: other.timeout.or(self.timeout),
            mastery_policy: other.mastery_policy.or(self.mastery_policy),
            topic_count: other.topic_count.or(self.topic_count),
            pdf_reader: other.pdf_reader.or(self.pdf_reader),
            store: other.store.or(self.store),
            identity: other.identity.or(self.identity),
            language: other.language.or(self.language),
            server: Self::merge_server_config(self.server, other.server),
        }
    }

    fn merge_server_config(
        base: Option<ServerConfig>,
        other: Option<ServerConfig>,
    ) -> Option<ServerConfig> {
        match (base, other) {
            (None, None) => None,
            (Some(b), None) => Some(b),
            (None, Some(o)) => Some(o),
            (Some(b), Some(o)) => Some(ServerConfig {
                url: o.url.or(b.url),
                token: o.token.or(b.token),
            }),
        }
    }

    pub fn model_or_default(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn max_tokens_or_default(&self) -> u32 {
        self.max_tokens.filter(|&n| n > 0).unwrap_or(DEFAULT_MAX_TOKENS)
    }

    /// Get timeout as parsed Timeout, or default if not set/invalid
    pub fn timeout_or_default(&self) -> Timeout {
        self.timeout
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    pub fn mastery_policy_or_default(&self) -> MasteryPolicy {
        self.mastery_policy
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    pub fn topic_count_or_default(&self) -> TopicCount {
        self.topic_count
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    pub fn pdf_reader_or_default(&self) -> PdfReaderKind {
        self.pdf_reader
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    pub fn store_or_default(&self) -> StoreKind {
        self.store
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    pub fn identity_or_default(&self) -> &str {
        self.identity
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_IDENTITY)
    }

    pub fn language_or_default(&self) -> &str {
        self.language.as_deref().unwrap_or("en-US")
    }

    pub fn server_url_or_default(&self) -> &str {
        self.server
            .as_ref()
            .and_then(|s| s.url.as_deref())
            .unwrap_or(DEFAULT_SERVER_URL)
    }

    pub fn server_token(&self) -> Option<&str> {
        self.server.as_ref().and_then(|s| s.token.as_deref())
    }
}
