//! Completion request value objects

use crate::domain::artifact::{Artifact, MediaKind};

/// Conversation role of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A typed block of message content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentBlock {
    Text(String),
    /// Base64 image data with its media type
    Image { media_type: String, data: String },
    /// Base64 document data with its media type
    Document { media_type: String, data: String },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Image block carrying the artifact's bytes, labelled with the
    /// canonical media type of its resolved kind
    pub fn image(kind: MediaKind, artifact: &Artifact) -> Self {
        Self::Image {
            media_type: kind.as_str().to_string(),
            data: artifact.to_base64(),
        }
    }

    /// PDF document block carrying the artifact's bytes
    pub fn document(artifact: &Artifact) -> Self {
        Self::Document {
            media_type: MediaKind::Pdf.as_str().to_string(),
            data: artifact.to_base64(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

/// One request to the completion collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// Overrides the adapter's configured model when set
    pub model: Option<String>,
    pub max_tokens: u32,
    pub messages: Vec<Message>,
}

impl CompletionRequest {
    /// A single user message made of the given blocks
    pub fn user(content: Vec<ContentBlock>, max_tokens: u32) -> Self {
        Self {
            model: None,
            max_tokens,
            messages: vec![Message {
                role: Role::User,
                content,
            }],
        }
    }

    /// A single user message with one text block
    pub fn user_text(text: impl Into<String>, max_tokens: u32) -> Self {
        Self::user(vec![ContentBlock::text(text)], max_tokens)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}
