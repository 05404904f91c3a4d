//! Completion port interface

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::completion::CompletionRequest;
use crate::domain::timing::Interrupted;

/// Completion errors
#[derive(Debug, Clone, Error)]
pub enum CompletionError {
    /// Non-2xx reply; `message` is the service's own error message
    #[error("API error (HTTP {status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    #[error("Empty completion response")]
    EmptyResponse,

    #[error("Completion call interrupted: {0}")]
    Interrupted(#[from] Interrupted),
}

/// Port for the remote text/vision/document completion service
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send one request and return the text of the first reply block.
    ///
    /// # Arguments
    /// * `request` - Model override, token budget and ordered messages
    ///
    /// # Returns
    /// The reply text or an error
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;
}

/// Shared clients (one client serves extraction, topics and evaluation)
#[async_trait]
impl<T: CompletionClient + ?Sized> CompletionClient for Arc<T> {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        self.as_ref().complete(request).await
    }
}
