//! Document-text port interface

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use super::completion::CompletionError;
use crate::domain::artifact::Artifact;
use crate::domain::timing::Interrupted;

/// Document parsing errors
#[derive(Debug, Clone, Error)]
pub enum DocumentError {
    #[error("PDF parsing error (HTTP {status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("PDF parsing request failed: {0}")]
    RequestFailed(String),

    #[error("Failed to parse PDF parsing response: {0}")]
    ParseError(String),

    #[error("PDF extraction via completion failed: {0}")]
    Completion(#[from] CompletionError),

    #[error("PDF parsing interrupted: {0}")]
    Interrupted(#[from] Interrupted),
}

/// Port for turning a PDF into text
#[async_trait]
pub trait DocumentReader: Send + Sync {
    /// Extract the text of every page, in page order, joined by newlines.
    ///
    /// # Arguments
    /// * `document` - The PDF artifact
    async fn read_text(&self, document: &Artifact) -> Result<String, DocumentError>;
}

/// Shared readers
#[async_trait]
impl<T: DocumentReader + ?Sized> DocumentReader for Arc<T> {
    async fn read_text(&self, document: &Artifact) -> Result<String, DocumentError> {
        self.as_ref().read_text(document).await
    }
}
