//! PDF extraction through the completion service

use async_trait::async_trait;

use crate::application::ports::{CompletionClient, DocumentError, DocumentReader};
use crate::domain::artifact::Artifact;
use crate::domain::completion::{CompletionRequest, ContentBlock};

/// Instruction sent alongside a PDF document block
pub const PDF_INSTRUCTION: &str =
    "Extract all text from this PDF. Return ONLY the extracted text, nothing else.";

/// Output budget for PDF text extraction
pub const PDF_MAX_TOKENS: u32 = 4096;

/// Reads PDFs by sending them to the completion service as a document block
pub struct CompletionDocumentReader<C: CompletionClient> {
    completion: C,
}

impl<C: CompletionClient> CompletionDocumentReader<C> {
    pub fn new(completion: C) -> Self {
        Self { completion }
    }
}

#[async_trait]
impl<C: CompletionClient> DocumentReader for CompletionDocumentReader<C> {
    async fn read_text(&self, document: &Artifact) -> Result<String, DocumentError> {
        let request = CompletionRequest::user(
            vec![ContentBlock::document(document), ContentBlock::text(PDF_INSTRUCTION)],
            PDF_MAX_TOKENS,
        );
        Ok(self.completion.complete(&request).await?)
    }
}
