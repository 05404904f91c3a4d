//! Content extraction use case

use thiserror::Error;
use tracing::debug;

use super::guard::CallGuard;
use super::ports::{CompletionClient, CompletionError, DocumentError, DocumentReader};
use crate::domain::artifact::{Artifact, ExtractedText, MediaKind};
use crate::domain::completion::{CompletionRequest, ContentBlock};
use crate::domain::error::UnsupportedMediaType;

/// Instruction sent alongside an image
pub const VISION_INSTRUCTION: &str =
    "Extract all text from this image. Return ONLY the extracted text, nothing else.";

/// Output budget for image text extraction
pub const VISION_MAX_TOKENS: u32 = 2048;

/// Errors from content extraction
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error(transparent)]
    UnsupportedMediaType(#[from] UnsupportedMediaType),

    #[error("No text could be extracted from the file")]
    EmptyExtraction,

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("Image text extraction failed: {0}")]
    Vision(#[from] CompletionError),
}

/// Turns an uploaded artifact into plain text.
///
/// Plain text is decoded locally; PDFs go to the document reader and
/// images to the completion service. The declared media type is checked
/// before any collaborator is called.
pub struct ContentExtractor<C, D>
where
    C: CompletionClient,
    D: DocumentReader,
{
    completion: C,
    documents: D,
    guard: CallGuard,
}

impl<C, D> ContentExtractor<C, D>
where
    C: CompletionClient,
    D: DocumentReader,
{
    pub fn new(completion: C, documents: D, guard: CallGuard) -> Self {
        Self {
            completion,
            documents,
            guard,
        }
    }

    /// Extract the text of one artifact
    pub async fn extract(&self, artifact: &Artifact) -> Result<ExtractedText, ExtractionError> {
        let kind = artifact.kind()?;
        debug!(media_type = %kind, bytes = artifact.size_bytes(), "extracting text");

        let raw = match kind {
            MediaKind::PlainText => String::from_utf8_lossy(artifact.data()).into_owned(),
            MediaKind::Pdf => self.guard.run(self.documents.read_text(artifact)).await?,
            MediaKind::Png | MediaKind::Jpeg | MediaKind::Gif | MediaKind::Webp => {
                let request = CompletionRequest::user(
                    vec![ContentBlock::image(kind, artifact), ContentBlock::text(VISION_INSTRUCTION)],
                    VISION_MAX_TOKENS,
                );
                self.guard.run(self.completion.complete(&request)).await?
            }
        };

        let text = ExtractedText::new(normalize(&raw)).ok_or(ExtractionError::EmptyExtraction)?;
        debug!(chars = text.char_count(), "extracted text");
        Ok(text)
    }
}

/// Unify line endings, drop a byte order mark and trim
fn normalize(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}')
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .trim()
        .to_string()
}
