//! Document-text reader adapters

mod completion;
mod server;

pub use completion::{CompletionDocumentReader, PDF_INSTRUCTION, PDF_MAX_TOKENS};
pub use server::ServerDocumentReader;
