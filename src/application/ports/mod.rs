//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod completion;
pub mod config;
pub mod document;
pub mod speech;
pub mod topic_repository;

// Re-export common types
pub use completion::{CompletionClient, CompletionError};
pub use config::ConfigStore;
pub use document::{DocumentError, DocumentReader};
pub use speech::{CaptureError, CaptureErrorReason, RecognitionOptions, SpeechEvent, SpeechRecognizer};
pub use topic_repository::{PersistenceError, TopicRepository};
