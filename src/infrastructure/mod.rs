//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces, integrating
//! with the Anthropic Messages API, the companion server, the terminal
//! and the local filesystem.

pub mod completion;
pub mod config;
pub mod document;
pub mod speech;
pub mod store;

// Re-export adapters
pub use completion::AnthropicClient;
pub use config::XdgConfigStore;
pub use document::{CompletionDocumentReader, ServerDocumentReader};
pub use speech::{ConsoleInput, ConsoleRecognizer, ScriptedRecognizer};
pub use store::{FileTopicRepository, HttpTopicRepository, MemoryTopicRepository};
