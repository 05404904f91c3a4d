//! Completion service adapters

mod anthropic;

pub use anthropic::{AnthropicClient, ANTHROPIC_VERSION, DEFAULT_BASE_URL};
