//! Domain layer - Core business logic
//!
//! Contains value objects, entities, pure reply parsing, and domain errors.
//! This layer has no dependencies on external systems.

pub mod artifact;
pub mod capture;
pub mod completion;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod identity;
pub mod timing;
pub mod topic;

// Re-export common types
pub use artifact::{Artifact, ExtractedText, MediaKind};
pub use capture::{CaptureSession, CaptureState, IllegalStateTransition, Transcript};
pub use completion::{CompletionRequest, ContentBlock, MalformedReply};
pub use config::AppConfig;
pub use error::*;
pub use evaluation::{EvaluationResult, Followup};
pub use identity::Identity;
pub use timing::{Interrupted, Timeout};
pub use topic::{Mastery, MasteryPolicy, Topic, TopicCount, TopicSet};
