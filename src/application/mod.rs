//! Application layer - Use cases and port interfaces
//!
//! Contains the core study pipeline operations and trait definitions
//! for external system interactions.

pub mod capture;
pub mod evaluate;
pub mod extract;
pub mod guard;
pub mod ports;
pub mod study;
pub mod topic_store;
pub mod topics;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export use cases
pub use capture::{CaptureControlError, CaptureController, CaptureUpdate};
pub use evaluate::{EvaluationError, EvaluationService};
pub use extract::{ContentExtractor, ExtractionError};
pub use guard::CallGuard;
pub use study::{SessionSettings, StudyError, StudySession, SubmitOutcome, UploadOutcome};
pub use topic_store::TopicStore;
pub use topics::{TopicError, TopicExtractionService};
