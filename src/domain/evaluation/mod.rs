//! Evaluation domain module

mod prompt;
mod result;

pub use prompt::EvaluationPrompt;
pub use result::{EvaluationResult, Followup, MASTERED_SENTINEL};
