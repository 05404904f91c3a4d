//! Capture domain module

mod session;
mod transcript;

pub use session::{CaptureSession, CaptureState, IllegalStateTransition};
pub use transcript::Transcript;
