//! Interruption of an outstanding call

use thiserror::Error;

use super::timeout::Timeout;

/// An outstanding call was abandoned before it produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Interrupted {
    #[error("Timed out after {0}")]
    TimedOut(Timeout),

    #[error("Cancelled")]
    Cancelled,
}
