//! Timing domain module

mod interrupted;
mod timeout;

pub use interrupted::Interrupted;
pub use timeout::{Timeout, DEFAULT_TIMEOUT_SECS};
