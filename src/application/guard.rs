//! Bounded execution of collaborator calls

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tokio_util::sync::CancellationToken;

use crate::domain::timing::{Interrupted, Timeout};

/// Bounds every outstanding collaborator call by a timeout and a shared
/// cancellation token. Clones share the token, so one `cancel_outstanding`
/// interrupts every call started through any clone.
#[derive(Debug, Clone)]
pub struct CallGuard {
    timeout: Timeout,
    token: Arc<Mutex<CancellationToken>>,
}

impl CallGuard {
    pub fn new(timeout: Timeout) -> Self {
        Self {
            timeout,
            token: Arc::new(Mutex::new(CancellationToken::new())),
        }
    }

    pub fn timeout(&self) -> Timeout {
        self.timeout
    }

    fn current_token(&self) -> CancellationToken {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Run a call, giving up when the timeout elapses or the call is cancelled
    pub async fn run<T, E, F>(&self, call: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: From<Interrupted>,
    {
        let token = self.current_token();
        tokio::select! {
            biased;
            _ = token.cancelled() => Err(Interrupted::Cancelled.into()),
            outcome = tokio::time::timeout(self.timeout.as_std(), call) => match outcome {
                Ok(result) => result,
                Err(_) => Err(Interrupted::TimedOut(self.timeout).into()),
            },
        }
    }

    /// Cancel every call currently in flight. Calls started afterwards run normally.
    pub fn cancel_outstanding(&self) {
        let mut token = self.token.lock().unwrap_or_else(PoisonError::into_inner);
        token.cancel();
        *token = CancellationToken::new();
    }
}

impl Default for CallGuard {
    fn default() -> Self {
        Self::new(Timeout::default())
    }
}
