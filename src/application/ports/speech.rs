//! Speech capture port interface

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

/// Why speech capture failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureErrorReason {
    /// Microphone access denied
    PermissionDenied,
    /// Capture ended without hearing anything
    NoSpeech,
    /// Any other recognizer fault
    RecognitionFault(String),
    /// No recognizer is available on this platform
    Unavailable(String),
}

impl fmt::Display for CaptureErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PermissionDenied => {
                f.write_str("microphone access denied; allow microphone access and try again")
            }
            Self::NoSpeech => f.write_str("no speech detected; please try speaking again"),
            Self::RecognitionFault(msg) => write!(f, "recognition fault: {}", msg),
            Self::Unavailable(msg) => write!(f, "speech recognition unavailable: {}", msg),
        }
    }
}

/// Capture error reported to the caller
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Speech capture failed: {reason}")]
pub struct CaptureError {
    pub reason: CaptureErrorReason,
}

impl From<CaptureErrorReason> for CaptureError {
    fn from(reason: CaptureErrorReason) -> Self {
        Self { reason }
    }
}

/// One event from an open capture
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    /// Recognized text; interim segments may later be revised
    Segment { text: String, is_final: bool },
    /// The recognizer failed; capture is over
    Error(CaptureErrorReason),
    /// The recognizer stopped on its own; capture is over
    End,
}

/// How capture should be opened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionOptions {
    pub continuous: bool,
    pub interim_results: bool,
    pub language: String,
}

impl Default for RecognitionOptions {
    fn default() -> Self {
        Self {
            continuous: true,
            interim_results: true,
            language: "en-US".to_string(),
        }
    }
}

/// Port for the platform speech recognizer
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Open a capture. Events arrive on the returned channel until
    /// `End`/`Error` is sent or the channel closes.
    async fn start(
        &self,
        options: &RecognitionOptions,
    ) -> Result<mpsc::Receiver<SpeechEvent>, CaptureError>;

    /// Ask the recognizer to stop capturing
    async fn stop(&self) -> Result<(), CaptureError>;
}

/// Shared recognizers
#[async_trait]
impl<T: SpeechRecognizer + ?Sized> SpeechRecognizer for Arc<T> {
    async fn start(
        &self,
        options: &RecognitionOptions,
    ) -> Result<mpsc::Receiver<SpeechEvent>, CaptureError> {
        self.as_ref().start(options).await
    }

    async fn stop(&self) -> Result<(), CaptureError> {
        self.as_ref().stop().await
    }
}
