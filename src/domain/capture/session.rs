//! Capture session state machine

use std::fmt;
use thiserror::Error;

use super::transcript::Transcript;

/// Capture states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CaptureState {
    /// Nothing captured yet
    #[default]
    Idle,
    /// Speech capture is open
    Listening,
    /// A supplementary file is being turned into text
    Processing,
    /// Idle with a non-empty transcript waiting to be submitted
    Ready,
}

impl CaptureState {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Listening => "listening",
            Self::Processing => "processing",
            Self::Ready => "ready",
        }
    }

    /// Idle and Ready both accept new work
    pub const fn is_at_rest(&self) -> bool {
        matches!(self, Self::Idle | Self::Ready)
    }
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid state transition is attempted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid state transition: cannot {action} while {current_state}")]
pub struct IllegalStateTransition {
    pub current_state: CaptureState,
    pub action: String,
}

/// Capture session entity.
/// Accumulates one explanation from speech and supplementary files.
///
/// State machine (Idle and Ready are the resting states):
///   REST -> LISTENING (start_listening)
///   LISTENING -> REST (stop_listening, end_listening)
///   REST -> PROCESSING (begin_ingest)
///   PROCESSING -> REST (finish_ingest)
///   REST -> IDLE (clear, complete_submission)
#[derive(Debug, Default)]
pub struct CaptureSession {
    state: CaptureState,
    transcript: Transcript,
}

impl CaptureSession {
    /// Create a new capture session in idle state
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn is_listening(&self) -> bool {
        self.state == CaptureState::Listening
    }

    pub fn is_processing(&self) -> bool {
        self.state == CaptureState::Processing
    }

    fn require_rest(&self, action: &str) -> Result<(), IllegalStateTransition> {
        if self.state.is_at_rest() {
            Ok(())
        } else {
            Err(self.illegal(action))
        }
    }

    fn illegal(&self, action: &str) -> IllegalStateTransition {
        IllegalStateTransition {
            current_state: self.state,
            action: action.to_string(),
        }
    }

    /// Settle into Idle or Ready depending on the transcript
    fn settle(&mut self) {
        self.state = if self.transcript.is_blank() {
            CaptureState::Idle
        } else {
            CaptureState::Ready
        };
    }

    /// Transition from REST to LISTENING
    pub fn start_listening(&mut self) -> Result<(), IllegalStateTransition> {
        self.require_rest("start listening")?;
        self.state = CaptureState::Listening;
        Ok(())
    }

    /// Transition from LISTENING to REST on an explicit stop
    pub fn stop_listening(&mut self) -> Result<(), IllegalStateTransition> {
        if self.state != CaptureState::Listening {
            return Err(self.illegal("stop listening"));
        }
        self.settle();
        Ok(())
    }

    /// The recognizer ended or failed on its own.
    /// Returns false if capture was not open (e.g. already stopped).
    pub fn end_listening(&mut self) -> bool {
        if self.state != CaptureState::Listening {
            return false;
        }
        self.settle();
        true
    }

    /// Record a recognition segment. Only finalized segments received while
    /// listening are committed; interim ones are display-only.
    /// Returns whether the segment was committed.
    pub fn record_segment(&mut self, text: &str, is_final: bool) -> bool {
        if !is_final || self.state != CaptureState::Listening {
            return false;
        }
        let before = self.transcript.segments().len();
        self.transcript.push(text);
        self.transcript.segments().len() > before
    }

    /// Transition from REST to PROCESSING for a supplementary file
    pub fn begin_ingest(&mut self) -> Result<(), IllegalStateTransition> {
        self.require_rest("ingest a file")?;
        self.state = CaptureState::Processing;
        Ok(())
    }

    /// Transition from PROCESSING to REST, appending the extracted text if any
    pub fn finish_ingest(&mut self, text: Option<&str>) -> Result<(), IllegalStateTransition> {
        if self.state != CaptureState::Processing {
            return Err(self.illegal("finish ingesting"));
        }
        if let Some(text) = text {
            self.transcript.push(text);
        }
        self.settle();
        Ok(())
    }

    /// The transcript to submit, if any. Submission is only legal at rest;
    /// a blank transcript yields `None` (a no-op submission).
    pub fn submission(&self) -> Result<Option<String>, IllegalStateTransition> {
        self.require_rest("submit")?;
        if self.transcript.is_blank() {
            Ok(None)
        } else {
            Ok(Some(self.transcript.text()))
        }
    }

    /// Clear the transcript after it was successfully evaluated
    pub fn complete_submission(&mut self) -> Result<(), IllegalStateTransition> {
        self.require_rest("complete submission")?;
        self.transcript.clear();
        self.settle();
        Ok(())
    }

    /// Empty the transcript without submitting
    pub fn clear(&mut self) -> Result<(), IllegalStateTransition> {
        self.require_rest("clear")?;
        self.transcript.clear();
        self.settle();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listening_with(segments: &[&str]) -> CaptureSession {
        let mut session = CaptureSession::new();
        session.start_listening().unwrap();
        for s in segments {
            session.record_segment(s, true);
        }
        session
    }

    #[test]
    fn new_session_is_idle() {
        let session = CaptureSession::new();
        assert_eq!(session.state(), CaptureState::Idle);
        assert!(session.transcript().is_blank());
    }

    #[test]
    fn start_from_idle() {
        let mut session = CaptureSession::new();
        assert!(session.start_listening().is_ok());
        assert!(session.is_listening());
    }

    #[test]
    fn start_while_listening_fails() {
        let mut session = listening_with(&[]);
        let err = session.start_listening().unwrap_err();
        assert_eq!(err.current_state, CaptureState::Listening);
        assert!(err.action.contains("start listening"));
    }

    #[test]
    fn stop_from_idle_fails() {
        let mut session = CaptureSession::new();
        let err = session.stop_listening().unwrap_err();
        assert_eq!(err.current_state, CaptureState::Idle);
    }

    #[test]
    fn only_final_segments_are_committed() {
        let mut session = listening_with(&[]);
        assert!(!session.record_segment("Plants use", false));
        assert!(session.record_segment("Plants use sunlight", true));
        assert!(!session.record_segment("to ma", false));
        assert!(session.record_segment("to make sugar", true));
        assert_eq!(session.transcript().text(), "Plants use sunlight to make sugar");
    }

    #[test]
    fn stop_retains_transcript_and_becomes_ready() {
        let mut session = listening_with(&["hello"]);
        session.stop_listening().unwrap();
        assert_eq!(session.state(), CaptureState::Ready);
        assert_eq!(session.transcript().text(), "hello");
    }

    #[test]
    fn segments_after_stop_are_ignored() {
        let mut session = listening_with(&["one"]);
        session.stop_listening().unwrap();
        assert!(!session.record_segment("two", true));
        assert_eq!(session.transcript().text(), "one");
    }

    #[test]
    fn end_listening_is_idempotent() {
        let mut session = listening_with(&[]);
        assert!(session.end_listening());
        assert_eq!(session.state(), CaptureState::Idle);
        assert!(!session.end_listening());
    }

    #[test]
    fn ingest_rejected_while_listening() {
        let mut session = listening_with(&[]);
        let err = session.begin_ingest().unwrap_err();
        assert_eq!(err.current_state, CaptureState::Listening);
    }

    #[test]
    fn ingest_appends_to_transcript() {
        let mut session = listening_with(&["spoken"]);
        session.stop_listening().unwrap();
        session.begin_ingest().unwrap();
        assert!(session.is_processing());
        session.finish_ingest(Some("from file")).unwrap();
        assert_eq!(session.transcript().text(), "spoken from file");
        assert_eq!(session.state(), CaptureState::Ready);
    }

    #[test]
    fn failed_ingest_returns_to_rest() {
        let mut session = CaptureSession::new();
        session.begin_ingest().unwrap();
        session.finish_ingest(None).unwrap();
        assert_eq!(session.state(), CaptureState::Idle);
    }

    #[test]
    fn start_while_processing_fails() {
        let mut session = CaptureSession::new();
        session.begin_ingest().unwrap();
        assert!(session.start_listening().is_err());
    }

    #[test]
    fn submit_illegal_while_listening_or_processing() {
        let session = listening_with(&["text"]);
        let err = session.submission().unwrap_err();
        assert_eq!(err.current_state, CaptureState::Listening);
        assert_eq!(session.transcript().text(), "text");

        let mut session = CaptureSession::new();
        session.begin_ingest().unwrap();
        assert!(session.submission().is_err());
    }

    #[test]
    fn blank_submission_is_noop() {
        let session = CaptureSession::new();
        assert_eq!(session.submission().unwrap(), None);
    }

    #[test]
    fn submission_then_completion_clears() {
        let mut session = listening_with(&["Plants use sunlight to make sugar"]);
        session.stop_listening().unwrap();
        assert_eq!(
            session.submission().unwrap().as_deref(),
            Some("Plants use sunlight to make sugar")
        );
        session.complete_submission().unwrap();
        assert!(session.transcript().is_blank());
        assert_eq!(session.state(), CaptureState::Idle);
    }

    #[test]
    fn clear_from_rest_only() {
        let mut session = listening_with(&["x"]);
        assert!(session.clear().is_err());
        session.stop_listening().unwrap();
        session.clear().unwrap();
        assert!(session.transcript().is_blank());
    }

    #[test]
    fn state_display() {
        assert_eq!(CaptureState::Idle.to_string(), "idle");
        assert_eq!(CaptureState::Listening.to_string(), "listening");
        assert_eq!(CaptureState::Processing.to_string(), "processing");
        assert_eq!(CaptureState::Ready.to_string(), "ready");
    }

    #[test]
    fn error_display() {
        let err = IllegalStateTransition {
            current_state: CaptureState::Listening,
            action: "submit".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("submit"));
        assert!(msg.contains("listening"));
    }
}
