//! Capture controller: drives a capture session from recognizer events

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::extract::{ContentExtractor, ExtractionError};
use super::ports::{
    CaptureError, CompletionClient, DocumentReader, RecognitionOptions, SpeechEvent,
    SpeechRecognizer,
};
use crate::domain::artifact::Artifact;
use crate::domain::capture::{CaptureSession, CaptureState, IllegalStateTransition, Transcript};

/// Errors from capture control
#[derive(Debug, Error)]
pub enum CaptureControlError {
    #[error(transparent)]
    IllegalState(#[from] IllegalStateTransition),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error("Could not read the supplementary file: {0}")]
    Extraction(#[from] ExtractionError),
}

/// Outcome of one recognizer event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureUpdate {
    /// Provisional text, for display only
    Interim(String),
    /// A finalized segment appended to the transcript
    Committed(String),
    /// The recognizer stopped on its own
    Ended,
}

/// One explanation attempt for the selected topic.
///
/// Speech events arrive on a channel opened by the recognizer; only
/// finalized segments reach the transcript. Supplementary files go
/// through the content extractor and are appended the same way.
pub struct CaptureController<S, C, D>
where
    S: SpeechRecognizer,
    C: CompletionClient,
    D: DocumentReader,
{
    session: CaptureSession,
    recognizer: Arc<S>,
    extractor: Arc<ContentExtractor<C, D>>,
    options: RecognitionOptions,
    events: Option<mpsc::Receiver<SpeechEvent>>,
}

impl<S, C, D> CaptureController<S, C, D>
where
    S: SpeechRecognizer,
    C: CompletionClient,
    D: DocumentReader,
{
    pub fn new(
        recognizer: Arc<S>,
        extractor: Arc<ContentExtractor<C, D>>,
        options: RecognitionOptions,
    ) -> Self {
        Self {
            session: CaptureSession::new(),
            recognizer,
            extractor,
            options,
            events: None,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.session.state()
    }

    pub fn transcript(&self) -> &Transcript {
        self.session.transcript()
    }

    pub fn is_listening(&self) -> bool {
        self.session.is_listening()
    }

    /// Open a speech capture
    pub async fn start(&mut self) -> Result<(), CaptureControlError> {
        self.session.start_listening()?;
        match self.recognizer.start(&self.options).await {
            Ok(events) => {
                debug!(language = %self.options.language, "listening");
                self.events = Some(events);
                Ok(())
            }
            Err(e) => {
                warn!(reason = %e.reason, "speech capture could not start");
                self.session.end_listening();
                Err(e.into())
            }
        }
    }

    /// Close the speech capture, keeping everything already finalized
    pub async fn stop(&mut self) -> Result<(), CaptureControlError> {
        self.session.stop_listening()?;
        self.events = None;
        if let Err(e) = self.recognizer.stop().await {
            warn!(reason = %e.reason, "recognizer did not stop cleanly");
        }
        Ok(())
    }

    /// Wait for the next recognizer event and apply it.
    ///
    /// Returns `Ok(None)` when no capture is open. A recognition error
    /// ends the capture and is returned; the transcript is untouched.
    pub async fn next_update(&mut self) -> Result<Option<CaptureUpdate>, CaptureError> {
        let Some(events) = self.events.as_mut() else {
            return Ok(None);
        };

        let event = events.recv().await;
        match event {
            Some(SpeechEvent::Segment { text, is_final: false }) => {
                Ok(Some(CaptureUpdate::Interim(text)))
            }
            Some(SpeechEvent::Segment { text, is_final: true }) => {
                if self.session.record_segment(&text, true) {
                    Ok(Some(CaptureUpdate::Committed(text.trim().to_string())))
                } else {
                    Ok(Some(CaptureUpdate::Interim(text)))
                }
            }
            Some(SpeechEvent::Error(reason)) => {
                warn!(reason = %reason, "speech recognition error");
                self.finish_capture();
                Err(CaptureError { reason })
            }
            Some(SpeechEvent::End) | None => {
                self.finish_capture();
                Ok(Some(CaptureUpdate::Ended))
            }
        }
    }

    /// Drain events until the recognizer ends the capture.
    /// Returns the segments committed along the way.
    pub async fn listen_to_end(&mut self) -> Result<Vec<String>, CaptureError> {
        let mut committed = Vec::new();
        while let Some(update) = self.next_update().await? {
            match update {
                CaptureUpdate::Committed(text) => committed.push(text),
                CaptureUpdate::Interim(_) => {}
                CaptureUpdate::Ended => break,
            }
        }
        Ok(committed)
    }

    fn finish_capture(&mut self) {
        self.events = None;
        self.session.end_listening();
    }

    /// Append the text of a supplementary file to the transcript
    pub async fn ingest_file(&mut self, artifact: &Artifact) -> Result<(), CaptureControlError> {
        self.session.begin_ingest()?;
        match self.extractor.extract(artifact).await {
            Ok(text) => {
                self.session.finish_ingest(Some(text.as_str()))?;
                Ok(())
            }
            Err(e) => {
                self.session.finish_ingest(None)?;
                Err(e.into())
            }
        }
    }

    /// Empty the transcript without submitting
    pub fn clear(&mut self) -> Result<(), IllegalStateTransition> {
        self.session.clear()
    }

    /// Transcript to hand to evaluation; `None` when there is nothing to submit
    pub fn submission(&self) -> Result<Option<String>, IllegalStateTransition> {
        self.session.submission()
    }

    /// Clear the transcript after a successful evaluation
    pub fn complete_submission(&mut self) -> Result<(), IllegalStateTransition> {
        self.session.complete_submission()
    }
}
