//! Recognizer replaying a fixed list of events

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::application::ports::{CaptureError, RecognitionOptions, SpeechEvent, SpeechRecognizer};

/// Replays its events on every start, then ends the capture.
/// Used for one-shot explanations given on the command line.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRecognizer {
    events: Vec<SpeechEvent>,
}

impl ScriptedRecognizer {
    pub fn new(events: Vec<SpeechEvent>) -> Self {
        Self { events }
    }

    /// Each text becomes one finalized segment
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            texts
                .into_iter()
                .map(|text| SpeechEvent::Segment {
                    text: text.into(),
                    is_final: true,
                })
                .collect(),
        )
    }
}

#[async_trait]
impl SpeechRecognizer for ScriptedRecognizer {
    async fn start(
        &self,
        _options: &RecognitionOptions,
    ) -> Result<mpsc::Receiver<SpeechEvent>, CaptureError> {
        let (tx, rx) = mpsc::channel(self.events.len() + 1);
        let terminal = self
            .events
            .iter()
            .position(|e| !matches!(e, SpeechEvent::Segment { .. }));
        let script = match terminal {
            Some(idx) => &self.events[..=idx],
            None => &self.events[..],
        };
        for event in script {
            // capacity covers the whole script
            let _ = tx.try_send(event.clone());
        }
        if terminal.is_none() {
            let _ = tx.try_send(SpeechEvent::End);
        }
        Ok(rx)
    }

    async fn stop(&self) -> Result<(), CaptureError> {
        Ok(())
    }
}
