//! Terminal "recognizer": typed lines stand in for finalized speech

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::application::ports::{
    CaptureError, CaptureErrorReason, RecognitionOptions, SpeechEvent, SpeechRecognizer,
};

type LineSource = Lines<BufReader<Box<dyn AsyncRead + Send + Unpin>>>;

/// Line reader shared between the recognizer and the interactive prompt.
/// Lines handed back with `unread` are returned before new input.
#[derive(Clone)]
pub struct ConsoleInput {
    lines: Arc<tokio::sync::Mutex<LineSource>>,
    returned: Arc<Mutex<VecDeque<String>>>,
}

impl ConsoleInput {
    pub fn stdin() -> Self {
        Self::from_reader(tokio::io::stdin())
    }

    pub fn from_reader(reader: impl AsyncRead + Send + Unpin + 'static) -> Self {
        let reader: Box<dyn AsyncRead + Send + Unpin> = Box::new(reader);
        Self {
            lines: Arc::new(tokio::sync::Mutex::new(BufReader::new(reader).lines())),
            returned: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Next line without its terminator; `None` at end of input.
    /// Cancel safe.
    pub async fn next_line(&self) -> io::Result<Option<String>> {
        let mut lines = self.lines.lock().await;
        if let Some(line) = self.take_returned() {
            return Ok(Some(line));
        }
        lines.next_line().await
    }

    /// Give back a line that was read but not consumed
    pub fn unread(&self, line: String) {
        self.returned
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_front(line);
    }

    fn take_returned(&self) -> Option<String> {
        self.returned
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }
}

/// Every non-blank line read while listening becomes a final segment.
/// A blank line or end of input ends the capture. A line read after the
/// capture was stopped goes back to the shared input for the prompt.
pub struct ConsoleRecognizer {
    input: ConsoleInput,
    active: Mutex<Option<CancellationToken>>,
}

impl ConsoleRecognizer {
    pub fn new(input: ConsoleInput) -> Self {
        Self {
            input,
            active: Mutex::new(None),
        }
    }
}

#[async_trait]
impl SpeechRecognizer for ConsoleRecognizer {
    async fn start(
        &self,
        options: &RecognitionOptions,
    ) -> Result<mpsc::Receiver<SpeechEvent>, CaptureError> {
        debug!(language = %options.language, "console capture started");
        let token = CancellationToken::new();
        if let Some(previous) = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(token.clone())
        {
            previous.cancel();
        }

        let (tx, rx) = mpsc::channel(32);
        let input = self.input.clone();
        tokio::spawn(async move {
            loop {
                let line = tokio::select! {
                    _ = token.cancelled() => break,
                    line = input.next_line() => line,
                };
                let event = match line {
                    Ok(Some(text)) if !text.trim().is_empty() => {
                        if token.is_cancelled() {
                            input.unread(text);
                            break;
                        }
                        SpeechEvent::Segment {
                            text,
                            is_final: true,
                        }
                    }
                    Ok(_) => SpeechEvent::End,
                    Err(e) => SpeechEvent::Error(CaptureErrorReason::RecognitionFault(e.to_string())),
                };
                let last = !matches!(event, SpeechEvent::Segment { .. });
                if let Err(mpsc::error::SendError(event)) = tx.send(event).await {
                    if let SpeechEvent::Segment { text, .. } = event {
                        debug!("capture closed, returning line to the prompt");
                        input.unread(text);
                    }
                    break;
                }
                if last {
                    break;
                }
            }
        });
        Ok(rx)
    }

    async fn stop(&self) -> Result<(), CaptureError> {
        if let Some(token) = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            token.cancel();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    async fn collect(mut rx: mpsc::Receiver<SpeechEvent>) -> Vec<SpeechEvent> {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    fn final_segment(text: &str) -> SpeechEvent {
        SpeechEvent::Segment {
            text: text.into(),
            is_final: true,
        }
    }

    #[tokio::test]
    async fn lines_until_blank_become_final_segments() {
        let input = ConsoleInput::from_reader(&b"plants use sunlight\nto make sugar\n\nleft over\n"[..]);
        let recognizer = ConsoleRecognizer::new(input.clone());
        let rx = recognizer.start(&RecognitionOptions::default()).await.unwrap();
        assert_eq!(
            collect(rx).await,
            vec![
                final_segment("plants use sunlight"),
                final_segment("to make sugar"),
                SpeechEvent::End,
            ]
        );
        // the rest of the input stays available to the prompt
        assert_eq!(input.next_line().await.unwrap().as_deref(), Some("left over"));
    }

    #[tokio::test]
    async fn end_of_input_ends_capture() {
        let recognizer = ConsoleRecognizer::new(ConsoleInput::from_reader(&b"only line"[..]));
        let rx = recognizer.start(&RecognitionOptions::default()).await.unwrap();
        assert_eq!(
            collect(rx).await,
            vec![final_segment("only line"), SpeechEvent::End]
        );
    }

    #[tokio::test]
    async fn unread_line_comes_back_first() {
        let input = ConsoleInput::from_reader(&b"second\n"[..]);
        input.unread("first".to_string());
        assert_eq!(input.next_line().await.unwrap().as_deref(), Some("first"));
        assert_eq!(input.next_line().await.unwrap().as_deref(), Some("second"));
        assert_eq!(input.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn line_typed_as_capture_stops_is_not_lost() {
        let (mut writer, reader) = tokio::io::duplex(64);
        let input = ConsoleInput::from_reader(reader);
        let recognizer = ConsoleRecognizer::new(input.clone());
        let rx = recognizer.start(&RecognitionOptions::default()).await.unwrap();
        tokio::task::yield_now().await;

        writer.write_all(b"typed during stop\n").await.unwrap();
        recognizer.stop().await.unwrap();

        let events = collect(rx).await;
        if !events.contains(&final_segment("typed during stop")) {
            assert_eq!(
                input.next_line().await.unwrap().as_deref(),
                Some("typed during stop")
            );
        }
    }

    #[tokio::test]
    async fn line_read_after_receiver_dropped_returns_to_prompt() {
        let (mut writer, reader) = tokio::io::duplex(64);
        let input = ConsoleInput::from_reader(reader);
        let recognizer = ConsoleRecognizer::new(input.clone());
        let rx = recognizer.start(&RecognitionOptions::default()).await.unwrap();
        tokio::task::yield_now().await;
        drop(rx);

        writer.write_all(b"for the prompt\n").await.unwrap();
        assert_eq!(
            input.next_line().await.unwrap().as_deref(),
            Some("for the prompt")
        );
    }

    #[tokio::test]
    async fn stop_closes_channel() {
        let (_writer, reader) = tokio::io::duplex(64);
        let recognizer = ConsoleRecognizer::new(ConsoleInput::from_reader(reader));
        let rx = recognizer.start(&RecognitionOptions::default()).await.unwrap();
        recognizer.stop().await.unwrap();
        assert!(collect(rx).await.is_empty());
    }
}
