//! Hand-written port doubles shared by the use case tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::ports::{
    CaptureError, CompletionClient, CompletionError, DocumentError, DocumentReader,
    PersistenceError, RecognitionOptions, SpeechEvent, SpeechRecognizer, TopicRepository,
};
use crate::domain::artifact::Artifact;
use crate::domain::completion::{CompletionRequest, ContentBlock};
use crate::domain::identity::Identity;
use crate::domain::topic::TopicSet;

/// Completion double replaying queued replies in order
#[derive(Default)]
pub struct MockCompletion {
    replies: Mutex<VecDeque<Result<String, CompletionError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
    delay: Option<Duration>,
}

impl MockCompletion {
    pub fn replying<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| Ok(r.into())).collect()),
            ..Default::default()
        }
    }

    pub fn failing(error: CompletionError) -> Self {
        Self {
            replies: Mutex::new(VecDeque::from([Err(error)])),
            ..Default::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn push_reply(&self, reply: &str) {
        self.replies.lock().unwrap().push_back(Ok(reply.to_string()));
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Text of every block of the last request's first message
    pub fn last_prompt(&self) -> String {
        let requests = self.requests.lock().unwrap();
        let last = requests.last().expect("no request sent");
        last.messages[0]
            .content
            .iter()
            .filter_map(|b| match b {
                ContentBlock::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait]
impl CompletionClient for MockCompletion {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(CompletionError::EmptyResponse))
    }
}

/// Document reader double returning a fixed text
pub struct MockDocuments {
    text: Result<String, DocumentError>,
    calls: AtomicUsize,
}

impl MockDocuments {
    pub fn returning(text: &str) -> Self {
        Self {
            text: Ok(text.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: DocumentError) -> Self {
        Self {
            text: Err(error),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentReader for MockDocuments {
    async fn read_text(&self, _document: &Artifact) -> Result<String, DocumentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.text.clone()
    }
}

/// Recognizer double sending a scripted list of events on start.
/// With `keep_open`, the channel stays open until `stop` is called.
#[derive(Default)]
pub struct MockRecognizer {
    script: Vec<SpeechEvent>,
    keep_open: bool,
    start_error: Option<CaptureError>,
    sender: Mutex<Option<mpsc::Sender<SpeechEvent>>>,
    stops: AtomicUsize,
}

impl MockRecognizer {
    pub fn scripted(script: Vec<SpeechEvent>) -> Self {
        Self {
            script,
            ..Default::default()
        }
    }

    pub fn open(script: Vec<SpeechEvent>) -> Self {
        Self {
            script,
            keep_open: true,
            ..Default::default()
        }
    }

    pub fn refusing(error: CaptureError) -> Self {
        Self {
            start_error: Some(error),
            ..Default::default()
        }
    }

    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechRecognizer for MockRecognizer {
    async fn start(
        &self,
        _options: &RecognitionOptions,
    ) -> Result<mpsc::Receiver<SpeechEvent>, CaptureError> {
        if let Some(err) = &self.start_error {
            return Err(err.clone());
        }
        let (tx, rx) = mpsc::channel(self.script.len() + 1);
        for event in &self.script {
            tx.try_send(event.clone()).unwrap();
        }
        if self.keep_open {
            *self.sender.lock().unwrap() = Some(tx);
        }
        Ok(rx)
    }

    async fn stop(&self) -> Result<(), CaptureError> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        self.sender.lock().unwrap().take();
        Ok(())
    }
}

/// Repository double with switchable failures
#[derive(Default)]
pub struct MockRepository {
    stored: Mutex<Option<TopicSet>>,
    fail_load: bool,
    fail_save: AtomicBool,
    saves: AtomicUsize,
}

impl MockRepository {
    pub fn with_topics(topics: TopicSet) -> Self {
        Self {
            stored: Mutex::new(Some(topics)),
            ..Default::default()
        }
    }

    pub fn broken() -> Self {
        let repo = Self {
            fail_load: true,
            ..Default::default()
        };
        repo.fail_saves(true);
        repo
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_save.store(fail, Ordering::SeqCst);
    }

    pub fn stored(&self) -> Option<TopicSet> {
        self.stored.lock().unwrap().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TopicRepository for MockRepository {
    async fn load(&self, _identity: &Identity) -> Result<TopicSet, PersistenceError> {
        if self.fail_load {
            return Err(PersistenceError::ReadFailed("disk on fire".into()));
        }
        Ok(self.stored.lock().unwrap().clone().unwrap_or_default())
    }

    async fn save(&self, _identity: &Identity, topics: &TopicSet) -> Result<(), PersistenceError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(PersistenceError::WriteFailed("disk full".into()));
        }
        *self.stored.lock().unwrap() = Some(topics.clone());
        Ok(())
    }
}
