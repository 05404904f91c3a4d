//! Study session: the explicit context tying the pipeline together

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::capture::{CaptureControlError, CaptureController};
use super::evaluate::{EvaluationError, EvaluationService};
use super::extract::{ContentExtractor, ExtractionError};
use super::guard::CallGuard;
use super::ports::{
    CompletionClient, DocumentReader, PersistenceError, RecognitionOptions, SpeechRecognizer,
    TopicRepository,
};
use super::topic_store::TopicStore;
use super::topics::{TopicError, TopicExtractionService};
use crate::domain::artifact::Artifact;
use crate::domain::capture::IllegalStateTransition;
use crate::domain::config::{AppConfig, DEFAULT_MAX_TOKENS};
use crate::domain::evaluation::EvaluationResult;
use crate::domain::identity::Identity;
use crate::domain::timing::Timeout;
use crate::domain::topic::{Mastery, MasteryPolicy, Topic, TopicCount, TopicSet};

/// Errors from study session operations
#[derive(Debug, Error)]
pub enum StudyError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Topics(#[from] TopicError),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    #[error(transparent)]
    Capture(#[from] CaptureControlError),

    #[error(transparent)]
    IllegalState(#[from] IllegalStateTransition),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("Unknown topic: \"{0}\"")]
    UnknownTopic(String),

    #[error("No topic selected")]
    NoTopicSelected,
}

/// Tunables for a study session
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub timeout: Timeout,
    pub max_tokens: u32,
    pub mastery_policy: MasteryPolicy,
    pub topic_count: TopicCount,
    pub language: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            timeout: Timeout::default(),
            max_tokens: DEFAULT_MAX_TOKENS,
            mastery_policy: MasteryPolicy::default(),
            topic_count: TopicCount::default(),
            language: RecognitionOptions::default().language,
        }
    }
}

impl SessionSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            timeout: config.timeout_or_default(),
            max_tokens: config.max_tokens_or_default(),
            mastery_policy: config.mastery_policy_or_default(),
            topic_count: config.topic_count_or_default(),
            language: config.language_or_default().to_string(),
        }
    }
}

/// Outcome of an upload. The new topic set stands even if saving failed.
#[derive(Debug)]
pub struct UploadOutcome {
    pub topic_count: usize,
    pub save_error: Option<PersistenceError>,
}

/// Outcome of a submission. The mastery update stands even if saving failed.
#[derive(Debug)]
pub struct SubmitOutcome {
    pub topic: String,
    pub result: EvaluationResult,
    pub mastery: Mastery,
    pub save_error: Option<PersistenceError>,
}

/// One user's study session: identity, current topic set, selected topic
/// and its capture, plus the services the pipeline runs through.
pub struct StudySession<C, D, S, R>
where
    C: CompletionClient + Clone,
    D: DocumentReader,
    S: SpeechRecognizer,
    R: TopicRepository,
{
    identity: Identity,
    topics: TopicSet,
    selected: Option<String>,
    capture: Option<CaptureController<S, C, D>>,
    extractor: Arc<ContentExtractor<C, D>>,
    topic_service: TopicExtractionService<C>,
    evaluator: EvaluationService<C>,
    store: TopicStore<R>,
    recognizer: Arc<S>,
    guard: CallGuard,
    policy: MasteryPolicy,
    options: RecognitionOptions,
}

impl<C, D, S, R> StudySession<C, D, S, R>
where
    C: CompletionClient + Clone,
    D: DocumentReader,
    S: SpeechRecognizer,
    R: TopicRepository,
{
    pub fn new(
        identity: Identity,
        completion: C,
        documents: D,
        recognizer: S,
        repository: R,
        settings: SessionSettings,
    ) -> Self {
        let guard = CallGuard::new(settings.timeout);
        Self {
            identity,
            topics: TopicSet::new(),
            selected: None,
            capture: None,
            extractor: Arc::new(ContentExtractor::new(
                completion.clone(),
                documents,
                guard.clone(),
            )),
            topic_service: TopicExtractionService::new(completion.clone(), guard.clone())
                .with_count(settings.topic_count)
                .with_max_tokens(settings.max_tokens),
            evaluator: EvaluationService::new(completion, guard.clone())
                .with_max_tokens(settings.max_tokens),
            store: TopicStore::new(repository, guard.clone()),
            recognizer: Arc::new(recognizer),
            guard,
            policy: settings.mastery_policy,
            options: RecognitionOptions {
                language: settings.language,
                ..RecognitionOptions::default()
            },
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn topics(&self) -> &TopicSet {
        &self.topics
    }

    pub fn selected_topic(&self) -> Option<&Topic> {
        self.selected.as_deref().and_then(|name| self.topics.get(name))
    }

    /// Handle for cancelling outstanding collaborator calls from elsewhere
    /// (e.g. a signal handler)
    pub fn canceller(&self) -> CallGuard {
        self.guard.clone()
    }

    /// Cancel every outstanding collaborator call
    pub fn cancel(&self) {
        debug!("cancelling outstanding calls");
        self.guard.cancel_outstanding();
    }

    /// Load the identity's saved topics; an unreadable store yields none
    pub async fn restore(&mut self) -> &TopicSet {
        self.topics = self.store.load(&self.identity).await;
        &self.topics
    }

    /// Extract text from an artifact, derive a fresh topic set from it and
    /// save it. The previous set and selection are replaced only once the
    /// new set has been derived.
    pub async fn upload(&mut self, artifact: &Artifact) -> Result<UploadOutcome, StudyError> {
        let text = self.extractor.extract(artifact).await?;
        let topics = self.topic_service.derive_topics(&text).await?;
        info!(count = topics.len(), names = ?topics.names(), "derived topics");

        self.deselect().await;
        self.topics = topics;
        let save_error = self.store.save(&self.identity, &self.topics).await.err();
        Ok(UploadOutcome {
            topic_count: self.topics.len(),
            save_error,
        })
    }

    /// Select a topic and open a fresh capture for it
    pub async fn select(&mut self, name: &str) -> Result<&Topic, StudyError> {
        let canonical = self
            .topics
            .get(name)
            .map(|t| t.name().to_string())
            .ok_or_else(|| StudyError::UnknownTopic(name.to_string()))?;

        self.deselect().await;
        self.capture = Some(CaptureController::new(
            Arc::clone(&self.recognizer),
            Arc::clone(&self.extractor),
            self.options.clone(),
        ));
        self.selected = Some(canonical);
        self.selected_topic()
            .ok_or_else(|| StudyError::UnknownTopic(name.to_string()))
    }

    /// Drop the selection, closing any open capture
    pub async fn deselect(&mut self) {
        if let Some(mut capture) = self.capture.take() {
            if capture.is_listening() {
                if let Err(e) = capture.stop().await {
                    warn!(error = %e, "capture did not close cleanly");
                }
            }
        }
        self.selected = None;
    }

    /// Forget the topic set in memory and in the store
    pub async fn discard_topics(&mut self) -> Result<(), StudyError> {
        self.deselect().await;
        self.topics.clear();
        self.store.clear(&self.identity).await?;
        Ok(())
    }

    pub fn capture(&self) -> Option<&CaptureController<S, C, D>> {
        self.capture.as_ref()
    }

    pub fn capture_mut(&mut self) -> Result<&mut CaptureController<S, C, D>, StudyError> {
        self.capture.as_mut().ok_or(StudyError::NoTopicSelected)
    }

    /// Evaluate the current transcript against the selected topic, merge the
    /// score into its mastery, clear the transcript and save.
    ///
    /// Returns `Ok(None)` when the transcript is blank. On evaluation failure
    /// the transcript is kept so the user can retry.
    pub async fn submit(&mut self) -> Result<Option<SubmitOutcome>, StudyError> {
        let name = self.selected.clone().ok_or(StudyError::NoTopicSelected)?;
        let capture = self.capture.as_mut().ok_or(StudyError::NoTopicSelected)?;
        let Some(transcript) = capture.submission()? else {
            debug!(topic = %name, "blank submission ignored");
            return Ok(None);
        };

        let topic = self
            .topics
            .get(&name)
            .cloned()
            .ok_or_else(|| StudyError::UnknownTopic(name.clone()))?;
        let result = self.evaluator.evaluate(&topic, &transcript).await?;

        let mastery = self
            .topics
            .record_score(&name, result.score, self.policy)
            .ok_or_else(|| StudyError::UnknownTopic(name.clone()))?;
        capture.complete_submission()?;
        info!(
            topic = %name,
            score = result.score,
            mastery = mastery.value(),
            policy = self.policy.as_str(),
            "mastery updated"
        );

        let save_error = self.store.save(&self.identity, &self.topics).await.err();
        Ok(Some(SubmitOutcome {
            topic: name,
            result,
            mastery,
            save_error,
        }))
    }
}
