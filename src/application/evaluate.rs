//! Explanation evaluation use case

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use thiserror::Error;
use tracing::{debug, info};

use super::guard::CallGuard;
use super::ports::{CompletionClient, CompletionError};
use crate::domain::completion::CompletionRequest;
use crate::domain::config::DEFAULT_MAX_TOKENS;
use crate::domain::evaluation::{EvaluationPrompt, EvaluationResult};
use crate::domain::topic::Topic;

/// Errors from evaluation
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("Evaluation failed: {0}")]
    Completion(#[from] CompletionError),

    #[error("The completion service did not return a usable evaluation")]
    Malformed { raw: String },

    #[error("An evaluation of \"{topic}\" is already in progress")]
    AlreadyInFlight { topic: String },

    #[error("Nothing to evaluate: the explanation is empty")]
    EmptyTranscript,
}

/// Scores an explanation of a topic via the completion service.
///
/// At most one evaluation per topic is outstanding at a time; a second
/// request for the same topic is rejected while the first runs. Different
/// topics are evaluated independently.
pub struct EvaluationService<C: CompletionClient> {
    completion: C,
    guard: CallGuard,
    max_tokens: u32,
    in_flight: Mutex<HashSet<String>>,
}

impl<C: CompletionClient> EvaluationService<C> {
    pub fn new(completion: C, guard: CallGuard) -> Self {
        Self {
            completion,
            guard,
            max_tokens: DEFAULT_MAX_TOKENS,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Evaluate one explanation of `topic`
    pub async fn evaluate(
        &self,
        topic: &Topic,
        transcript: &str,
    ) -> Result<EvaluationResult, EvaluationError> {
        if transcript.trim().is_empty() {
            return Err(EvaluationError::EmptyTranscript);
        }
        let _slot = self.claim(topic.name())?;

        let prompt = EvaluationPrompt::build(topic, transcript);
        let request = CompletionRequest::user_text(prompt.into_content(), self.max_tokens);
        let reply = self.guard.run(self.completion.complete(&request)).await?;

        let result = EvaluationResult::from_reply(&reply).map_err(|e| {
            debug!(raw = %e.raw, "unparseable evaluation reply");
            EvaluationError::Malformed { raw: e.raw }
        })?;
        info!(topic = topic.name(), score = result.score, "explanation evaluated");
        Ok(result)
    }

    /// Whether an evaluation of the named topic is outstanding
    pub fn is_in_flight(&self, topic: &str) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&slot_key(topic))
    }

    fn claim(&self, topic: &str) -> Result<InFlightSlot<'_>, EvaluationError> {
        let key = slot_key(topic);
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if !in_flight.insert(key.clone()) {
            return Err(EvaluationError::AlreadyInFlight {
                topic: topic.to_string(),
            });
        }
        Ok(InFlightSlot {
            in_flight: &self.in_flight,
            key,
        })
    }
}

fn slot_key(topic: &str) -> String {
    topic.trim().to_lowercase()
}

/// Releases the topic's slot when the evaluation finishes or is dropped
struct InFlightSlot<'a> {
    in_flight: &'a Mutex<HashSet<String>>,
    key: String,
}

impl Drop for InFlightSlot<'_> {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::MockCompletion;
    use crate::domain::evaluation::Followup;
    use std::sync::Arc;
    use std::time::Duration;

    const VERDICT: &str =
        r#"{"score": 72, "feedback": "Good start.", "followup": "What role does chlorophyll play?"}"#;

    fn topic() -> Topic {
        Topic::new("Photosynthesis", "Light to chemical energy")
            .with_source_text("Photosynthesis converts light into chemical energy...")
    }

    #[tokio::test]
    async fn returns_parsed_verdict() {
        let completion = Arc::new(MockCompletion::replying([VERDICT]));
        let service = EvaluationService::new(Arc::clone(&completion), CallGuard::default());
        let result = service
            .evaluate(&topic(), "Plants use sunlight to make sugar")
            .await
            .unwrap();
        assert_eq!(result.score, 72);
        assert_eq!(result.feedback, "Good start.");
        assert_eq!(
            result.followup,
            Followup::Prompt("What role does chlorophyll play?".into())
        );

        let prompt = completion.last_prompt();
        assert!(prompt.contains("Photosynthesis converts light into chemical energy..."));
        assert!(prompt.contains("Plants use sunlight to make sugar"));
        assert!(!service.is_in_flight("Photosynthesis"));
    }

    #[tokio::test]
    async fn fenced_verdict_with_prose_is_recovered() {
        let reply = format!("Here is my evaluation:\n```json\n{}\n```", VERDICT);
        let service = EvaluationService::new(MockCompletion::replying([reply]), CallGuard::default());
        let result = service.evaluate(&topic(), "answer").await.unwrap();
        assert_eq!(result.score, 72);
    }

    #[tokio::test]
    async fn out_of_range_scores_are_clamped() {
        for (raw, expected) in [(-5, 0), (0, 0), (100, 100), (150, 100)] {
            let reply = format!(r#"{{"score": {}, "feedback": "f", "followup": "q"}}"#, raw);
            let service =
                EvaluationService::new(MockCompletion::replying([reply]), CallGuard::default());
            let result = service.evaluate(&topic(), "answer").await.unwrap();
            assert_eq!(result.score, expected, "raw score {}", raw);
        }
    }

    #[tokio::test]
    async fn malformed_reply_keeps_raw() {
        let service = EvaluationService::new(
            MockCompletion::replying(["Great job!"]),
            CallGuard::default(),
        );
        match service.evaluate(&topic(), "answer").await.unwrap_err() {
            EvaluationError::Malformed { raw } => assert_eq!(raw, "Great job!"),
            other => panic!("unexpected error: {:?}", other),
        }
        // slot released after failure
        assert!(!service.is_in_flight("Photosynthesis"));
    }

    #[tokio::test]
    async fn blank_transcript_rejected_without_call() {
        let completion = Arc::new(MockCompletion::replying([VERDICT]));
        let service = EvaluationService::new(Arc::clone(&completion), CallGuard::default());
        let err = service.evaluate(&topic(), "   ").await.unwrap_err();
        assert!(matches!(err, EvaluationError::EmptyTranscript));
        assert_eq!(completion.call_count(), 0);
    }

    #[tokio::test]
    async fn same_topic_cannot_be_evaluated_twice_at_once() {
        let completion = MockCompletion::replying([VERDICT, VERDICT])
            .with_delay(Duration::from_millis(50));
        let service = EvaluationService::new(completion, CallGuard::default());
        let topic = topic();

        let (first, second) = tokio::join!(
            service.evaluate(&topic, "first attempt"),
            service.evaluate(&topic, "second attempt"),
        );
        assert!(first.is_ok());
        assert!(matches!(
            second,
            Err(EvaluationError::AlreadyInFlight { ref topic }) if topic == "Photosynthesis"
        ));
    }

    #[tokio::test]
    async fn different_topics_run_concurrently() {
        let completion = MockCompletion::replying([VERDICT, VERDICT])
            .with_delay(Duration::from_millis(50));
        let service = EvaluationService::new(completion, CallGuard::default());
        let a = topic();
        let b = Topic::new("Respiration", "Sugar to ATP");

        let (first, second) = tokio::join!(
            service.evaluate(&a, "answer a"),
            service.evaluate(&b, "answer b"),
        );
        assert!(first.is_ok());
        assert!(second.is_ok());
    }
}
