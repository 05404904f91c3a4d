//! Evaluation rubric prompt value object

use crate::domain::artifact::EVALUATION_PREFIX_CHARS;
use crate::domain::topic::Topic;

const RUBRIC: &str = r#"Evaluate their understanding and return JSON in this exact format:
{
  "score": 0-100,
  "feedback": "Detailed feedback on what they got right and wrong",
  "followup": "If score > 85: challenging question or MASTERED. If 60-85: clarifying question. If < 60: hint and ask to re-explain"
}

Be encouraging but honest. Point out misconceptions and missing concepts."#;

/// The single user message asking the tutor to grade an explanation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationPrompt {
    content: String,
}

impl EvaluationPrompt {
    /// Build the rubric around the topic, its bounded context and the transcript
    pub fn build(topic: &Topic, transcript: &str) -> Self {
        let explanation = flatten(transcript);
        let content = format!(
            "You are a Socratic tutor evaluating a student's understanding of \"{name}\".\n\n\
             CONTEXT FROM STUDY MATERIAL:\n{context}\n\n\
             TOPIC: {name}\n\
             DESCRIPTION: {description}\n\n\
             STUDENT'S EXPLANATION:\n\"{explanation}\"\n\n\
             {rubric}",
            name = topic.name(),
            context = topic.context(EVALUATION_PREFIX_CHARS),
            description = topic.description(),
            explanation = explanation,
            rubric = RUBRIC,
        );
        Self { content }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn into_content(self) -> String {
        self.content
    }
}

/// Collapse line breaks so the explanation stays on one quoted line
fn flatten(transcript: &str) -> String {
    transcript
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn includes_topic_and_transcript() {
        let topic = Topic::new("Photosynthesis", "Light into sugar")
            .with_source_text("Photosynthesis converts light into chemical energy.");
        let prompt = EvaluationPrompt::build(&topic, "Plants use sunlight\nto make sugar");

        let content = prompt.content();
        assert!(content.contains("understanding of \"Photosynthesis\""));
        assert!(content.contains("Photosynthesis converts light into chemical energy."));
        assert!(content.contains("DESCRIPTION: Light into sugar"));
        assert!(content.contains("\"Plants use sunlight to make sugar\""));
        assert!(content.contains("MASTERED"));
    }

    #[test]
    fn context_is_bounded() {
        let long = "y".repeat(EVALUATION_PREFIX_CHARS * 2);
        let topic = Topic::new("T", "d").with_source_text(long);
        let prompt = EvaluationPrompt::build(&topic, "x");
        let expected = "y".repeat(EVALUATION_PREFIX_CHARS);
        assert!(prompt.content().contains(&format!("{}\n\nTOPIC", expected)));
        assert!(!prompt.content().contains(&"y".repeat(EVALUATION_PREFIX_CHARS + 1)));
    }

    #[test]
    fn context_falls_back_to_description() {
        let topic = Topic::new("T", "Only a description");
        let prompt = EvaluationPrompt::build(&topic, "x");
        assert!(prompt
            .content()
            .contains("CONTEXT FROM STUDY MATERIAL:\nOnly a description"));
    }
}
