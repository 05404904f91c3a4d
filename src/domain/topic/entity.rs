//! Topic entity and the per-session topic set

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use super::mastery::{Mastery, MasteryPolicy};
use crate::domain::artifact::char_prefix;

/// A named unit of study material the user practises explaining.
///
/// Serialized with the field names the persistence collaborator expects
/// (`name`, `description`, `mastery`, `fullText`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    mastery: Mastery,
    #[serde(
        rename = "fullText",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    source_text: Option<String>,
}

impl Topic {
    /// Create a fresh topic with zero mastery and no source text
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            description: description.into().trim().to_string(),
            mastery: Mastery::ZERO,
            source_text: None,
        }
    }

    /// Attach the full text the topic was derived from
    pub fn with_source_text(mut self, text: impl Into<String>) -> Self {
        self.source_text = Some(text.into());
        self
    }

    pub fn with_mastery(mut self, mastery: Mastery) -> Self {
        self.mastery = mastery;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn mastery(&self) -> Mastery {
        self.mastery
    }

    pub fn source_text(&self) -> Option<&str> {
        self.source_text.as_deref()
    }

    /// Context for evaluation: a bounded prefix of the source text,
    /// or the description when no usable source text exists.
    pub fn context(&self, max_chars: usize) -> &str {
        match self.source_text.as_deref() {
            Some(text) if !text.trim().is_empty() => char_prefix(text, max_chars),
            _ => &self.description,
        }
    }

    /// Key used for uniqueness within a set
    fn key(&self) -> String {
        normalize_name(&self.name)
    }
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Rejected insertion of a topic whose name is already taken
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Topic \"{name}\" already exists")]
pub struct DuplicateTopic {
    pub name: String,
}

/// The active topic set of one session. Names are unique
/// (compared trimmed and case-insensitively).
///
/// Deserialized sets go through the same checks as `dedup`: names are
/// trimmed, blank names and duplicates are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Topic>", into = "Vec<Topic>")]
pub struct TopicSet {
    topics: Vec<Topic>,
}

impl TopicSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set keeping the first topic of every name.
    /// Returns the set and the names that were dropped as duplicates.
    pub fn dedup(topics: Vec<Topic>) -> (Self, Vec<String>) {
        let mut set = Self::new();
        let mut dropped = Vec::new();
        for topic in topics {
            if let Err(dup) = set.insert(topic) {
                dropped.push(dup.name);
            }
        }
        (set, dropped)
    }

    /// Add a topic, rejecting name collisions
    pub fn insert(&mut self, topic: Topic) -> Result<(), DuplicateTopic> {
        if self.contains(topic.name()) {
            return Err(DuplicateTopic {
                name: topic.name,
            });
        }
        self.topics.push(topic);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Topic> {
        let key = normalize_name(name);
        self.topics.iter().find(|t| t.key() == key)
    }

    /// Merge an evaluation score into the named topic's mastery.
    /// Returns the new mastery, or `None` if the topic is unknown.
    pub fn record_score(&mut self, name: &str, score: u8, policy: MasteryPolicy) -> Option<Mastery> {
        let key = normalize_name(name);
        let topic = self.topics.iter_mut().find(|t| t.key() == key)?;
        topic.mastery = policy.merge(topic.mastery, score);
        Some(topic.mastery)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Topic> {
        self.topics.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.topics.iter().map(Topic::name).collect()
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn clear(&mut self) {
        self.topics.clear();
    }

    pub fn into_vec(self) -> Vec<Topic> {
        self.topics
    }
}

impl From<Vec<Topic>> for TopicSet {
    fn from(stored: Vec<Topic>) -> Self {
        let total = stored.len();
        let named: Vec<Topic> = stored
            .into_iter()
            .map(|mut topic| {
                topic.name = topic.name.trim().to_string();
                topic
            })
            .filter(|topic| !topic.name.is_empty())
            .collect();
        let blank = total - named.len();
        let (set, dropped) = Self::dedup(named);
        if blank > 0 {
            warn!(count = blank, "Dropped stored topics with blank names");
        }
        if !dropped.is_empty() {
            warn!(names = ?dropped, "Dropped stored topics with duplicate names");
        }
        set
    }
}

impl From<TopicSet> for Vec<Topic> {
    fn from(set: TopicSet) -> Self {
        set.topics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TopicSet {
        let (set, dropped) = TopicSet::dedup(vec![
            Topic::new("Photosynthesis", "Light to sugar"),
            Topic::new("Respiration", "Sugar to ATP"),
        ]);
        assert!(dropped.is_empty());
        set
    }

    #[test]
    fn new_topic_starts_at_zero() {
        let topic = Topic::new("  Cells ", " Basic unit ");
        assert_eq!(topic.name(), "Cells");
        assert_eq!(topic.description(), "Basic unit");
        assert_eq!(topic.mastery(), Mastery::ZERO);
        assert!(topic.source_text().is_none());
    }

    #[test]
    fn context_prefers_source_text() {
        let topic = Topic::new("A", "desc").with_source_text("abcdef");
        assert_eq!(topic.context(3), "abc");
    }

    #[test]
    fn context_falls_back_to_description() {
        assert_eq!(Topic::new("A", "desc").context(3), "desc");
        let blank = Topic::new("A", "desc").with_source_text("   ");
        assert_eq!(blank.context(3), "desc");
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let (set, dropped) = TopicSet::dedup(vec![
            Topic::new("Enzymes", "first"),
            Topic::new(" enzymes ", "second"),
            Topic::new("DNA", "third"),
        ]);
        assert_eq!(set.names(), vec!["Enzymes", "DNA"]);
        assert_eq!(dropped, vec!["enzymes".to_string()]);
        assert_eq!(set.get("ENZYMES").unwrap().description(), "first");
    }

    #[test]
    fn insert_rejects_collision() {
        let mut set = sample();
        let err = set.insert(Topic::new("photosynthesis", "again")).unwrap_err();
        assert_eq!(err.name, "photosynthesis");
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn record_score_keep_highest() {
        let mut set = sample();
        assert_eq!(
            set.record_score("Photosynthesis", 40, MasteryPolicy::KeepHighest),
            Some(Mastery::clamped(40))
        );
        set.record_score("Photosynthesis", 30, MasteryPolicy::KeepHighest);
        assert_eq!(set.get("Photosynthesis").unwrap().mastery().value(), 40);
        set.record_score("Photosynthesis", 70, MasteryPolicy::KeepHighest);
        assert_eq!(set.get("Photosynthesis").unwrap().mastery().value(), 70);
        // other topics untouched
        assert_eq!(set.get("Respiration").unwrap().mastery(), Mastery::ZERO);
    }

    #[test]
    fn record_score_unknown_topic() {
        let mut set = sample();
        assert!(set.record_score("Genetics", 50, MasteryPolicy::Overwrite).is_none());
    }

    #[test]
    fn serde_uses_wire_field_names() {
        let topic = Topic::new("Cells", "Units").with_source_text("full");
        let json = serde_json::to_value(&topic).unwrap();
        assert_eq!(json["name"], "Cells");
        assert_eq!(json["mastery"], 0);
        assert_eq!(json["fullText"], "full");

        let parsed: Topic =
            serde_json::from_str(r#"{"name":"X","description":"d","mastery":250}"#).unwrap();
        assert_eq!(parsed.mastery().value(), 100);
        assert!(parsed.source_text().is_none());
    }

    #[test]
    fn set_serializes_as_array() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(json.starts_with('['));
        let back: TopicSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), 2);
    }

    #[test]
    fn loaded_set_keeps_names_unique() {
        let set: TopicSet = serde_json::from_str(
            r#"[{"name":"Cells","mastery":40},{"name":" cells "},{"name":""},{"name":"  DNA "}]"#,
        )
        .unwrap();
        assert_eq!(set.names(), vec!["Cells", "DNA"]);
        assert_eq!(set.get("cells").unwrap().mastery().value(), 40);
    }

    #[test]
    fn record_score_after_load_hits_the_only_match() {
        let mut set: TopicSet =
            serde_json::from_str(r#"[{"name":"Cells"},{"name":"CELLS","mastery":90}]"#).unwrap();
        assert_eq!(set.len(), 1);
        set.record_score("cells", 55, MasteryPolicy::KeepHighest);
        assert_eq!(set.get("Cells").unwrap().mastery().value(), 55);
    }
}
