//! In-memory topic repository

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::application::ports::{PersistenceError, TopicRepository};
use crate::domain::identity::Identity;
use crate::domain::topic::TopicSet;

/// Keyed map of identity subject to topic set, owned by whoever creates it
#[derive(Debug, Default)]
pub struct MemoryTopicRepository {
    topics: Mutex<HashMap<String, TopicSet>>,
}

impl MemoryTopicRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TopicRepository for MemoryTopicRepository {
    async fn load(&self, identity: &Identity) -> Result<TopicSet, PersistenceError> {
        let topics = self.topics.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(topics.get(identity.subject()).cloned().unwrap_or_default())
    }

    async fn save(&self, identity: &Identity, topics: &TopicSet) -> Result<(), PersistenceError> {
        self.topics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(identity.subject().to_string(), topics.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::topic::Topic;

    #[tokio::test]
    async fn identities_are_isolated() {
        let repo = MemoryTopicRepository::new();
        let ada = Identity::new("ada");
        let bob = Identity::new("bob");
        let topics = TopicSet::dedup(vec![Topic::new("Cells", "Units")]).0;

        repo.save(&ada, &topics).await.unwrap();
        assert_eq!(repo.load(&ada).await.unwrap(), topics);
        assert!(repo.load(&bob).await.unwrap().is_empty());

        repo.clear(&ada).await.unwrap();
        assert!(repo.load(&ada).await.unwrap().is_empty());
    }
}
