//! Topic persistence port interface

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::identity::Identity;
use crate::domain::timing::Interrupted;
use crate::domain::topic::TopicSet;

/// Persistence errors
#[derive(Debug, Clone, Error)]
pub enum PersistenceError {
    #[error("Not authorized to access topics for this identity")]
    Unauthorized,

    #[error("Failed to read topics: {0}")]
    ReadFailed(String),

    #[error("Failed to write topics: {0}")]
    WriteFailed(String),

    #[error("Stored topics are unreadable: {0}")]
    Corrupt(String),

    #[error("Topic service error (HTTP {status}): {message}")]
    Http { status: u16, message: String },

    #[error("Topic persistence interrupted: {0}")]
    Interrupted(#[from] Interrupted),
}

/// Port for per-identity topic storage
#[async_trait]
pub trait TopicRepository: Send + Sync {
    /// Load the topic set saved for an identity (empty if none was saved)
    async fn load(&self, identity: &Identity) -> Result<TopicSet, PersistenceError>;

    /// Replace the topic set saved for an identity
    async fn save(&self, identity: &Identity, topics: &TopicSet) -> Result<(), PersistenceError>;

    /// Discard the identity's saved topics
    async fn clear(&self, identity: &Identity) -> Result<(), PersistenceError> {
        self.save(identity, &TopicSet::new()).await
    }
}

/// Shared repositories
#[async_trait]
impl<T: TopicRepository + ?Sized> TopicRepository for Arc<T> {
    async fn load(&self, identity: &Identity) -> Result<TopicSet, PersistenceError> {
        self.as_ref().load(identity).await
    }

    async fn save(&self, identity: &Identity, topics: &TopicSet) -> Result<(), PersistenceError> {
        self.as_ref().save(identity, topics).await
    }

    async fn clear(&self, identity: &Identity) -> Result<(), PersistenceError> {
        self.as_ref().clear(identity).await
    }
}
