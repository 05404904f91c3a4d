//! Topic persistence facade

use tracing::{debug, error, warn};

use super::guard::CallGuard;
use super::ports::{PersistenceError, TopicRepository};
use crate::domain::identity::Identity;
use crate::domain::topic::TopicSet;

/// Cache-style facade over a topic repository.
///
/// Missing or unreadable saved topics are not an error for the caller:
/// `load` degrades to an empty set. Save failures are reported (and
/// logged) so the caller can tell the user, but nothing is rolled back.
pub struct TopicStore<R: TopicRepository> {
    repository: R,
    guard: CallGuard,
}

impl<R: TopicRepository> TopicStore<R> {
    pub fn new(repository: R, guard: CallGuard) -> Self {
        Self { repository, guard }
    }

    /// Saved topics for the identity, or an empty set when none can be read
    pub async fn load(&self, identity: &Identity) -> TopicSet {
        match self.guard.run(self.repository.load(identity)).await {
            Ok(topics) => {
                debug!(identity = %identity, count = topics.len(), "loaded topics");
                topics
            }
            Err(e) => {
                warn!(identity = %identity, error = %e, "could not load saved topics, starting empty");
                TopicSet::new()
            }
        }
    }

    pub async fn save(&self, identity: &Identity, topics: &TopicSet) -> Result<(), PersistenceError> {
        self.guard
            .run(self.repository.save(identity, topics))
            .await
            .map_err(|e| {
                error!(identity = %identity, error = %e, "failed to save topics; saved state is stale");
                e
            })
    }

    pub async fn clear(&self, identity: &Identity) -> Result<(), PersistenceError> {
        self.guard
            .run(self.repository.clear(identity))
            .await
            .map_err(|e| {
                error!(identity = %identity, error = %e, "failed to clear saved topics");
                e
            })
    }
}
