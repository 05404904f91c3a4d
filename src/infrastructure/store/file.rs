//! JSON file topic repository

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use crate::application::ports::{PersistenceError, TopicRepository};
use crate::domain::identity::Identity;
use crate::domain::topic::TopicSet;

/// One JSON document per identity under the user data directory
pub struct FileTopicRepository {
    dir: PathBuf,
}

impl FileTopicRepository {
    /// Store under `$XDG_DATA_HOME/study-voice/topics`
    pub fn new() -> Self {
        let dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("study-voice")
            .join("topics");
        Self { dir }
    }

    /// Store under a custom directory
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    /// File holding an identity's topics
    pub fn path_for(&self, identity: &Identity) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(identity.subject())))
    }
}

impl Default for FileTopicRepository {
    fn default() -> Self {
        Self::new()
    }
}

/// Subject encoded into a file name.
///
/// Lowercase ASCII letters, digits and `-_@.` are kept; every other byte
/// (including `%`, uppercase letters and a leading dot) becomes `%XX`, so
/// distinct subjects never share a file, even on case-insensitive filesystems.
fn file_stem(subject: &str) -> String {
    if subject.is_empty() {
        return "%".to_string();
    }
    let mut stem = String::with_capacity(subject.len());
    for (i, byte) in subject.bytes().enumerate() {
        let keep = matches!(byte, b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'@')
            || (byte == b'.' && i > 0);
        if keep {
            stem.push(char::from(byte));
        } else {
            stem.push_str(&format!("%{:02X}", byte));
        }
    }
    stem
}

#[async_trait]
impl TopicRepository for FileTopicRepository {
    async fn load(&self, identity: &Identity) -> Result<TopicSet, PersistenceError> {
        let path = self.path_for(identity);
        if !path.exists() {
            return Ok(TopicSet::new());
        }

        let content = fs::read_to_string(&path)
            .await
            .map_err(|e| PersistenceError::ReadFailed(format!("{}: {}", path.display(), e)))?;

        serde_json::from_str(&content)
            .map_err(|e| PersistenceError::Corrupt(format!("{}: {}", path.display(), e)))
    }

    async fn save(&self, identity: &Identity, topics: &TopicSet) -> Result<(), PersistenceError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| PersistenceError::WriteFailed(e.to_string()))?;

        let content = serde_json::to_string_pretty(topics)
            .map_err(|e| PersistenceError::WriteFailed(e.to_string()))?;

        let path = self.path_for(identity);
        fs::write(&path, content)
            .await
            .map_err(|e| PersistenceError::WriteFailed(format!("{}: {}", path.display(), e)))
    }
}
