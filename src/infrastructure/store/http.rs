//! Companion server topic persistence adapter

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::application::ports::{PersistenceError, TopicRepository};
use crate::domain::identity::Identity;
use crate::domain::topic::TopicSet;

#[derive(Debug, Serialize)]
struct SaveTopicsRequest<'a> {
    topics: &'a TopicSet,
}

#[derive(Debug, Deserialize)]
struct TopicsResponse {
    #[serde(default)]
    topics: TopicSet,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Stores topic sets on the companion server. The server keys them by the
/// bearer token's subject, so the identity must carry a token.
pub struct HttpTopicRepository {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTopicRepository {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn api_url(&self) -> String {
        format!("{}/api/topics", self.base_url)
    }

    fn token(identity: &Identity) -> Result<&str, PersistenceError> {
        identity.token().ok_or(PersistenceError::Unauthorized)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, PersistenceError> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(PersistenceError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or_else(|_| body.trim().to_string());
            return Err(PersistenceError::Http {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl TopicRepository for HttpTopicRepository {
    async fn load(&self, identity: &Identity) -> Result<TopicSet, PersistenceError> {
        let response = self
            .client
            .get(self.api_url())
            .bearer_auth(Self::token(identity)?)
            .send()
            .await
            .map_err(|e| PersistenceError::ReadFailed(e.to_string()))?;

        let response: TopicsResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| PersistenceError::Corrupt(e.to_string()))?;
        Ok(response.topics)
    }

    async fn save(&self, identity: &Identity, topics: &TopicSet) -> Result<(), PersistenceError> {
        let response = self
            .client
            .post(self.api_url())
            .bearer_auth(Self::token(identity)?)
            .json(&SaveTopicsRequest { topics })
            .send()
            .await
            .map_err(|e| PersistenceError::WriteFailed(e.to_string()))?;

        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::topic::Topic;

    #[test]
    fn save_body_wraps_topics() {
        let topics = TopicSet::dedup(vec![Topic::new("Cells", "Units").with_source_text("full")]).0;
        let json = serde_json::to_value(SaveTopicsRequest { topics: &topics }).unwrap();
        assert_eq!(json["topics"][0]["name"], "Cells");
        assert_eq!(json["topics"][0]["mastery"], 0);
        assert_eq!(json["topics"][0]["fullText"], "full");
    }

    #[test]
    fn response_without_topics_is_empty() {
        let parsed: TopicsResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.topics.is_empty());
    }

    #[tokio::test]
    async fn missing_token_is_unauthorized() {
        let repo = HttpTopicRepository::new("http://127.0.0.1:9");
        let err = repo.load(&Identity::new("ada")).await.unwrap_err();
        assert!(matches!(err, PersistenceError::Unauthorized));
    }
}
