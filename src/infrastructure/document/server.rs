//! Companion server PDF parsing adapter

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::application::ports::{DocumentError, DocumentReader};
use crate::domain::artifact::Artifact;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ParsePdfRequest {
    base64_data: String,
}

#[derive(Debug, Deserialize)]
struct ParsePdfResponse {
    text: Option<String>,
    error: Option<String>,
}

/// Sends PDFs to the companion server's `/api/parse-pdf` endpoint, which
/// answers with the text of every page joined by newlines
pub struct ServerDocumentReader {
    base_url: String,
    client: reqwest::Client,
}

impl ServerDocumentReader {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn api_url(&self) -> String {
        format!("{}/api/parse-pdf", self.base_url)
    }
}

#[async_trait]
impl DocumentReader for ServerDocumentReader {
    async fn read_text(&self, document: &Artifact) -> Result<String, DocumentError> {
        let body = ParsePdfRequest {
            base64_data: document.to_base64(),
        };

        let response = self
            .client
            .post(self.api_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| DocumentError::RequestFailed(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| DocumentError::RequestFailed(e.to_string()))?;
        let parsed = serde_json::from_str::<ParsePdfResponse>(&text);

        if !status.is_success() {
            let message = parsed
                .ok()
                .and_then(|p| p.error)
                .unwrap_or_else(|| text.trim().to_string());
            return Err(DocumentError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let parsed = parsed.map_err(|e| DocumentError::ParseError(e.to_string()))?;
        match (parsed.text, parsed.error) {
            (Some(text), _) => Ok(text),
            (None, Some(error)) => Err(DocumentError::Upstream {
                status: status.as_u16(),
                message: error,
            }),
            (None, None) => Err(DocumentError::ParseError("response has no text".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_uses_camel_case_field() {
        let body = ParsePdfRequest {
            base64_data: "AQID".into(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["base64Data"], "AQID");
    }

    #[test]
    fn url_joins_path() {
        let reader = ServerDocumentReader::new("http://localhost:3001/");
        assert_eq!(reader.api_url(), "http://localhost:3001/api/parse-pdf");
    }
}
