//! HTTP implementation of the remote store.
//!
//! Talks to the backend's three endpoints and unwraps the
//! `{success, data | error}` envelope. Any transport failure, non-success
//! envelope, or undecodable body maps onto [`RemoteStoreError`], which is
//! all the sync core needs to decide on its fallback.

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use tree_core::remote::Result;
use tree_core::{Note, NoteDraft, RemoteStats, RemoteStore, RemoteStoreError};

/// Wire envelope every endpoint wraps its payload in.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
}

#[derive(Clone)]
pub struct HttpRemote {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRemote {
    /// Point at the backend's API root, e.g. `http://localhost:3000/api`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    async fn get_enveloped<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        debug!("GET {}", self.url(endpoint));
        let response = self
            .client
            .get(self.url(endpoint))
            .send()
            .await
            .map_err(|e| RemoteStoreError::Transport(e.to_string()))?;
        let body = response
            .text()
            .await
            .map_err(|e| RemoteStoreError::Transport(e.to_string()))?;
        parse_envelope(&body)
    }
}

/// Unwrap the response envelope into its payload.
fn parse_envelope<T: DeserializeOwned>(body: &str) -> Result<T> {
    let envelope: Envelope<T> = serde_json::from_str(body)
        .map_err(|e| RemoteStoreError::MalformedResponse(e.to_string()))?;
    if !envelope.success {
        return Err(RemoteStoreError::Rejected(
            envelope.error.unwrap_or_else(|| "unknown error".into()),
        ));
    }
    envelope.data.ok_or_else(|| {
        RemoteStoreError::MalformedResponse("success response without data".into())
    })
}

#[async_trait]
impl RemoteStore for HttpRemote {
    async fn insert(&self, draft: NoteDraft) -> Result<Note> {
        debug!("POST {}", self.url("add-leaf"));
        let response = self
            .client
            .post(self.url("add-leaf"))
            .json(&draft)
            .send()
            .await
            .map_err(|e| RemoteStoreError::Transport(e.to_string()))?;
        let body = response
            .text()
            .await
            .map_err(|e| RemoteStoreError::Transport(e.to_string()))?;
        parse_envelope(&body)
    }

    async fn list_recent(&self) -> Result<Vec<Note>> {
        self.get_enveloped("get-leaves").await
    }

    async fn aggregate_counts(&self) -> Result<RemoteStats> {
        self.get_enveloped("stats").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_envelope_unwraps_data() {
        let notes: Vec<Note> = parse_envelope(
            r#"{"success": true, "data": [
                {"id": 1, "name": "Lan", "teacher": "Mr. Tran", "message": "Thank you",
                 "x": 120, "y": 300, "type": "heart", "gradient": "gradient-1",
                 "created_at": "2024-11-20T08:00:00Z"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].student_name, "Lan");
    }

    #[test]
    fn test_parse_envelope_failure_becomes_rejected() {
        let result: Result<Vec<Note>> =
            parse_envelope(r#"{"success": false, "error": "Failed to load leaves"}"#);
        match result {
            Err(RemoteStoreError::Rejected(message)) => {
                assert!(message.contains("Failed to load"));
            }
            other => panic!("expected Rejected, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_parse_envelope_garbage_is_malformed() {
        let result: Result<Vec<Note>> = parse_envelope("<html>502 Bad Gateway</html>");
        assert!(matches!(result, Err(RemoteStoreError::MalformedResponse(_))));
    }

    #[test]
    fn test_parse_envelope_success_without_data_is_malformed() {
        let result: Result<Vec<Note>> = parse_envelope(r#"{"success": true}"#);
        assert!(matches!(result, Err(RemoteStoreError::MalformedResponse(_))));
    }

    #[test]
    fn test_base_url_trailing_slash_is_normalized() {
        let remote = HttpRemote::new("http://localhost:3000/api/");
        assert_eq!(remote.url("stats"), "http://localhost:3000/api/stats");
    }
}
