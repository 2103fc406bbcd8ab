//! Hand-off of finalized sessions to the collaboration service
//!
//! Best effort: the session already exists in the engine, so failures
//! here are logged and never undone. A session with no question is not
//! posted at all.

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use matching_engine::SessionHandoff;
use reqwest::{Client, Url};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Receives every finalized session
#[async_trait]
pub trait SessionSink: Send + Sync {
    async fn session_created(&self, handoff: SessionHandoff) -> anyhow::Result<()>;
}

/// Used when no collaboration service is configured
pub struct LoggingSink;

#[async_trait]
impl SessionSink for LoggingSink {
    async fn session_created(&self, handoff: SessionHandoff) -> anyhow::Result<()> {
        info!(
            session_id = %handoff.session_id,
            difficulty = %handoff.difficulty,
            "Session ready, no collaboration service configured"
        );
        Ok(())
    }
}

/// HTTP client for the question and collaboration services
pub struct HttpCollaborationClient {
    http: Client,
    collaboration_url: String,
    question_service_url: Option<String>,
    internal_token: Option<String>,
}

impl HttpCollaborationClient {
    pub fn new(
        http: Client,
        collaboration_url: String,
        question_service_url: Option<String>,
        internal_token: Option<String>,
    ) -> Self {
        Self {
            http,
            collaboration_url: collaboration_url.trim_end_matches('/').to_string(),
            question_service_url: question_service_url.map(|url| url.trim_end_matches('/').to_string()),
            internal_token,
        }
    }

    /// A random question on the matched topics, or on the difficulty alone
    async fn fetch_question(&self, handoff: &SessionHandoff) -> Option<Value> {
        let base = self.question_service_url.as_deref()?;
        let endpoint = format!("{}/api/questions/random", base);
        let difficulty = handoff.difficulty.as_str();
        let topics = handoff.matched_topics.join(",");

        let attempts = [
            Url::parse_with_params(&endpoint, [("difficulty", difficulty), ("topics", topics.as_str())]),
            Url::parse_with_params(&endpoint, [("difficulty", difficulty)]),
        ];
        for url in attempts {
            let url = match url {
                Ok(url) => url,
                Err(err) => {
                    warn!(error = %err, "Invalid question service URL");
                    return None;
                }
            };
            match self.get_json(url.clone()).await {
                Ok(question) => return Some(question),
                Err(err) => debug!(%url, error = %err, "Question lookup failed"),
            }
        }

        None
    }

    async fn get_json(&self, url: Url) -> anyhow::Result<Value> {
        let mut request = self.http.get(url);
        if let Some(token) = &self.internal_token {
            request = request.header("x-internal-token", token);
        }
        let response = request.send().await?.error_for_status()?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl SessionSink for HttpCollaborationClient {
    async fn session_created(&self, handoff: SessionHandoff) -> anyhow::Result<()> {
        let Some(question) = self.fetch_question(&handoff).await else {
            warn!(session_id = %handoff.session_id, "No question found for session, skipping hand-off");
            return Err(anyhow!("no question available for session {}", handoff.session_id));
        };
        let body = handoff_body(&handoff, question);

        let mut request = self
            .http
            .post(format!("{}/matches", self.collaboration_url))
            .json(&body);
        if let Some(token) = &self.internal_token {
            request = request.header("x-internal-token", token);
        }

        request
            .send()
            .await
            .context("collaboration service unreachable")?
            .error_for_status()
            .context("collaboration service rejected the session")?;

        info!(session_id = %handoff.session_id, "Session handed to collaboration service");
        Ok(())
    }
}

/// Request body for `POST /matches`
pub fn handoff_body(handoff: &SessionHandoff, question: Value) -> Value {
    let users: Vec<Value> = handoff
        .participant_user_ids
        .iter()
        .map(|id| json!({ "id": id }))
        .collect();

    json!({
        "sessionId": handoff.session_id,
        "users": users,
        "matchedTopics": handoff.matched_topics,
        "difficulty": handoff.difficulty,
        "question": question,
    })
}

/// Run the hand-off in the background, off the engine lock
pub fn dispatch(sink: Arc<dyn SessionSink>, handoff: SessionHandoff) {
    tokio::spawn(async move {
        let session_id = handoff.session_id;
        if let Err(err) = sink.session_created(handoff).await {
            warn!(%session_id, error = %err, "Collaboration hand-off failed");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::difficulty::Difficulty;
    use types::ids::{SessionId, UserId};

    fn handoff() -> SessionHandoff {
        SessionHandoff {
            session_id: SessionId::new(),
            participant_user_ids: [UserId::new("u1"), UserId::new("u2")],
            matched_topics: vec!["arrays".to_string()],
            difficulty: Difficulty::Medium,
        }
    }

    #[test]
    fn test_handoff_body_shape() {
        let handoff = handoff();

        let body = handoff_body(&handoff, json!({"title": "Two Sum"}));
        assert_eq!(body["sessionId"], handoff.session_id.to_string());
        assert_eq!(body["users"][1]["id"], "u2");
        assert_eq!(body["matchedTopics"][0], "arrays");
        assert_eq!(body["difficulty"], "medium");
        assert_eq!(body["question"]["title"], "Two Sum");
    }

    #[tokio::test]
    async fn test_session_without_question_is_not_posted() {
        // No question service configured, so the lookup yields nothing and
        // the collaboration URL is never contacted
        let client = HttpCollaborationClient::new(
            Client::new(),
            "http://127.0.0.1:9".to_string(),
            None,
            None,
        );

        let err = client.session_created(handoff()).await.unwrap_err();
        assert!(err.to_string().contains("no question available"));
    }
}
