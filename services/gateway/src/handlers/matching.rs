use crate::collaboration;
use crate::error::AppError;
use crate::state::AppState;
use crate::ticker::now_millis;
use axum::{extract::State, http::StatusCode, Json};
use matching_engine::{ConfirmStatus, SubmitOutcome};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use types::ids::{SessionId, UserId};
use types::request::MatchSubmission;
use types::session::MatchQuality;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResponse {
    pub matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partner_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_quality: Option<MatchQuality>,
    pub message: String,
}

impl From<SubmitOutcome> for MatchResponse {
    fn from(outcome: SubmitOutcome) -> Self {
        match outcome {
            SubmitOutcome::Queued { difficulty, position } => Self {
                matched: false,
                session_id: None,
                partner_id: None,
                match_quality: None,
                message: format!(
                    "Added to {} queue at position {}, waiting for a match",
                    difficulty,
                    position + 1
                ),
            },
            SubmitOutcome::Matched {
                session_id,
                partner_id,
                quality,
                ..
            } => Self {
                matched: true,
                session_id: Some(session_id),
                partner_id: Some(partner_id),
                match_quality: Some(quality),
                message: "Match found, waiting for both sides to confirm".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelRequest {
    #[serde(default)]
    pub user_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub session_id: String,
    pub accepted: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmResponse {
    pub status: ConfirmStatus,
    pub session_id: SessionId,
}

fn parse_user(raw: &str) -> Result<UserId, AppError> {
    UserId::try_new(raw).ok_or_else(|| AppError::BadRequest("userId is required".into()))
}

pub async fn submit_match(
    State(state): State<AppState>,
    Json(payload): Json<MatchSubmission>,
) -> Result<Json<MatchResponse>, AppError> {
    if let Some(user_id) = payload.user_id.as_deref().and_then(UserId::try_new) {
        state
            .rate_limiter
            .check_match_request(user_id.as_str(), state.match_requests_per_minute)?;
    }

    let outcome = state.engine.lock().await.submit(payload, now_millis())?;
    Ok(Json(MatchResponse::from(outcome)))
}

pub async fn cancel_match(
    State(state): State<AppState>,
    Json(payload): Json<CancelRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let user_id = parse_user(&payload.user_id)?;

    let cancelled = state.engine.lock().await.cancel(&user_id, now_millis());
    if cancelled {
        Ok((StatusCode::OK, Json(json!({ "cancelled": true }))))
    } else {
        Ok((
            StatusCode::NOT_FOUND,
            Json(json!({
                "cancelled": false,
                "message": "No waiting request or pending match for this user"
            })),
        ))
    }
}

pub async fn confirm_match(
    State(state): State<AppState>,
    Json(payload): Json<ConfirmRequest>,
) -> Result<Json<ConfirmResponse>, AppError> {
    let user_id = parse_user(&payload.user_id)?;
    // A malformed id cannot name a pending session
    let session_id: SessionId = payload
        .session_id
        .trim()
        .parse()
        .map_err(|_| AppError::NotFound(format!("Session not found: {}", payload.session_id)))?;

    let outcome = state
        .engine
        .lock()
        .await
        .confirm(&user_id, session_id, payload.accepted, now_millis())?;

    if let Some(handoff) = outcome.handoff {
        collaboration::dispatch(state.session_sink.clone(), handoff);
    }

    Ok(Json(ConfirmResponse {
        status: outcome.status,
        session_id,
    }))
}
