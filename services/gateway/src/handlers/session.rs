use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use matching_engine::EngineStats;
use types::ids::SessionId;
use types::session::Session;

pub async fn get_session(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Session>, AppError> {
    let not_found = || AppError::NotFound(format!("Session not found: {}", raw_id));

    let session_id: SessionId = raw_id.parse().map_err(|_| not_found())?;
    let session = state
        .engine
        .lock()
        .await
        .session(&session_id)
        .cloned()
        .ok_or_else(not_found)?;

    Ok(Json(session))
}

pub async fn queue_stats(State(state): State<AppState>) -> Json<EngineStats> {
    Json(state.engine.lock().await.stats())
}
