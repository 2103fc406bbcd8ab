use crate::handlers::{health, matching, session, ws};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/match", post(matching::submit_match))
        .route("/cancel", post(matching::cancel_match))
        .route("/confirm", post(matching::confirm_match))
        .route("/session/{id}", get(session::get_session))
        .route("/queues", get(session::queue_stats))
        .route("/ws", get(ws::ws_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
