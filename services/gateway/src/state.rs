use crate::collaboration::{HttpCollaborationClient, LoggingSink, SessionSink};
use crate::config::GatewayConfig;
use crate::notifier::ConnectionRegistry;
use crate::rate_limit::RateLimiter;
use matching_engine::MatchingEngine;
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    /// Single lock around all matching state
    pub engine: Arc<Mutex<MatchingEngine>>,
    pub connections: Arc<ConnectionRegistry>,
    pub session_sink: Arc<dyn SessionSink>,
    pub rate_limiter: Arc<RateLimiter>,
    pub match_requests_per_minute: u32,
}

impl AppState {
    pub fn new(config: &GatewayConfig) -> anyhow::Result<Self> {
        let connections = Arc::new(ConnectionRegistry::new());
        let engine = MatchingEngine::with_config(config.engine.clone(), connections.clone())?;

        let session_sink: Arc<dyn SessionSink> = match &config.collaboration_url {
            Some(url) => Arc::new(HttpCollaborationClient::new(
                Client::new(),
                url.clone(),
                config.question_service_url.clone(),
                config.internal_token.clone(),
            )),
            None => Arc::new(LoggingSink),
        };

        Ok(Self::from_parts(
            engine,
            connections,
            session_sink,
            config.match_requests_per_minute,
        ))
    }

    pub fn from_parts(
        engine: MatchingEngine,
        connections: Arc<ConnectionRegistry>,
        session_sink: Arc<dyn SessionSink>,
        match_requests_per_minute: u32,
    ) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
            connections,
            session_sink,
            rate_limiter: Arc::new(RateLimiter::new()),
            match_requests_per_minute,
        }
    }
}
