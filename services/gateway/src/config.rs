use matching_engine::MatchConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Gateway configuration
///
/// Read from an optional `matching.{toml,yaml,json}` file, then overridden
/// by `MATCHING_*` environment variables. Nested keys use `__`, e.g.
/// `MATCHING_ENGINE__WAIT_TIMEOUT_MS=90000`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Base URL of the collaboration service; hand-off is logged only when unset
    #[serde(default)]
    pub collaboration_url: Option<String>,

    /// Base URL of the question service used to pick a question on finalize
    #[serde(default)]
    pub question_service_url: Option<String>,

    /// Sent as `x-internal-token` on service-to-service calls
    #[serde(default)]
    pub internal_token: Option<String>,

    /// How often the engine's timers and sweep are driven
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Match submissions allowed per user per minute
    #[serde(default = "default_match_requests_per_minute")]
    pub match_requests_per_minute: u32,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub engine: MatchConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            collaboration_url: None,
            question_service_url: None,
            internal_token: None,
            tick_interval_ms: default_tick_interval_ms(),
            match_requests_per_minute: default_match_requests_per_minute(),
            log_level: default_log_level(),
            engine: MatchConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from environment variables and config files
    pub fn load() -> anyhow::Result<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("matching").required(false))
            .add_source(
                config::Environment::with_prefix("MATCHING")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: GatewayConfig = builder.build()?.try_deserialize()?;
        config.engine.validate()?;

        if config.collaboration_url.is_some() && config.internal_token.is_none() {
            tracing::warn!("collaboration_url set without internal_token; hand-off calls will be unauthenticated");
        }
        if config.collaboration_url.is_some() && config.question_service_url.is_none() {
            tracing::warn!("collaboration_url set without question_service_url; sessions will not be handed off");
        }

        Ok(config)
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.bind_addr, self.port);
        Ok(addr_str.parse()?)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3003
}

fn default_tick_interval_ms() -> u64 {
    250
}

fn default_match_requests_per_minute() -> u32 {
    20
}

fn default_log_level() -> String {
    "info".to_string()
}
