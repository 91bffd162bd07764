//! Application configuration structs
//!
//! Loads configuration from environment variables (with a `.env` file picked
//! up in development builds and tests).

use serde::Deserialize;
use std::env;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub rest: RestConfig,
    pub realtime: RealtimeConfig,
    pub reconnect: ReconnectConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// REST backend configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RestConfig {
    /// Base URL of the REST backend, e.g. `https://api.matchpoint.app`
    pub base_url: String,
    #[serde(default = "default_rest_timeout_secs")]
    pub timeout_secs: u64,
    /// Page size for room-list and message-history requests
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl RestConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Realtime channel configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RealtimeConfig {
    /// WebSocket upgrade URL, e.g. `wss://api.matchpoint.app/ws/websocket`
    pub url: String,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Per-room subscribe destination prefix; the room id is appended
    #[serde(default = "default_topic_prefix")]
    pub topic_prefix: String,
    /// Fixed application destination for outgoing messages
    #[serde(default = "default_send_destination")]
    pub send_destination: String,
}

impl RealtimeConfig {
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Subscribe destination for one room
    #[must_use]
    pub fn room_topic(&self, room_id: i64) -> String {
        format!("{}/{room_id}", self.topic_prefix)
    }
}

/// Reconnection backoff configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ReconnectConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl ReconnectConfig {
    #[must_use]
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    #[must_use]
    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "matchpoint".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_rest_timeout_secs() -> u64 {
    10
}

fn default_page_size() -> u32 {
    20
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_topic_prefix() -> String {
    "/topic/chat/room".to_string()
}

fn default_send_destination() -> String {
    "/app/chat/message".to_string()
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    10000
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| default_app_name()),
                env: env::var("APP_ENV")
                    .ok()
                    .and_then(|s| match s.to_lowercase().as_str() {
                        "production" => Some(Environment::Production),
                        "staging" => Some(Environment::Staging),
                        "development" => Some(Environment::Development),
                        _ => None,
                    })
                    .unwrap_or_default(),
            },
            rest: RestConfig {
                base_url: env::var("API_BASE_URL")
                    .map_err(|_| ConfigError::MissingVar("API_BASE_URL"))?,
                timeout_secs: env::var("API_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_rest_timeout_secs),
                page_size: env::var("API_PAGE_SIZE")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_page_size),
            },
            realtime: RealtimeConfig {
                url: env::var("WS_URL").map_err(|_| ConfigError::MissingVar("WS_URL"))?,
                connect_timeout_secs: env::var("WS_CONNECT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_connect_timeout_secs),
                topic_prefix: env::var("WS_TOPIC_PREFIX")
                    .unwrap_or_else(|_| default_topic_prefix()),
                send_destination: env::var("WS_SEND_DESTINATION")
                    .unwrap_or_else(|_| default_send_destination()),
            },
            reconnect: ReconnectConfig {
                max_retries: env::var("RECONNECT_MAX_RETRIES")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_max_retries),
                base_delay_ms: env::var("RECONNECT_BASE_DELAY_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_base_delay_ms),
                max_delay_ms: env::var("RECONNECT_MAX_DELAY_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_max_delay_ms),
            },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
