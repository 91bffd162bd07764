//! # matchpoint-common
//!
//! Shared utilities including configuration, error handling, credential
//! access, and telemetry.

pub mod auth;
pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::{decode_user_id, Claims, CredentialProvider, StaticCredentials};
pub use config::{
    AppConfig, AppSettings, ConfigError, Environment, RealtimeConfig, ReconnectConfig, RestConfig,
};
pub use error::{AppError, AppResult};
pub use telemetry::{
    init_tracing, init_tracing_with_config, try_init_tracing, try_init_tracing_with_config,
    TracingConfig, TracingError,
};
