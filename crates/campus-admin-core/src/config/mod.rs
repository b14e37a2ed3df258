//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! an optional TOML file overlaid with `CAMPUS_ADMIN__*` environment
//! variables. Each sub-module is one configuration section.

pub mod api;
pub mod logging;
pub mod realtime;

use serde::{Deserialize, Serialize};

use self::api::ApiConfig;
use self::logging::LoggingConfig;
use self::realtime::RealtimeConfig;

use crate::error::AppError;

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "CAMPUS_ADMIN";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Backend REST API settings.
    #[serde(default)]
    pub api: ApiConfig,
    /// Push-channel settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file and the environment.
    ///
    /// The file is optional; every field falls back to its development
    /// default. Environment variables such as
    /// `CAMPUS_ADMIN__REALTIME__WS_URL` override file values.
    pub fn load(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values the client cannot work with.
    pub fn validate(&self) -> Result<(), AppError> {
        let ws = url::Url::parse(&self.realtime.ws_url).map_err(|e| {
            AppError::configuration(format!(
                "realtime.ws_url '{}' is not a valid URL: {e}",
                self.realtime.ws_url
            ))
        })?;
        if !matches!(ws.scheme(), "ws" | "wss") {
            return Err(AppError::configuration(format!(
                "realtime.ws_url must use ws:// or wss://, got '{}'",
                ws.scheme()
            )));
        }

        url::Url::parse(&self.api.base_url).map_err(|e| {
            AppError::configuration(format!(
                "api.base_url '{}' is not a valid URL: {e}",
                self.api.base_url
            ))
        })?;

        if self.realtime.max_frame_bytes == 0 {
            return Err(AppError::configuration(
                "realtime.max_frame_bytes must be greater than zero",
            ));
        }

        if self.logging.level.trim().is_empty() {
            return Err(AppError::configuration("logging.level must not be empty"));
        }

        Ok(())
    }
}
