//! Client configuration: built-in defaults, then an optional TOML file, then
//! `INKIND_`-prefixed environment variables (`INKIND_BACKEND__BASE_URL`).

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub const ENV_PREFIX: &str = "INKIND_";
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(#[from] figment::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Parsed when the HTTP backend is built.
    pub base_url: String,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: Some(30),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Emit JSON lines instead of the human-readable format.
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// The layered provider stack. A missing file is skipped.
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment(path))
    }

    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        tracing::debug!(base_url = %config.backend.base_url, "configuration loaded");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_point_at_local_backend() {
        let config = AppConfig::from_figment(Figment::from(Serialized::defaults(
            AppConfig::default(),
        )))
        .unwrap();
        assert_eq!(config.backend.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.telemetry.log_level, "info");
        assert!(!config.telemetry.json);
    }

    #[test]
    fn toml_overrides_defaults_and_env_overrides_toml() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "inkind.toml",
                r#"
                [backend]
                base_url = "http://dashboard.local:9000/api"
                request_timeout_secs = 5

                [telemetry]
                json = true
                "#,
            )?;
            jail.set_env("INKIND_TELEMETRY__LOG_LEVEL", "debug");

            let config = AppConfig::load(Some(Path::new("inkind.toml")))
                .map_err(|err| err.to_string())?;
            assert_eq!(config.backend.base_url, "http://dashboard.local:9000/api");
            assert_eq!(config.backend.request_timeout_secs, Some(5));
            assert!(config.telemetry.json);
            assert_eq!(config.telemetry.log_level, "debug");
            Ok(())
        });
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        Jail::expect_with(|_jail| {
            let config = AppConfig::load(Some(Path::new("absent.toml")))
                .map_err(|err| err.to_string())?;
            assert_eq!(config, AppConfig::default());
            Ok(())
        });
    }

    #[test]
    fn malformed_timeout_is_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("INKIND_BACKEND__REQUEST_TIMEOUT_SECS", "soon");
            assert!(AppConfig::load(None).is_err());
            Ok(())
        });
    }
}
