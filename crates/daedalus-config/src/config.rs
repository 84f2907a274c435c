//! Root configuration type.

use daedalus_telemetry::{create_env_filter, LogFormat};
use serde::{Deserialize, Serialize};

use crate::{BackgroundSection, ConfigError, HttpConfig, LoggingConfig};

/// Complete Daedalus configuration.
///
/// # Example
///
/// ```
/// use daedalus_config::DaedalusConfig;
///
/// let config = DaedalusConfig::default();
/// assert!(config.validate().is_ok());
/// assert!(!config.http.disable_cors);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DaedalusConfig {
    /// HTTP dispatch settings.
    #[serde(default)]
    pub http: HttpConfig,

    /// Background job settings.
    #[serde(default)]
    pub background: BackgroundSection,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DaedalusConfig {
    /// Validates values serde cannot check on its own.
    ///
    /// Remote queue settings are checked together with the registered
    /// processors when an instance is built.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.default_timeout_ms == 0 {
            return Err(ConfigError::invalid_value(
                "http.default_timeout_ms",
                "must be greater than 0",
            ));
        }

        let header = &self.http.request_id_header;
        if header.is_empty()
            || !header
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return Err(ConfigError::invalid_value(
                "http.request_id_header",
                format!("not a valid header name: {header:?}"),
            ));
        }

        for (field, path) in [
            (
                "http.background_submission_path",
                &self.http.background_submission_path,
            ),
            ("http.background_meta_path", &self.http.background_meta_path),
        ] {
            if let Some(path) = path {
                if !path.starts_with('/') || path.len() < 2 {
                    return Err(ConfigError::invalid_value(
                        field,
                        format!("must be an absolute path below '/': {path}"),
                    ));
                }
            }
        }

        if self.http.background_submission_path.is_some()
            && self.http.background_submission_path == self.http.background_meta_path
        {
            return Err(ConfigError::invalid_value(
                "http.background_meta_path",
                "must differ from http.background_submission_path",
            ));
        }

        if self.logging.enabled {
            create_env_filter(&self.logging.level).map_err(|e| {
                ConfigError::invalid_value("logging.level", e.to_string())
            })?;
        }

        Ok(())
    }

    /// Development preset: pretty debug logs.
    ///
    /// ```
    /// use daedalus_config::DaedalusConfig;
    ///
    /// let config = DaedalusConfig::development();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.logging.ansi_enabled = true;
        config
    }

    /// Production preset: JSON info logs.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();
        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;
        config
    }
}
