//! Layered configuration loading.
//!
//! Layers apply in order, later ones winning:
//! 1. Built-in defaults (or a preset)
//! 2. A TOML or JSON file, or an inline string
//! 3. Environment variables named `PREFIX__SECTION__KEY`

use std::env;
use std::fs;
use std::path::Path;

use crate::{BackgroundMode, ConfigError, DaedalusConfig};
use daedalus_telemetry::LogFormat;

/// Configuration loader.
///
/// # Example
///
/// ```no_run
/// use daedalus_config::ConfigLoader;
///
/// # fn main() -> Result<(), daedalus_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_defaults()
///     .with_dotenv()?
///     .with_file("daedalus.toml")?
///     .with_env_prefix("DAEDALUS")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config: DaedalusConfig,
    env_prefix: Option<String>,
    file_loaded: bool,
}

impl ConfigLoader {
    /// Creates a loader holding the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets to the default configuration.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = DaedalusConfig::default();
        self
    }

    /// Starts from the development preset.
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = DaedalusConfig::development();
        self
    }

    /// Starts from the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = DaedalusConfig::production();
        self
    }

    /// Loads a `.toml` or `.json` file, chosen by extension.
    ///
    /// The file replaces the current configuration; sections and fields it
    /// omits take their defaults.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        self.config = Self::parse_file(&content, path)?;
        self.file_loaded = true;

        Ok(self)
    }

    /// Loads a file if it exists.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Loads configuration from a string in the given format (`toml` or
    /// `json`).
    ///
    /// ```
    /// use daedalus_config::ConfigLoader;
    ///
    /// let toml = r#"
    ///     [http]
    ///     custom_stage = "v1"
    /// "#;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string(toml, "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.http.custom_stage.as_deref(), Some("v1"));
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            _ => {
                return Err(ConfigError::validation_error(format!(
                    "unsupported configuration format: {format}"
                )))
            }
        };
        Ok(self)
    }

    /// Enables environment overrides, e.g. `DAEDALUS__HTTP__DISABLE_CORS=true`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Loads a `.env` file into the process environment, if one exists.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if e.not_found() => Ok(self),
            Err(e) => Err(ConfigError::validation_error(format!(
                "failed to load .env file: {e}"
            ))),
        }
    }

    /// Returns whether a file has been loaded.
    #[must_use]
    pub fn file_loaded(&self) -> bool {
        self.file_loaded
    }

    /// Applies environment overrides, validates, and returns the config.
    pub fn load(mut self) -> Result<DaedalusConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }

        self.config.validate()?;

        Ok(self.config)
    }

    /// Returns the configuration without env overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> DaedalusConfig {
        self.config
    }

    fn parse_file(content: &str, path: &Path) -> Result<DaedalusConfig, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("toml") => Ok(toml::from_str(content)?),
            Some("json") => Ok(serde_json::from_str(content)?),
            _ => Err(ConfigError::validation_error(format!(
                "unsupported configuration file format: {}",
                path.display()
            ))),
        }
    }

    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let marker = format!("{prefix}__");
        let mut vars: Vec<(String, String)> =
            env::vars().filter(|(k, _)| k.starts_with(&marker)).collect();
        vars.sort();

        for (key, value) in vars {
            self.apply_env_var(&key, &value, prefix)?;
        }

        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let key_without_prefix = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::env_parse_error(key, "invalid key format"))?;

        let parts: Vec<&str> = key_without_prefix.split("__").collect();
        let http = &mut self.config.http;
        let background = &mut self.config.background;
        let logging = &mut self.config.logging;

        match parts.as_slice() {
            ["HTTP", "CUSTOM_STAGE"] => http.custom_stage = optional(value),
            ["HTTP", "DISABLE_CORS"] => http.disable_cors = require_bool(key, value)?,
            ["HTTP", "CORS_ALLOW_ORIGIN"] => http.cors_allow_origin = value.to_string(),
            ["HTTP", "CORS_ALLOW_HEADERS"] => http.cors_allow_headers = value.to_string(),
            ["HTTP", "CORS_ALLOW_METHODS"] => http.cors_allow_methods = optional(value),
            ["HTTP", "REQUEST_ID_HEADER"] => http.request_id_header = value.to_string(),
            ["HTTP", "DEFAULT_ERROR_MESSAGE"] => http.default_error_message = value.to_string(),
            ["HTTP", "DEFAULT_TIMEOUT_MS"] => {
                http.default_timeout_ms = value
                    .parse()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))?;
            }
            ["HTTP", "BACKGROUND_SUBMISSION_PATH"] => {
                http.background_submission_path = optional(value);
            }
            ["HTTP", "BACKGROUND_META_PATH"] => http.background_meta_path = optional(value),

            ["BACKGROUND", "MODE"] => {
                background.mode = match value.to_lowercase().as_str() {
                    "local" => BackgroundMode::Local,
                    "remote" => BackgroundMode::Remote,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected 'local' or 'remote'",
                        ))
                    }
                };
            }
            ["BACKGROUND", "PATH_PREFIX"] => background.path_prefix = optional(value),
            ["BACKGROUND", "QUEUE_URL"] => background.queue_url = optional(value),
            ["BACKGROUND", "NOTIFICATION_ADDRESS"] => {
                background.notification_address = optional(value);
            }

            ["LOGGING", "ENABLED"] => logging.enabled = require_bool(key, value)?,
            ["LOGGING", "LEVEL"] => logging.level = value.to_string(),
            ["LOGGING", "FORMAT"] => {
                logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected 'json' or 'pretty'",
                        ))
                    }
                };
            }
            ["LOGGING", "ANSI_ENABLED"] => logging.ansi_enabled = require_bool(key, value)?,
            ["LOGGING", "INCLUDE_LOCATION"] => {
                logging.include_location = require_bool(key, value)?;
            }

            // Unknown keys are ignored.
            _ => {}
        }

        Ok(())
    }
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn require_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    parse_bool(value).ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loader_new() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config, DaedalusConfig::default());
    }

    #[test]
    fn test_loader_with_development() {
        let config = ConfigLoader::new().with_development().load().unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_loader_with_production() {
        let config = ConfigLoader::new().with_production().load().unwrap();
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_loader_with_string_toml() {
        let toml = r#"
            [http]
            disable_cors = true
            background_submission_path = "/jobs"

            [background]
            mode = "remote"
            queue_url = "https://queue.local/jobs"
            notification_address = "arn:topic:jobs"
        "#;

        let config = ConfigLoader::new()
            .with_string(toml, "toml")
            .unwrap()
            .load()
            .unwrap();

        assert!(config.http.disable_cors);
        assert_eq!(config.http.background_submission_path.as_deref(), Some("/jobs"));
        assert_eq!(config.background.mode, BackgroundMode::Remote);
        assert_eq!(
            config.background.notification_address.as_deref(),
            Some("arn:topic:jobs")
        );
    }

    #[test]
    fn test_loader_with_string_json() {
        let json = r#"{"http": {"custom_stage": "prod"}, "logging": {"format": "pretty"}}"#;

        let config = ConfigLoader::new()
            .with_string(json, "json")
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.http.custom_stage.as_deref(), Some("prod"));
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_loader_with_string_unsupported_format() {
        let result = ConfigLoader::new().with_string("http: {}", "yaml");
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_loader_rejects_unknown_field() {
        let toml = r#"
            [http]
            cors = false
        "#;
        let result = ConfigLoader::new().with_string(toml, "toml");
        assert!(matches!(result, Err(ConfigError::TomlError(_))));
    }

    #[test]
    fn test_loader_missing_file() {
        let result = ConfigLoader::new().with_file("/nonexistent/daedalus.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_loader_optional_missing_file() {
        let loader = ConfigLoader::new()
            .with_optional_file("/nonexistent/daedalus.toml")
            .unwrap();
        assert!(!loader.file_loaded());
    }

    #[test]
    fn test_env_var_http_overrides() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("DAEDALUS__HTTP__DISABLE_CORS", "yes", "DAEDALUS")
            .unwrap();
        loader
            .apply_env_var("DAEDALUS__HTTP__DEFAULT_TIMEOUT_MS", "2500", "DAEDALUS")
            .unwrap();
        loader
            .apply_env_var("DAEDALUS__HTTP__CUSTOM_STAGE", "v2", "DAEDALUS")
            .unwrap();
        loader
            .apply_env_var("DAEDALUS__HTTP__CORS_ALLOW_METHODS", "MATCH", "DAEDALUS")
            .unwrap();

        let config = loader.load_unvalidated();
        assert!(config.http.disable_cors);
        assert_eq!(config.http.default_timeout_ms, 2500);
        assert_eq!(config.http.custom_stage.as_deref(), Some("v2"));
        assert_eq!(config.http.cors_allow_methods.as_deref(), Some("MATCH"));
    }

    #[test]
    fn test_env_var_empty_clears_optional() {
        let mut loader = ConfigLoader::new()
            .with_string(r#"{"http": {"background_meta_path": "/meta/jobs"}}"#, "json")
            .unwrap();
        loader
            .apply_env_var("DAEDALUS__HTTP__BACKGROUND_META_PATH", "", "DAEDALUS")
            .unwrap();
        assert!(loader.load_unvalidated().http.background_meta_path.is_none());
    }

    #[test]
    fn test_env_var_background_and_logging() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("DAEDALUS__BACKGROUND__MODE", "Remote", "DAEDALUS")
            .unwrap();
        loader
            .apply_env_var("DAEDALUS__BACKGROUND__PATH_PREFIX", "jobs/", "DAEDALUS")
            .unwrap();
        loader
            .apply_env_var("DAEDALUS__LOGGING__FORMAT", "pretty", "DAEDALUS")
            .unwrap();
        loader
            .apply_env_var("DAEDALUS__LOGGING__LEVEL", "warn", "DAEDALUS")
            .unwrap();

        let config = loader.load_unvalidated();
        assert_eq!(config.background.mode, BackgroundMode::Remote);
        assert_eq!(config.background.path_prefix.as_deref(), Some("jobs/"));
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_env_var_parse_errors() {
        let mut loader = ConfigLoader::new();
        let err = loader
            .apply_env_var("DAEDALUS__HTTP__DISABLE_CORS", "maybe", "DAEDALUS")
            .unwrap_err();
        assert!(matches!(err, ConfigError::EnvParseError { ref reason, .. } if reason == "expected boolean"));

        let err = loader
            .apply_env_var("DAEDALUS__HTTP__DEFAULT_TIMEOUT_MS", "soon", "DAEDALUS")
            .unwrap_err();
        assert!(matches!(err, ConfigError::EnvParseError { ref reason, .. } if reason == "expected integer"));

        assert!(loader
            .apply_env_var("DAEDALUS__BACKGROUND__MODE", "cloud", "DAEDALUS")
            .is_err());
    }

    #[test]
    fn test_env_var_unknown_key_ignored() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("DAEDALUS__HTTP__NOPE", "x", "DAEDALUS")
            .unwrap();
        assert_eq!(loader.load_unvalidated(), DaedalusConfig::default());
    }

    #[test]
    fn test_env_var_invalid_key_format() {
        let mut loader = ConfigLoader::new();
        assert!(loader
            .apply_env_var("DAEDALUSHTTP", "x", "DAEDALUS")
            .is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("on"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("nah"), None);
    }
}
