//! Configuration schema types.
//!
//! Every section uses `#[serde(default)]` so a file only needs to name the
//! values it changes.

use daedalus_core::DEFAULT_ERROR_MESSAGE;
use daedalus_telemetry::{LogConfig, LogFormat};
use serde::{Deserialize, Serialize};

/// Default `Access-Control-Allow-Headers` value.
pub const DEFAULT_CORS_ALLOW_HEADERS: &str =
    "Authorization, Origin, X-Requested-With, Content-Type, Range";

/// HTTP dispatch configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpConfig {
    /// Stage prefix stripped from paths when the transport reports none.
    #[serde(default)]
    pub custom_stage: Option<String>,

    /// Turn off preflight answers and CORS response headers.
    #[serde(default)]
    pub disable_cors: bool,

    /// `Access-Control-Allow-Origin` value, or `MATCH` to echo the request.
    #[serde(default = "default_cors_allow_origin")]
    pub cors_allow_origin: String,

    /// `Access-Control-Allow-Headers` value, or `MATCH` to echo the request.
    #[serde(default = "default_cors_allow_headers")]
    pub cors_allow_headers: String,

    /// `Access-Control-Allow-Methods` value; omitted from responses if unset.
    #[serde(default)]
    pub cors_allow_methods: Option<String>,

    /// Header carrying the request ID.
    #[serde(default = "default_request_id_header")]
    pub request_id_header: String,

    /// Message reported in place of server-fault details.
    #[serde(default = "default_error_message")]
    pub default_error_message: String,

    /// Advisory handler timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub default_timeout_ms: u64,

    /// Path under which background jobs can be submitted over HTTP.
    #[serde(default)]
    pub background_submission_path: Option<String>,

    /// Path serving background queue metadata.
    #[serde(default)]
    pub background_meta_path: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            custom_stage: None,
            disable_cors: false,
            cors_allow_origin: default_cors_allow_origin(),
            cors_allow_headers: default_cors_allow_headers(),
            cors_allow_methods: None,
            request_id_header: default_request_id_header(),
            default_error_message: default_error_message(),
            default_timeout_ms: default_timeout_ms(),
            background_submission_path: None,
            background_meta_path: None,
        }
    }
}

fn default_cors_allow_origin() -> String {
    "*".to_string()
}

fn default_cors_allow_headers() -> String {
    DEFAULT_CORS_ALLOW_HEADERS.to_string()
}

fn default_request_id_header() -> String {
    "X-REQUEST-ID".to_string()
}

fn default_error_message() -> String {
    DEFAULT_ERROR_MESSAGE.to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

/// Where background jobs run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundMode {
    /// Process entries inline at submission.
    #[default]
    Local,
    /// Enqueue entries on a remote queue.
    Remote,
}

/// Background job configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackgroundSection {
    /// Local or remote processing.
    #[serde(default)]
    pub mode: BackgroundMode,

    /// Prefix for job storage paths.
    #[serde(default)]
    pub path_prefix: Option<String>,

    /// Remote queue address.
    #[serde(default)]
    pub queue_url: Option<String>,

    /// Address notified when an entry is enqueued.
    #[serde(default)]
    pub notification_address: Option<String>,
}

/// Logging configuration section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level or filter directive.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include ANSI color codes in output.
    #[serde(default)]
    pub ansi_enabled: bool,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            ansi_enabled: false,
            include_location: false,
        }
    }
}

impl LoggingConfig {
    /// Converts to the settings consumed by `daedalus_telemetry::init_logging`.
    #[must_use]
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            enabled: self.enabled,
            level: self.level.clone(),
            format: self.format,
            ansi: self.ansi_enabled,
            file_line_info: self.include_location,
            ..LogConfig::default()
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_defaults() {
        let http = HttpConfig::default();
        assert!(!http.disable_cors);
        assert_eq!(http.cors_allow_origin, "*");
        assert_eq!(http.cors_allow_headers, DEFAULT_CORS_ALLOW_HEADERS);
        assert_eq!(http.request_id_header, "X-REQUEST-ID");
        assert_eq!(http.default_error_message, "Internal Server Error");
        assert_eq!(http.default_timeout_ms, 10_000);
        assert!(http.background_submission_path.is_none());
    }

    #[test]
    fn test_http_partial_json_keeps_defaults() {
        let http: HttpConfig = serde_json::from_str(r#"{"custom_stage": "v1"}"#).unwrap();
        assert_eq!(http.custom_stage.as_deref(), Some("v1"));
        assert_eq!(http.default_timeout_ms, 10_000);
    }

    #[test]
    fn test_http_rejects_unknown_field() {
        let result: Result<HttpConfig, _> = serde_json::from_str(r#"{"stage": "v1"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_background_mode_serde() {
        let mode: BackgroundMode = serde_json::from_str(r#""remote""#).unwrap();
        assert_eq!(mode, BackgroundMode::Remote);
        assert_eq!(BackgroundSection::default().mode, BackgroundMode::Local);
    }

    #[test]
    fn test_logging_to_log_config() {
        let logging = LoggingConfig {
            level: "debug".to_string(),
            format: LogFormat::Pretty,
            ansi_enabled: true,
            include_location: true,
            ..LoggingConfig::default()
        };
        let log = logging.to_log_config();
        assert_eq!(log.level, "debug");
        assert_eq!(log.format, LogFormat::Pretty);
        assert!(log.ansi);
        assert!(log.file_line_info);
    }
}
