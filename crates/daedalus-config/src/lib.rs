//! Typed configuration for Daedalus.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict parsing (unknown fields are errors)
//!
//! # Configuration File Format
//!
//! ```toml
//! [http]
//! custom_stage = "v1"
//! disable_cors = false
//! cors_allow_origin = "*"
//! request_id_header = "X-REQUEST-ID"
//! default_error_message = "Internal Server Error"
//! default_timeout_ms = 10000
//! background_submission_path = "/jobs"
//! background_meta_path = "/meta/jobs"
//!
//! [background]
//! mode = "remote"
//! path_prefix = "jobs"
//! queue_url = "https://queue.example.com/jobs"
//! notification_address = "arn:example:topic:jobs"
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Values can be overridden with `PREFIX__SECTION__KEY` variables:
//!
//! - `DAEDALUS__HTTP__DISABLE_CORS=true`
//! - `DAEDALUS__BACKGROUND__MODE=local`
//! - `DAEDALUS__LOGGING__LEVEL=debug`
//!
//! An empty value clears an optional setting.

#![doc(html_root_url = "https://docs.rs/daedalus-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::DaedalusConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{
    BackgroundMode, BackgroundSection, HttpConfig, LoggingConfig, DEFAULT_CORS_ALLOW_HEADERS,
};

pub use daedalus_telemetry::LogFormat;
