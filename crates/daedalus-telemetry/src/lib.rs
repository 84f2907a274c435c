//! Logging setup for Daedalus.
//!
//! Every Daedalus crate logs through [`tracing`] macros with structured
//! fields. This crate installs the subscriber that turns those events into
//! output: JSON lines in production, a pretty multi-line layout during
//! development.
//!
//! ```text
//! tracing::info!(...) ──► EnvFilter (RUST_LOG, else level) ──► fmt layer ──► stdout
//! ```
//!
//! # Example
//!
//! ```
//! use daedalus_telemetry::{init_logging, LogConfig};
//!
//! let config = LogConfig::development();
//! // A second call fails because a global subscriber is already set.
//! let _ = init_logging(&config);
//!
//! tracing::info!(entry_type = "Echo", "entry queued");
//! ```

#![doc(html_root_url = "https://docs.rs/daedalus-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, fields, init_logging, LogConfig, LogFormat};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
