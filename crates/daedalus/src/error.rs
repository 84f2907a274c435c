//! Startup errors.

use daedalus_config::ConfigError;
use daedalus_core::DispatchError;
use daedalus_tasks::TaskError;
use daedalus_telemetry::TelemetryError;
use thiserror::Error;

/// Result type for instance construction.
pub type BootstrapResult<T> = Result<T, BootstrapError>;

/// Errors that prevent an [`Instance`](crate::Instance) from starting.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// The configuration failed to load or validate.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The background job setup is unusable.
    #[error("background setup error: {0}")]
    Task(#[from] TaskError),

    /// The dispatcher could not be built.
    #[error("dispatcher setup error: {0}")]
    Dispatch(#[from] DispatchError),

    /// A configured header name or value is not valid HTTP.
    #[error("invalid header setting {field}: {message}")]
    InvalidHeader {
        /// Configuration field holding the value.
        field: String,
        /// Parser message.
        message: String,
    },

    /// Logging could not be installed.
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
}

impl BootstrapError {
    /// Creates an invalid header error.
    pub fn invalid_header(field: impl Into<String>, message: impl ToString) -> Self {
        Self::InvalidHeader {
            field: field.into(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wraps_task_error() {
        let err: BootstrapError = TaskError::invalid_config("No processes specified").into();
        assert!(matches!(err, BootstrapError::Task(_)));
        assert!(err.to_string().contains("No processes specified"));
    }

    #[test]
    fn test_invalid_header_display() {
        let err = BootstrapError::invalid_header("http.cors_allow_origin", "bad byte");
        assert_eq!(
            err.to_string(),
            "invalid header setting http.cors_allow_origin: bad byte"
        );
    }
}
