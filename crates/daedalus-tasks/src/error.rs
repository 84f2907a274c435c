//! Error types for background job operations.

use thiserror::Error;

/// Result type for background job operations.
pub type TaskResult<T> = Result<T, TaskError>;

/// Errors that can occur while registering, submitting or processing jobs.
#[derive(Debug, Error)]
pub enum TaskError {
    /// Processor registration or background configuration is invalid.
    ///
    /// Raised at startup; construction must not proceed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The queue or notification transport rejected a request.
    #[error("queue unavailable: {message}")]
    QueueUnavailable {
        /// What was being attempted.
        message: String,
        /// The transport failure.
        #[source]
        source: Option<anyhow::Error>,
    },

    /// No processor is registered for the type.
    #[error("no processor registered for type {0}")]
    UnknownProcessor(String),

    /// A job's data or metadata failed validation.
    #[error("invalid payload for {type_name}: {}", errors.join(", "))]
    InvalidPayload {
        /// The job type.
        type_name: String,
        /// Validation messages.
        errors: Vec<String>,
    },

    /// A storage path is not under the expected prefix.
    #[error("path {path} is not under prefix '{prefix}'")]
    InvalidJobPath {
        /// The normalized prefix.
        prefix: String,
        /// The offending path.
        path: String,
    },

    /// A job entry or message could not be (de)serialized.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A processor failed while running a job.
    #[error("processor {type_name} failed: {message}")]
    ProcessingFailed {
        /// The job type.
        type_name: String,
        /// Failure detail.
        message: String,
    },
}

impl TaskError {
    /// Create an invalid configuration error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }

    /// Create a queue unavailable error wrapping a transport failure.
    pub fn queue_unavailable(message: impl Into<String>, source: anyhow::Error) -> Self {
        Self::QueueUnavailable {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create an unknown processor error.
    pub fn unknown_processor(type_name: impl Into<String>) -> Self {
        Self::UnknownProcessor(type_name.into())
    }

    /// Create an invalid payload error.
    pub fn invalid_payload(type_name: impl Into<String>, errors: Vec<String>) -> Self {
        Self::InvalidPayload {
            type_name: type_name.into(),
            errors,
        }
    }

    /// Create a processing failure.
    pub fn processing_failed(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProcessingFailed {
            type_name: type_name.into(),
            message: message.into(),
        }
    }

    /// Check if the error is transient and the call may be retried.
    ///
    /// Nothing in this crate retries; the caller decides.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::QueueUnavailable { .. })
    }
}
