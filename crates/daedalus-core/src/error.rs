//! Error types for request dispatch.
//!
//! This module provides [`DispatchError`], the error type every dispatch stage
//! and handler returns. The dispatcher is the single place that converts a
//! `DispatchError` into a response, using [`DispatchError::to_envelope`].
//!
//! | Variant | Category | Status |
//! |---|---|---|
//! | `BadRequest` | `Validation` | 400 |
//! | `Unauthorized` | `Authentication` | 401 |
//! | `Forbidden` | `Authorization` | 403 |
//! | `NotFound` | `NotFound` | 404 |
//! | `Misconfigured` | `Misconfiguration` | 500 |
//! | `Internal` | `Internal` | 500 |
//! | `WithStatus` | `Handler` | caller supplied |

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`DispatchError`].
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Message returned when no route matches a request.
pub const NO_SUCH_ENDPOINT: &str = "No such endpoint";

/// Message returned in place of server-side fault detail.
pub const DEFAULT_ERROR_MESSAGE: &str = "Internal Server Error";

/// Categories of dispatch failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// The request body failed validation.
    Validation,
    /// Credentials were missing or could not be read.
    Authentication,
    /// Credentials were valid but the authorizer denied access.
    Authorization,
    /// No route matched.
    NotFound,
    /// A route requires infrastructure that was never configured.
    Misconfiguration,
    /// Unexpected server-side fault.
    Internal,
    /// A handler rejected the request with its own status code.
    Handler,
}

impl ErrorCategory {
    /// Returns the default HTTP status code for this error category.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::Authentication => StatusCode::UNAUTHORIZED,
            Self::Authorization => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Misconfiguration | Self::Internal | Self::Handler => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns `true` if failures in this category are server-side faults
    /// whose detail must not be shown to the caller.
    #[must_use]
    pub const fn is_server_fault(&self) -> bool {
        matches!(self, Self::Misconfiguration | Self::Internal)
    }
}

/// Standard error type for the dispatch pipeline.
///
/// # Example
///
/// ```
/// use daedalus_core::DispatchError;
///
/// fn check_body(errors: Vec<String>) -> Result<(), DispatchError> {
///     if !errors.is_empty() {
///         return Err(DispatchError::bad_request(errors));
///     }
///     Ok(())
/// }
///
/// assert!(check_body(vec!["name is required".into()]).is_err());
/// ```
#[derive(Error, Debug)]
pub enum DispatchError {
    /// No route matched the request.
    #[error("Not found: {message}")]
    NotFound {
        /// Human-readable error message.
        message: String,
    },

    /// Missing or malformed credentials.
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Human-readable error message.
        message: String,
    },

    /// The route's authorizer rejected the caller.
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Human-readable error message.
        message: String,
    },

    /// The request body failed validation.
    #[error("Bad request: {}", messages.join(", "))]
    BadRequest {
        /// Every reported validation problem, in validator order.
        messages: Vec<String>,
    },

    /// A route declares auth or validation without the required collaborator.
    #[error("Misconfigured: {message}")]
    Misconfigured {
        /// Human-readable error message.
        message: String,
    },

    /// A handler failed with an explicit status code.
    #[error("HTTP {status}: {}", messages.join(", "))]
    WithStatus {
        /// Status code to return.
        status: StatusCode,
        /// Messages to return.
        messages: Vec<String>,
    },

    /// Unexpected internal failure.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable error message (logged, not returned).
        message: String,
        /// The underlying error.
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl DispatchError {
    /// Creates the error returned when no route matches.
    #[must_use]
    pub fn not_found() -> Self {
        Self::NotFound {
            message: NO_SUCH_ENDPOINT.to_string(),
        }
    }

    /// Creates an unauthorized error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Creates a forbidden error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Creates a bad request error carrying every validation message.
    #[must_use]
    pub fn bad_request<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::BadRequest {
            messages: messages.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a misconfiguration error.
    #[must_use]
    pub fn misconfigured(message: impl Into<String>) -> Self {
        Self::Misconfigured {
            message: message.into(),
        }
    }

    /// Creates an error with an explicit status code.
    ///
    /// Status codes outside `100..=999` fall back to 500.
    #[must_use]
    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self::WithStatus {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            messages: vec![message.into()],
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error with a source error.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Unauthorized { .. } => ErrorCategory::Authentication,
            Self::Forbidden { .. } => ErrorCategory::Authorization,
            Self::BadRequest { .. } => ErrorCategory::Validation,
            Self::Misconfigured { .. } => ErrorCategory::Misconfiguration,
            Self::WithStatus { .. } => ErrorCategory::Handler,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::WithStatus { status, .. } => *status,
            _ => self.category().default_status_code(),
        }
    }

    /// Returns the detail messages of this error.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::BadRequest { messages } | Self::WithStatus { messages, .. } => messages.clone(),
            Self::NotFound { message }
            | Self::Unauthorized { message }
            | Self::Forbidden { message }
            | Self::Misconfigured { message }
            | Self::Internal { message, .. } => vec![message.clone()],
        }
    }

    /// Converts this error to a serializable error envelope.
    ///
    /// Server faults report `default_message` instead of their own detail.
    #[must_use]
    pub fn to_envelope(&self, default_message: &str, request_id: Option<&str>) -> ErrorEnvelope {
        let errors = if self.category().is_server_fault() {
            vec![default_message.to_string()]
        } else {
            self.messages()
        };

        ErrorEnvelope {
            errors,
            http_status_code: self.status_code().as_u16(),
            request_id: request_id.map(ToString::to_string),
        }
    }
}

/// Serializable error body for failure responses.
///
/// Serializes as `{"errors": [...], "httpStatusCode": 404}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    /// Error messages shown to the caller.
    pub errors: Vec<String>,
    /// The response status code.
    pub http_status_code: u16,
    /// The request ID for correlation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}
