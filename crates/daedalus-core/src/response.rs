//! Outbound response types.

use crate::error::{DispatchError, ErrorEnvelope, DEFAULT_ERROR_MESSAGE};
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderValue, StatusCode};
use http_body_util::Full;

/// The response type produced by the dispatcher.
///
/// This is a standard `http::Response` with a `Full<Bytes>` body.
pub type Response = http::Response<Full<Bytes>>;

/// Extension trait for building responses without fallible builders.
pub trait ResponseExt {
    /// Creates a JSON response with the given status.
    fn json(status: StatusCode, body: &serde_json::Value) -> Response;

    /// Creates a plain-text response with the given status.
    fn text(status: StatusCode, body: impl Into<String>) -> Response;

    /// Creates a JSON error response from an envelope.
    fn from_envelope(envelope: &ErrorEnvelope) -> Response;
}

impl ResponseExt for Response {
    fn json(status: StatusCode, body: &serde_json::Value) -> Response {
        build(status, "application/json", Bytes::from(body.to_string()))
    }

    fn text(status: StatusCode, body: impl Into<String>) -> Response {
        build(status, "text/plain; charset=utf-8", Bytes::from(body.into()))
    }

    fn from_envelope(envelope: &ErrorEnvelope) -> Response {
        let status = StatusCode::from_u16(envelope.http_status_code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = serde_json::to_value(envelope).unwrap_or(serde_json::Value::Null);
        Response::json(status, &body)
    }
}

fn build(status: StatusCode, content_type: &'static str, body: Bytes) -> Response {
    let mut response = http::Response::new(Full::new(body));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

/// Conversion from handler output into a [`Response`].
///
/// Handlers may return a fully formed response, or any JSON value which is
/// wrapped in a `200 OK` JSON response.
pub trait IntoResponse {
    /// Converts `self` into a response.
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response {
        self
    }
}

impl IntoResponse for serde_json::Value {
    fn into_response(self) -> Response {
        Response::json(StatusCode::OK, &self)
    }
}

impl IntoResponse for String {
    fn into_response(self) -> Response {
        Response::text(StatusCode::OK, self)
    }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response {
        Response::text(StatusCode::OK, self)
    }
}

impl From<&DispatchError> for ErrorEnvelope {
    fn from(error: &DispatchError) -> Self {
        error.to_envelope(DEFAULT_ERROR_MESSAGE, None)
    }
}
