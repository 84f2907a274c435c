//! Inbound request types.
//!
//! [`InboundRequest`] is the transport-neutral shape handed to the dispatcher.
//! The route matcher merges path parameters into it and the authorization
//! stage writes the caller's token into its authorizer context.

use bytes::Bytes;
use http::header::IntoHeaderName;
use http::{HeaderMap, HeaderValue, Method};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A unique identifier for each request, using UUID v7.
///
/// # Example
///
/// ```
/// use daedalus_core::RequestId;
///
/// let id = RequestId::new();
/// println!("Request ID: {}", id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID using UUID v7.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// A request as delivered by the hosting transport.
///
/// Header lookups are case-insensitive through [`HeaderMap`].
///
/// # Example
///
/// ```
/// use daedalus_core::InboundRequest;
/// use http::Method;
///
/// let request = InboundRequest::new(Method::GET, "/v1/meta/item/42")
///     .with_stage("v1")
///     .with_header("authorization", "Bearer abc")
///     .with_query("num", "7");
///
/// assert_eq!(request.header("Authorization"), Some("Bearer abc"));
/// assert_eq!(request.query("num"), Some("7"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct InboundRequest {
    /// HTTP method.
    pub method: Method,
    /// Raw request path, possibly prefixed with the deployment stage.
    pub path: String,
    /// Deployment stage segment reported by the transport.
    pub stage: Option<String>,
    /// Request headers.
    pub headers: HeaderMap,
    /// Path parameters; the route matcher merges extracted values in here.
    pub path_parameters: HashMap<String, String>,
    /// Query string parameters.
    pub query_parameters: HashMap<String, String>,
    /// Raw request body.
    pub body: Bytes,
    /// Data written by the authorization stage for downstream handlers.
    pub authorizer_context: HashMap<String, serde_json::Value>,
}

impl InboundRequest {
    /// Creates a request with the given method and path.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            ..Self::default()
        }
    }

    /// Sets the deployment stage.
    #[must_use]
    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = Some(stage.into());
        self
    }

    /// Adds a header.
    ///
    /// Values that are not valid header values are dropped with a warning.
    #[must_use]
    pub fn with_header<K: IntoHeaderName>(mut self, name: K, value: &str) -> Self {
        match HeaderValue::from_str(value) {
            Ok(value) => {
                self.headers.insert(name, value);
            }
            Err(_) => tracing::warn!(value, "dropping invalid header value"),
        }
        self
    }

    /// Adds a query string parameter.
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_parameters.insert(name.into(), value.into());
        self
    }

    /// Adds a pre-existing path parameter, as a proxy transport would.
    #[must_use]
    pub fn with_path_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_parameters.insert(name.into(), value.into());
        self
    }

    /// Sets the raw body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets a JSON body.
    #[must_use]
    pub fn with_json_body(mut self, body: &serde_json::Value) -> Self {
        self.body = Bytes::from(body.to_string());
        self
    }

    /// Returns a header value, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a query string parameter.
    #[must_use]
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query_parameters.get(name).map(String::as_str)
    }

    /// Returns a path parameter.
    #[must_use]
    pub fn path_parameter(&self, name: &str) -> Option<&str> {
        self.path_parameters.get(name).map(String::as_str)
    }

    /// Returns a value written by the authorization stage.
    #[must_use]
    pub fn authorizer_data(&self, key: &str) -> Option<&serde_json::Value> {
        self.authorizer_context.get(key)
    }

    /// Parses the body as JSON.
    ///
    /// An empty or whitespace-only body parses to `None`.
    pub fn json_body(&self) -> Result<Option<serde_json::Value>, serde_json::Error> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        serde_json::from_slice(&self.body).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_id_unique() {
        let id1 = RequestId::new();
        let id2 = RequestId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let request = InboundRequest::new(Method::GET, "/")
            .with_header("X-Custom-Header", "value");
        assert_eq!(request.header("x-custom-header"), Some("value"));
        assert_eq!(request.header("X-CUSTOM-HEADER"), Some("value"));
        assert_eq!(request.header("missing"), None);
    }

    #[test]
    fn test_invalid_header_value_dropped() {
        let request = InboundRequest::new(Method::GET, "/").with_header("x-bad", "line\nbreak");
        assert!(request.headers.is_empty());
    }

    #[test]
    fn test_json_body() {
        let request =
            InboundRequest::new(Method::POST, "/").with_json_body(&json!({"name": "test"}));
        assert_eq!(request.json_body().unwrap(), Some(json!({"name": "test"})));

        let empty = InboundRequest::new(Method::POST, "/").with_body("  \n");
        assert_eq!(empty.json_body().unwrap(), None);

        let broken = InboundRequest::new(Method::POST, "/").with_body("{not json");
        assert!(broken.json_body().is_err());
    }

    #[test]
    fn test_parameters() {
        let request = InboundRequest::new(Method::GET, "/items")
            .with_query("num", "5")
            .with_path_parameter("proxy", "items");
        assert_eq!(request.query("num"), Some("5"));
        assert_eq!(request.path_parameter("proxy"), Some("items"));
        assert_eq!(request.authorizer_data("userData"), None);
    }
}
