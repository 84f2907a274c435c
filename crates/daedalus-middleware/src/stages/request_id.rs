//! Request ID propagation.
//!
//! Every response carries a request ID header. An ID supplied by the caller
//! in the same header is reused; otherwise a UUID v7 is generated.

use daedalus_core::{InboundRequest, RequestId, Response};
use http::{HeaderName, HeaderValue};

/// Default response header carrying the request ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Resolves and stamps request IDs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestIdPolicy {
    header: HeaderName,
}

impl Default for RequestIdPolicy {
    fn default() -> Self {
        Self {
            header: HeaderName::from_static(REQUEST_ID_HEADER),
        }
    }
}

impl RequestIdPolicy {
    /// Uses a custom header name.
    pub fn new(header: &str) -> Result<Self, http::header::InvalidHeaderName> {
        Ok(Self {
            header: HeaderName::try_from(header)?,
        })
    }

    /// Returns the header name.
    #[must_use]
    pub fn header(&self) -> &HeaderName {
        &self.header
    }

    /// Returns the caller's request ID, or a freshly generated one.
    #[must_use]
    pub fn resolve(&self, request: &InboundRequest) -> String {
        request
            .headers
            .get(&self.header)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map_or_else(|| RequestId::new().to_string(), ToString::to_string)
    }

    /// Adds the request ID header to a response.
    pub fn apply(&self, request_id: &str, response: &mut Response) {
        if let Ok(value) = HeaderValue::from_str(request_id) {
            response.headers_mut().insert(self.header.clone(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use daedalus_core::ResponseExt;
    use http::{Method, StatusCode};

    #[test]
    fn test_generates_when_absent() {
        let policy = RequestIdPolicy::default();
        let request = InboundRequest::new(Method::GET, "/");
        let id = policy.resolve(&request);
        assert!(uuid_like(&id));
        assert_ne!(id, policy.resolve(&request));
    }

    #[test]
    fn test_reuses_caller_id() {
        let policy = RequestIdPolicy::new("X-REQUEST-ID").unwrap();
        let request = InboundRequest::new(Method::GET, "/").with_header("x-request-id", "abc-123");
        assert_eq!(policy.resolve(&request), "abc-123");
    }

    #[test]
    fn test_apply() {
        let policy = RequestIdPolicy::new("X-Correlation-Id").unwrap();
        let mut response = Response::text(StatusCode::OK, "ok");
        policy.apply("abc", &mut response);
        assert_eq!(response.headers()["x-correlation-id"], "abc");
    }

    #[test]
    fn test_invalid_header_name() {
        assert!(RequestIdPolicy::new("bad header").is_err());
    }

    fn uuid_like(value: &str) -> bool {
        value.len() == 36 && value.chars().filter(|c| *c == '-').count() == 4
    }
}
