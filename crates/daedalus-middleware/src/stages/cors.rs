//! CORS response shaping.
//!
//! When CORS is enabled the dispatcher answers every `OPTIONS` request with
//! a canned preflight response and appends the allow headers to every other
//! response, success or failure.
//!
//! Each allow header is either a fixed value or [`CorsValue::MatchRequest`],
//! which echoes what the browser asked for (configured as `MATCH`).

use daedalus_core::{Response, ResponseExt};
use http::{HeaderMap, HeaderValue, StatusCode};

/// CORS header names.
pub mod headers {
    /// `Access-Control-Allow-Origin` header.
    pub const ALLOW_ORIGIN: &str = "access-control-allow-origin";
    /// `Access-Control-Allow-Methods` header.
    pub const ALLOW_METHODS: &str = "access-control-allow-methods";
    /// `Access-Control-Allow-Headers` header.
    pub const ALLOW_HEADERS: &str = "access-control-allow-headers";
    /// `Access-Control-Request-Method` header (preflight).
    pub const REQUEST_METHOD: &str = "access-control-request-method";
    /// `Access-Control-Request-Headers` header (preflight).
    pub const REQUEST_HEADERS: &str = "access-control-request-headers";
    /// `Origin` header.
    pub const ORIGIN: &str = "origin";
}

/// Default `Access-Control-Allow-Headers` value.
///
/// Listed explicitly because Safari does not honor `*`.
pub const DEFAULT_ALLOWED_HEADERS: &str =
    "Authorization, Origin, X-Requested-With, Content-Type, Range";

/// Configuration value that echoes the request instead of a fixed value.
pub const MATCH_REQUEST_FLAG: &str = "MATCH";

/// Body of the canned preflight response.
pub const PREFLIGHT_BODY: &str = r#"{"cors":true}"#;

/// Value of one CORS allow header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsValue {
    /// Always send this value.
    Fixed(HeaderValue),
    /// Echo the corresponding request header.
    MatchRequest,
}

impl CorsValue {
    /// Parses a configured value; [`MATCH_REQUEST_FLAG`] selects
    /// [`CorsValue::MatchRequest`].
    pub fn parse(value: &str) -> Result<Self, http::header::InvalidHeaderValue> {
        if value == MATCH_REQUEST_FLAG {
            return Ok(Self::MatchRequest);
        }
        HeaderValue::from_str(value).map(Self::Fixed)
    }

    fn resolve(&self, echoed: Option<&HeaderValue>, fallback: &'static str) -> HeaderValue {
        match self {
            Self::Fixed(value) => value.clone(),
            Self::MatchRequest => echoed
                .cloned()
                .unwrap_or_else(|| HeaderValue::from_static(fallback)),
        }
    }
}

/// The request headers a CORS policy may echo back.
///
/// Captured before the request is handed to its handler.
#[derive(Debug, Clone, Default)]
pub struct CorsRequest {
    origin: Option<HeaderValue>,
    request_headers: Option<HeaderValue>,
    request_method: Option<HeaderValue>,
}

impl CorsRequest {
    /// Captures the echoable headers of a request.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            origin: headers.get(headers::ORIGIN).cloned(),
            request_headers: headers.get(headers::REQUEST_HEADERS).cloned(),
            request_method: headers.get(headers::REQUEST_METHOD).cloned(),
        }
    }
}

/// Allow headers added to responses.
///
/// # Example
///
/// ```
/// use daedalus_middleware::CorsPolicy;
///
/// let cors = CorsPolicy::default();
/// let preflight = cors.preflight_response(&Default::default());
/// assert_eq!(preflight.status(), 200);
/// assert_eq!(preflight.headers()["access-control-allow-origin"], "*");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsPolicy {
    allow_origin: CorsValue,
    allow_headers: CorsValue,
    allow_methods: Option<CorsValue>,
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self {
            allow_origin: CorsValue::Fixed(HeaderValue::from_static("*")),
            allow_headers: CorsValue::Fixed(HeaderValue::from_static(DEFAULT_ALLOWED_HEADERS)),
            allow_methods: None,
        }
    }
}

impl CorsPolicy {
    /// Builds a policy from configured strings.
    pub fn from_settings(
        allow_origin: &str,
        allow_headers: &str,
        allow_methods: Option<&str>,
    ) -> Result<Self, http::header::InvalidHeaderValue> {
        Ok(Self {
            allow_origin: CorsValue::parse(allow_origin)?,
            allow_headers: CorsValue::parse(allow_headers)?,
            allow_methods: allow_methods.map(CorsValue::parse).transpose()?,
        })
    }

    /// Sets the `Access-Control-Allow-Methods` value.
    #[must_use]
    pub fn with_allow_methods(mut self, value: CorsValue) -> Self {
        self.allow_methods = Some(value);
        self
    }

    /// Appends the allow headers to a response.
    pub fn apply(&self, request: &CorsRequest, response: &mut Response) {
        let headers = response.headers_mut();
        headers.insert(
            headers::ALLOW_ORIGIN,
            self.allow_origin.resolve(request.origin.as_ref(), "*"),
        );
        headers.insert(
            headers::ALLOW_HEADERS,
            self.allow_headers
                .resolve(request.request_headers.as_ref(), DEFAULT_ALLOWED_HEADERS),
        );
        if let Some(methods) = &self.allow_methods {
            headers.insert(
                headers::ALLOW_METHODS,
                methods.resolve(request.request_method.as_ref(), "*"),
            );
        }
    }

    /// Returns the canned preflight response.
    #[must_use]
    pub fn preflight_response(&self, request: &CorsRequest) -> Response {
        let mut response = Response::json(
            StatusCode::OK,
            &serde_json::json!({ "cors": true }),
        );
        self.apply(request, &mut response);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn test_default_preflight() {
        let response = CorsPolicy::default().preflight_response(&CorsRequest::default());
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[headers::ALLOW_ORIGIN], "*");
        assert_eq!(
            response.headers()[headers::ALLOW_HEADERS],
            DEFAULT_ALLOWED_HEADERS
        );
        assert!(response.headers().get(headers::ALLOW_METHODS).is_none());

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], PREFLIGHT_BODY.as_bytes());
    }

    #[test]
    fn test_match_request_echoes_headers() {
        let policy =
            CorsPolicy::from_settings(MATCH_REQUEST_FLAG, MATCH_REQUEST_FLAG, Some(MATCH_REQUEST_FLAG))
                .unwrap();

        let mut request_headers = HeaderMap::new();
        request_headers.insert(headers::ORIGIN, HeaderValue::from_static("https://app.example.com"));
        request_headers.insert(headers::REQUEST_HEADERS, HeaderValue::from_static("X-Custom"));
        request_headers.insert(headers::REQUEST_METHOD, HeaderValue::from_static("PUT"));

        let mut response = Response::text(StatusCode::OK, "ok");
        policy.apply(&CorsRequest::from_headers(&request_headers), &mut response);

        assert_eq!(response.headers()[headers::ALLOW_ORIGIN], "https://app.example.com");
        assert_eq!(response.headers()[headers::ALLOW_HEADERS], "X-Custom");
        assert_eq!(response.headers()[headers::ALLOW_METHODS], "PUT");
    }

    #[test]
    fn test_match_request_falls_back_without_request_headers() {
        let policy = CorsPolicy::from_settings(MATCH_REQUEST_FLAG, MATCH_REQUEST_FLAG, None).unwrap();
        let mut response = Response::text(StatusCode::NOT_FOUND, "nope");
        policy.apply(&CorsRequest::default(), &mut response);

        assert_eq!(response.headers()[headers::ALLOW_ORIGIN], "*");
        assert_eq!(
            response.headers()[headers::ALLOW_HEADERS],
            DEFAULT_ALLOWED_HEADERS
        );
    }

    #[test]
    fn test_invalid_setting_rejected() {
        assert!(CorsPolicy::from_settings("bad\nvalue", "*", None).is_err());
    }
}
