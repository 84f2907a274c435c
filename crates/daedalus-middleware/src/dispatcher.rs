//! Request dispatcher.
//!
//! The dispatcher owns the route table and the stage list, and turns every
//! [`InboundRequest`] into exactly one [`Response`]:
//!
//! ```text
//! OPTIONS + CORS ──────────────────────────────────────► preflight
//! otherwise: Normalize → Match → Authorization → Validation → Handler
//!                           │          │             │          │
//!                           └──────────┴─────────────┴──────────┴──► error envelope
//! ```
//!
//! CORS and request ID headers are added to the final response whichever
//! branch produced it. A panicking handler yields a `500`.

use crate::route::Route;
use crate::stages::cors::CorsRequest;
use crate::stages::{AuthorizationStage, CorsPolicy, RequestIdPolicy, Stage, ValidationStage};
use daedalus_core::{
    DispatchError, DispatchResult, InboundRequest, ModelValidator, Response, ResponseExt,
    TokenManipulator, DEFAULT_ERROR_MESSAGE,
};
use daedalus_router::{normalize_path, RouteTable};
use futures_util::FutureExt;
use http::Method;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

/// Default advisory handler timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Dispatcher settings.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Stage prefix stripped when the transport-reported stage does not match.
    pub custom_stage: Option<String>,
    /// CORS policy; `None` disables CORS handling.
    pub cors: Option<CorsPolicy>,
    /// Request ID header policy.
    pub request_id: RequestIdPolicy,
    /// Message reported in place of server-fault details.
    pub default_error_message: String,
    /// Advisory handler timeout. Never enforced by the dispatcher.
    pub default_timeout: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            custom_stage: None,
            cors: Some(CorsPolicy::default()),
            request_id: RequestIdPolicy::default(),
            default_error_message: DEFAULT_ERROR_MESSAGE.to_string(),
            default_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl DispatchConfig {
    /// Sets the custom stage prefix.
    #[must_use]
    pub fn with_custom_stage(mut self, stage: impl Into<String>) -> Self {
        self.custom_stage = Some(stage.into());
        self
    }

    /// Sets the CORS policy.
    #[must_use]
    pub fn with_cors(mut self, cors: CorsPolicy) -> Self {
        self.cors = Some(cors);
        self
    }

    /// Disables CORS handling.
    #[must_use]
    pub fn without_cors(mut self) -> Self {
        self.cors = None;
        self
    }

    /// Sets the request ID policy.
    #[must_use]
    pub fn with_request_id(mut self, policy: RequestIdPolicy) -> Self {
        self.request_id = policy;
        self
    }

    /// Sets the default error message.
    #[must_use]
    pub fn with_default_error_message(mut self, message: impl Into<String>) -> Self {
        self.default_error_message = message.into();
        self
    }

    /// Sets the advisory timeout.
    #[must_use]
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }
}

/// Collects routes and collaborators for a [`Dispatcher`].
///
/// # Example
///
/// ```
/// use daedalus_middleware::{Dispatcher, Route};
/// use http::Method;
///
/// let dispatcher = Dispatcher::builder()
///     .route(Method::GET, "/meta/server", Route::new(|_| async { Ok("up") }))
///     .build()
///     .unwrap();
/// assert_eq!(dispatcher.routes().len(), 1);
/// ```
#[derive(Default)]
pub struct DispatcherBuilder {
    routes: Vec<(Method, String, Route)>,
    token_manipulator: Option<Arc<dyn TokenManipulator>>,
    validator: Option<Arc<dyn ModelValidator>>,
    config: DispatchConfig,
}

impl DispatcherBuilder {
    /// Registers a route. Earlier routes take priority.
    #[must_use]
    pub fn route(mut self, method: Method, pattern: impl Into<String>, route: Route) -> Self {
        self.routes.push((method, pattern.into(), route));
        self
    }

    /// Sets the token manipulator used by the authorization stage.
    #[must_use]
    pub fn token_manipulator(mut self, manipulator: Arc<dyn TokenManipulator>) -> Self {
        self.token_manipulator = Some(manipulator);
        self
    }

    /// Sets the model validator used by the validation stage.
    #[must_use]
    pub fn validator(mut self, validator: Arc<dyn ModelValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Sets the dispatcher settings.
    #[must_use]
    pub fn config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the dispatcher.
    ///
    /// # Errors
    ///
    /// Returns `Misconfigured` if a pattern is malformed, or a route needs a
    /// token manipulator or validator that was not supplied.
    pub fn build(self) -> DispatchResult<Dispatcher> {
        let mut table = RouteTable::new();

        for (method, pattern, route) in self.routes {
            if route.requires_auth() && self.token_manipulator.is_none() {
                return Err(DispatchError::misconfigured(format!(
                    "Route {method} {pattern} declares auth, but token manipulator not set"
                )));
            }
            if route.validation().is_some() && self.validator.is_none() {
                return Err(DispatchError::misconfigured(format!(
                    "Route {method} {pattern} requests body validation but no validator is set"
                )));
            }
            table
                .add(method, &pattern, route)
                .map_err(|e| DispatchError::misconfigured(e.to_string()))?;
        }

        let stages: Vec<Box<dyn Stage>> = vec![
            Box::new(AuthorizationStage::new(self.token_manipulator)),
            Box::new(ValidationStage::new(self.validator)),
        ];

        tracing::debug!(routes = table.len(), "dispatcher built");

        Ok(Dispatcher {
            table,
            stages,
            config: self.config,
        })
    }
}

/// Routes requests through the stage pipeline to their handlers.
pub struct Dispatcher {
    table: RouteTable<Route>,
    stages: Vec<Box<dyn Stage>>,
    config: DispatchConfig,
}

impl Dispatcher {
    /// Starts building a dispatcher.
    #[must_use]
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::default()
    }

    /// Returns the registered routes.
    #[must_use]
    pub fn routes(&self) -> &RouteTable<Route> {
        &self.table
    }

    /// Returns the dispatcher settings.
    #[must_use]
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Returns the advisory handler timeout.
    #[must_use]
    pub fn default_timeout(&self) -> Duration {
        self.config.default_timeout
    }

    /// Dispatches one request. Never fails: every error becomes a response.
    pub async fn dispatch(&self, request: InboundRequest) -> Response {
        let request_id = self.config.request_id.resolve(&request);
        let cors_request = CorsRequest::from_headers(&request.headers);
        let method = request.method.clone();
        let path = request.path.clone();

        let outcome = AssertUnwindSafe(self.handle(request)).catch_unwind().await;

        let mut response = match outcome {
            Ok(Ok(response)) => response,
            Ok(Err(error)) => self.error_response(&error, &method, &path, &request_id),
            Err(panic) => {
                tracing::error!(
                    request_id = %request_id,
                    method = %method,
                    path = %path,
                    panic = panic_message(panic.as_ref()),
                    "handler panicked"
                );
                let error = DispatchError::internal("handler panicked");
                self.error_response(&error, &method, &path, &request_id)
            }
        };

        if let Some(cors) = &self.config.cors {
            cors.apply(&cors_request, &mut response);
        }
        self.config.request_id.apply(&request_id, &mut response);
        response
    }

    async fn handle(&self, mut request: InboundRequest) -> DispatchResult<Response> {
        if request.method == Method::OPTIONS {
            if let Some(cors) = &self.config.cors {
                return Ok(cors.preflight_response(&CorsRequest::from_headers(&request.headers)));
            }
        }

        let normalized = normalize_path(
            &request.path,
            request.stage.as_deref(),
            self.config.custom_stage.as_deref(),
        );

        let matched = self
            .table
            .find(&request.method, &normalized)
            .ok_or_else(DispatchError::not_found)?;
        matched.params.merge_into(&mut request.path_parameters);
        let route = matched.route;

        tracing::debug!(
            method = %request.method,
            path = %normalized,
            pattern = matched.pattern,
            "route matched"
        );

        for stage in &self.stages {
            if let Err(error) = stage.apply(&mut request, route).await {
                tracing::debug!(stage = stage.name(), "stage rejected request");
                return Err(error);
            }
        }

        route.invoke(request).await
    }

    fn error_response(
        &self,
        error: &DispatchError,
        method: &Method,
        path: &str,
        request_id: &str,
    ) -> Response {
        let status = error.status_code().as_u16();
        if error.category().is_server_fault() {
            tracing::error!(
                request_id = %request_id,
                method = %method,
                path = %path,
                status,
                error = %error,
                "request failed"
            );
        } else {
            tracing::info!(
                request_id = %request_id,
                method = %method,
                path = %path,
                status,
                error = %error,
                "request rejected"
            );
        }

        let envelope = error.to_envelope(&self.config.default_error_message, Some(request_id));
        Response::from_envelope(&envelope)
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authorizer::LoggedInAuthorizer;
    use crate::route::BodyValidation;

    #[test]
    fn test_build_rejects_auth_without_manipulator() {
        let result = Dispatcher::builder()
            .route(
                Method::GET,
                "/secure",
                Route::new(|_| async { Ok("ok") }).with_auth(LoggedInAuthorizer),
            )
            .build();
        assert!(matches!(result, Err(DispatchError::Misconfigured { .. })));
    }

    #[test]
    fn test_build_rejects_validation_without_validator() {
        let result = Dispatcher::builder()
            .route(
                Method::POST,
                "/items",
                Route::new(|_| async { Ok("ok") }).with_validation(BodyValidation::new("Item")),
            )
            .build();
        assert!(matches!(result, Err(DispatchError::Misconfigured { .. })));
    }

    #[test]
    fn test_build_rejects_bad_pattern() {
        let result = Dispatcher::builder()
            .route(Method::GET, "/files/*rest/more", Route::new(|_| async { Ok("ok") }))
            .build();
        assert!(matches!(result, Err(DispatchError::Misconfigured { .. })));
    }

    #[test]
    fn test_default_config() {
        let dispatcher = Dispatcher::builder().build().unwrap();
        assert!(dispatcher.routes().is_empty());
        assert!(dispatcher.config().cors.is_some());
        assert_eq!(dispatcher.default_timeout(), Duration::from_secs(10));
        assert_eq!(dispatcher.config().default_error_message, DEFAULT_ERROR_MESSAGE);
    }

    #[test]
    fn test_panic_message() {
        let boxed: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "boom");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(boxed.as_ref()), "bang");
        let boxed: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(boxed.as_ref()), "unknown panic");
    }
}
