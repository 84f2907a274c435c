//! Route definitions: handler plus optional auth and body validation.

use crate::authorizer::Authorizer;
use daedalus_core::{BoxFuture, DispatchResult, InboundRequest, IntoResponse, Response};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Type-erased route handler.
pub type BoxedHandler =
    Arc<dyn Fn(InboundRequest) -> BoxFuture<'static, DispatchResult<Response>> + Send + Sync>;

/// Body validation declared by a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyValidation {
    /// Name of the model the body must satisfy.
    pub model_name: String,
    /// Whether an empty body passes.
    pub empty_allowed: bool,
    /// Whether properties outside the model pass.
    pub extra_properties_allowed: bool,
}

impl BodyValidation {
    /// Requires the body to satisfy `model_name`, non-empty and without
    /// extra properties.
    #[must_use]
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            empty_allowed: false,
            extra_properties_allowed: false,
        }
    }

    /// Accepts an empty body.
    #[must_use]
    pub fn allow_empty(mut self) -> Self {
        self.empty_allowed = true;
        self
    }

    /// Accepts properties the model does not declare.
    #[must_use]
    pub fn allow_extra_properties(mut self) -> Self {
        self.extra_properties_allowed = true;
        self
    }
}

/// A handler together with its auth and validation requirements.
///
/// Immutable once registered with a dispatcher.
///
/// # Example
///
/// ```
/// use daedalus_middleware::{BodyValidation, LoggedInAuthorizer, Route};
/// use serde_json::json;
///
/// let route = Route::new(|request| async move {
///     Ok(json!({"id": request.path_parameter("itemId")}))
/// })
/// .with_auth(LoggedInAuthorizer)
/// .with_validation(BodyValidation::new("Item"));
///
/// assert!(route.requires_auth());
/// ```
#[derive(Clone)]
pub struct Route {
    handler: BoxedHandler,
    auth: Option<Arc<dyn Authorizer>>,
    validation: Option<BodyValidation>,
}

impl Route {
    /// Creates a route from an async handler function.
    pub fn new<F, Fut, R>(handler: F) -> Self
    where
        F: Fn(InboundRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = DispatchResult<R>> + Send + 'static,
        R: IntoResponse,
    {
        let handler: BoxedHandler = Arc::new(move |request| -> BoxFuture<'static, DispatchResult<Response>> {
            let fut = handler(request);
            Box::pin(async move { fut.await.map(IntoResponse::into_response) })
        });
        Self {
            handler,
            auth: None,
            validation: None,
        }
    }

    /// Requires a valid token and a passing authorizer decision.
    #[must_use]
    pub fn with_auth(self, authorizer: impl Authorizer) -> Self {
        self.with_shared_auth(Arc::new(authorizer))
    }

    /// Same as [`Route::with_auth`] for an authorizer shared between routes.
    #[must_use]
    pub fn with_shared_auth(mut self, authorizer: Arc<dyn Authorizer>) -> Self {
        self.auth = Some(authorizer);
        self
    }

    /// Requires the body to pass model validation.
    #[must_use]
    pub fn with_validation(mut self, validation: BodyValidation) -> Self {
        self.validation = Some(validation);
        self
    }

    /// Returns the route's authorizer, if auth is required.
    #[must_use]
    pub fn authorizer(&self) -> Option<&dyn Authorizer> {
        self.auth.as_deref()
    }

    /// Returns `true` if the route requires auth.
    #[must_use]
    pub fn requires_auth(&self) -> bool {
        self.auth.is_some()
    }

    /// Returns the route's body validation, if any.
    #[must_use]
    pub fn validation(&self) -> Option<&BodyValidation> {
        self.validation.as_ref()
    }

    /// Invokes the handler.
    pub fn invoke(&self, request: InboundRequest) -> BoxFuture<'static, DispatchResult<Response>> {
        (self.handler)(request)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("requires_auth", &self.requires_auth())
            .field("validation", &self.validation)
            .finish_non_exhaustive()
    }
}
