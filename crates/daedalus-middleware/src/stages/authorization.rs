//! Authorization stage.
//!
//! Runs after route matching and before body validation:
//!
//! ```text
//! Normalize → Match → [Authorization] → Validation → Handler
//! ```
//!
//! For a route that declares an authorizer the stage:
//!
//! 1. fails with `Misconfigured` if no token manipulator is configured;
//! 2. fails with `Unauthorized` if the request carries no valid token;
//! 3. fails with `Forbidden` if the route's authorizer says no;
//! 4. otherwise writes the caller's token into the request's authorizer
//!    context under [`USER_DATA`], [`USER_DATA_JSON`] and [`SRC_DATA`].
//!
//! Routes without an authorizer pass untouched.

use super::Stage;
use crate::route::Route;
use daedalus_core::{BoxFuture, DispatchError, DispatchResult, InboundRequest, TokenManipulator};
use serde_json::Value;
use std::sync::Arc;

/// Authorizer context key holding the decoded token as JSON.
pub const USER_DATA: &str = "userData";

/// Authorizer context key holding the decoded token serialized to a string.
pub const USER_DATA_JSON: &str = "userDataJSON";

/// Authorizer context key holding the raw credential string.
pub const SRC_DATA: &str = "srcData";

/// Token check plus route authorizer decision.
#[derive(Clone, Default)]
pub struct AuthorizationStage {
    token_manipulator: Option<Arc<dyn TokenManipulator>>,
}

impl AuthorizationStage {
    /// Creates the stage.
    #[must_use]
    pub fn new(token_manipulator: Option<Arc<dyn TokenManipulator>>) -> Self {
        Self { token_manipulator }
    }

    async fn authorize(&self, request: &mut InboundRequest, route: &Route) -> DispatchResult<()> {
        let Some(authorizer) = route.authorizer() else {
            return Ok(());
        };

        let manipulator = self.token_manipulator.as_ref().ok_or_else(|| {
            DispatchError::misconfigured("Auth is defined, but token manipulator not set")
        })?;

        let Some(token) = manipulator.extract_token_from_request(request) else {
            tracing::info!(path = %request.path, "failed auth: missing or bad token");
            return Err(DispatchError::unauthorized("Missing or bad token"));
        };

        if !authorizer.authorize(&token, request, route).await {
            tracing::info!(
                path = %request.path,
                sub = token.sub.as_deref().unwrap_or("-"),
                "failed authorization"
            );
            return Err(DispatchError::forbidden("Failed authorization"));
        }

        let user_data = serde_json::to_value(&token)
            .map_err(|e| DispatchError::internal_with_source("could not serialize token", e))?;
        let raw = manipulator
            .extract_raw_token_string(request)
            .map_or(Value::Null, Value::String);

        request
            .authorizer_context
            .insert(USER_DATA_JSON.to_string(), Value::String(user_data.to_string()));
        request
            .authorizer_context
            .insert(USER_DATA.to_string(), user_data);
        request.authorizer_context.insert(SRC_DATA.to_string(), raw);

        tracing::debug!(sub = token.sub.as_deref().unwrap_or("-"), "caller authorized");
        Ok(())
    }
}

impl Stage for AuthorizationStage {
    fn name(&self) -> &'static str {
        "authorization"
    }

    fn apply<'a>(
        &'a self,
        request: &'a mut InboundRequest,
        route: &'a Route,
    ) -> BoxFuture<'a, DispatchResult<()>> {
        Box::pin(self.authorize(request, route))
    }
}
