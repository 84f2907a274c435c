//! Dispatch pipeline stages.
//!
//! Once a route has matched, the dispatcher runs these stages in a fixed
//! order before invoking the handler. The first stage to fail short-circuits
//! the request.
//!
//! 1. [`authorization`] - Token extraction and authorizer decision
//! 2. [`validation`] - Request body model validation
//!
//! [`cors`] and [`request_id`] shape every outgoing response instead.

pub mod authorization;
pub mod cors;
pub mod request_id;
pub mod validation;

use crate::route::Route;
use daedalus_core::{BoxFuture, DispatchResult, InboundRequest};

pub use authorization::AuthorizationStage;
pub use cors::{CorsPolicy, CorsValue};
pub use request_id::RequestIdPolicy;
pub use validation::ValidationStage;

/// One ordered, fallible step between route matching and the handler.
pub trait Stage: Send + Sync + 'static {
    /// Returns the stage name used in logs.
    fn name(&self) -> &'static str;

    /// Checks the request against the matched route.
    ///
    /// Stages may write into the request (for example the authorizer
    /// context). An error stops the pipeline.
    fn apply<'a>(
        &'a self,
        request: &'a mut InboundRequest,
        route: &'a Route,
    ) -> BoxFuture<'a, DispatchResult<()>>;
}
