//! Request body validation stage.
//!
//! Runs after authorization. Routes that declare a [`BodyValidation`] have
//! their JSON body checked against the named model by the configured
//! [`ModelValidator`]; every reported problem is returned to the caller in a
//! single `400 Bad Request`.
//!
//! [`BodyValidation`]: crate::route::BodyValidation

use super::Stage;
use crate::route::Route;
use daedalus_core::{BoxFuture, DispatchError, DispatchResult, InboundRequest, ModelValidator};
use serde_json::Value;
use std::sync::Arc;

/// Message returned when the body is not valid JSON.
pub const UNPARSEABLE_BODY: &str = "Could not parse request body as JSON";

/// Delegates body checks to the external model validator.
#[derive(Clone, Default)]
pub struct ValidationStage {
    validator: Option<Arc<dyn ModelValidator>>,
}

impl ValidationStage {
    /// Creates the stage.
    #[must_use]
    pub fn new(validator: Option<Arc<dyn ModelValidator>>) -> Self {
        Self { validator }
    }

    fn validate(&self, request: &InboundRequest, route: &Route) -> DispatchResult<()> {
        let Some(validation) = route.validation() else {
            return Ok(());
        };

        let validator = self.validator.as_ref().ok_or_else(|| {
            DispatchError::misconfigured("Requested body validation but supplied no validator")
        })?;

        let body = request
            .json_body()
            .map_err(|_| DispatchError::bad_request([UNPARSEABLE_BODY]))?
            .unwrap_or(Value::Null);

        let errors = validator.validate(
            &validation.model_name,
            &body,
            validation.empty_allowed,
            validation.extra_properties_allowed,
        );
        if errors.is_empty() {
            return Ok(());
        }

        tracing::info!(
            model = %validation.model_name,
            errors = ?errors,
            "request body failed validation"
        );
        Err(DispatchError::bad_request(errors))
    }
}

impl Stage for ValidationStage {
    fn name(&self) -> &'static str {
        "validation"
    }

    fn apply<'a>(
        &'a self,
        request: &'a mut InboundRequest,
        route: &'a Route,
    ) -> BoxFuture<'a, DispatchResult<()>> {
        let result = self.validate(request, route);
        Box::pin(async move { result })
    }
}
