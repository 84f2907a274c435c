//! A ready-made sample server: demo routes, the built-in processors and the
//! collaborators they need.
//!
//! Useful for local smoke tests and as a template for real deployments.
//!
//! | Route                        | Notes                                   |
//! |------------------------------|-----------------------------------------|
//! | `GET /`                      | echoes the request                      |
//! | `GET /meta/server`           | echoes the request                      |
//! | `GET /meta/user`             | requires any valid token                |
//! | `GET /meta/item/{itemId}`    | requires the `USER` role                |
//! | `POST /secure/access-token`  | echoes the request                      |
//! | `GET /multi/fixed`           | registered before `/multi/{v}`          |
//! | `GET /multi/{v}`             |                                         |
//! | `GET /err/{code}`            | fails with the given status             |
//! | `GET /meta/simple-item?num=` | `{numberField, stringField}`            |

use crate::background::RouteSpec;
use crate::instance::InstanceBuilder;
use chrono::Utc;
use daedalus_config::DaedalusConfig;
use daedalus_core::{
    DispatchError, FieldType, InboundRequest, ModelSchema, SchemaModelValidator,
    StaticTokenManipulator, Token,
};
use daedalus_middleware::stages::cors::MATCH_REQUEST_FLAG;
use daedalus_middleware::{LoggedInAuthorizer, RoleAuthorizer, Route};
use daedalus_tasks::builtin;
use http::Method;
use serde_json::{json, Value};
use std::sync::Arc;

/// Bearer token accepted by the sample token manipulator, carrying `USER`.
pub const SAMPLE_USER_TOKEN: &str = "sample-user-token";

/// Bearer token accepted by the sample token manipulator, without roles.
pub const SAMPLE_GUEST_TOKEN: &str = "sample-guest-token";

/// Submission path used by [`sample_config`].
pub const SAMPLE_SUBMISSION_PATH: &str = "/background";

/// Meta path used by [`sample_config`].
pub const SAMPLE_META_PATH: &str = "/meta/background";

/// Fallback for `/meta/simple-item` when `num` is absent or not a number.
pub const DEFAULT_SIMPLE_ITEM_NUMBER: i64 = 5;

/// Echoes the interesting parts of a request.
pub fn describe_request(request: &InboundRequest, flag: Option<&str>) -> Value {
    json!({
        "time": Utc::now().to_rfc3339(),
        "flag": flag,
        "method": request.method.as_str(),
        "path": request.path,
        "pathParameters": request.path_parameters,
        "queryParameters": request.query_parameters,
        "authorization": request.authorizer_context,
    })
}

fn echo(flag: Option<&'static str>) -> Route {
    Route::new(move |request: InboundRequest| async move { Ok(describe_request(&request, flag)) })
}

/// The sample routes, in priority order.
pub fn sample_routes() -> Vec<RouteSpec> {
    vec![
        (Method::GET, "/".to_string(), echo(None)),
        (Method::GET, "/meta/server".to_string(), echo(None)),
        (
            Method::GET,
            "/meta/user".to_string(),
            echo(None).with_auth(LoggedInAuthorizer),
        ),
        (
            Method::GET,
            "/meta/item/{itemId}".to_string(),
            echo(None).with_auth(RoleAuthorizer::new(["USER"], Vec::<String>::new())),
        ),
        (Method::POST, "/secure/access-token".to_string(), echo(None)),
        (Method::GET, "/multi/fixed".to_string(), echo(Some("fixed"))),
        (Method::GET, "/multi/{v}".to_string(), echo(Some("variable"))),
        (
            Method::GET,
            "/err/{code}".to_string(),
            Route::new(|request: InboundRequest| async move {
                let code = request.path_parameter("code").unwrap_or_default();
                let message = format!("Fake Err : {}", request.path);
                match code.parse::<u16>() {
                    Ok(status) => Err::<Value, _>(DispatchError::with_status(status, message)),
                    Err(_) => Err(DispatchError::internal(message)),
                }
            }),
        ),
        (
            Method::GET,
            "/meta/simple-item".to_string(),
            Route::new(|request: InboundRequest| async move {
                let number = request
                    .query("num")
                    .and_then(|n| n.trim().parse::<i64>().ok())
                    .filter(|n| *n != 0)
                    .unwrap_or(DEFAULT_SIMPLE_ITEM_NUMBER);
                Ok(json!({
                    "numberField": number,
                    "stringField": "Test-String",
                }))
            }),
        ),
    ]
}

/// Validator holding the models the samples need.
pub fn sample_validator() -> SchemaModelValidator {
    SchemaModelValidator::new().with_model(
        builtin::SAMPLE_INPUT_VALIDATED_TYPE,
        ModelSchema::new()
            .required_property("nameParam", FieldType::String)
            .required_property("numberParam", FieldType::Integer),
    )
}

/// Token manipulator accepting [`SAMPLE_USER_TOKEN`] and
/// [`SAMPLE_GUEST_TOKEN`].
pub fn sample_token_manipulator() -> StaticTokenManipulator {
    StaticTokenManipulator::new()
        .with_token(SAMPLE_USER_TOKEN, Token::new("sample-user").with_role("USER"))
        .with_token(SAMPLE_GUEST_TOKEN, Token::new("sample-guest"))
}

/// Local-mode configuration with the background endpoints enabled and CORS
/// echoing the request.
pub fn sample_config() -> DaedalusConfig {
    let mut config = DaedalusConfig::development();
    config.http.cors_allow_origin = MATCH_REQUEST_FLAG.to_string();
    config.http.cors_allow_headers = MATCH_REQUEST_FLAG.to_string();
    config.http.cors_allow_methods = Some(MATCH_REQUEST_FLAG.to_string());
    config.http.background_submission_path = Some(SAMPLE_SUBMISSION_PATH.to_string());
    config.http.background_meta_path = Some(SAMPLE_META_PATH.to_string());
    config
}

/// An instance builder preloaded with everything in this module.
///
/// ```
/// use daedalus::sample;
///
/// let instance = sample::sample_instance_builder().build().unwrap();
/// assert_eq!(instance.registry().len(), 4);
/// ```
pub fn sample_instance_builder() -> InstanceBuilder {
    crate::Instance::builder()
        .config(sample_config())
        .routes(sample_routes())
        .processors(builtin::all())
        .validator(Arc::new(sample_validator()))
        .token_manipulator(Arc::new(sample_token_manipulator()))
}
