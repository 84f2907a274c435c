//! HTTP surface for the background queue.
//!
//! Two optional endpoints sit in front of the [`QueueManager`]:
//!
//! | Route                 | Body                        | Result                  |
//! |-----------------------|-----------------------------|-------------------------|
//! | `POST {submit}/{type}` | `{data?, metadata?}`       | 200 + the queued entry  |
//! | `POST {submit}`        | `{type, data?, metadata?}` | 200 + the queued entry  |
//! | `GET {meta}`           |                            | processor and queue info |
//!
//! An unknown type answers 404 and a malformed body 400.

use daedalus_core::{DispatchError, DispatchResult, InboundRequest};
use daedalus_middleware::Route;
use daedalus_tasks::{QueueManager, TaskError};
use http::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Path parameter holding the implied job type.
pub const TYPE_PARAMETER: &str = "type";

/// A route ready for registration: method, pattern and route.
pub type RouteSpec = (Method, String, Route);

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmissionBody {
    #[serde(rename = "type")]
    type_name: Option<String>,
    #[serde(default)]
    data: Value,
    #[serde(default, alias = "metaData")]
    metadata: Value,
}

impl SubmissionBody {
    fn parse(request: &InboundRequest) -> DispatchResult<Self> {
        if request.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(&request.body).map_err(|e| {
            DispatchError::bad_request([format!("Invalid background submission body: {e}")])
        })
    }
}

/// Builds the two submission routes under `path`.
///
/// The suffixed route is listed first so `POST {path}/{type}` never falls
/// through to the bare route.
pub fn submission_routes(path: &str, manager: Arc<dyn QueueManager>) -> Vec<RouteSpec> {
    let base = path.trim_end_matches('/').to_string();

    let implied = Arc::clone(&manager);
    let typed = Route::new(move |request: InboundRequest| {
        let manager = Arc::clone(&implied);
        async move {
            let body = SubmissionBody::parse(&request)?;
            let type_name = request
                .path_parameter(TYPE_PARAMETER)
                .map(ToString::to_string)
                .ok_or_else(|| DispatchError::bad_request(["Missing background type"]))?;
            if let Some(declared) = body.type_name.as_deref() {
                if declared != type_name {
                    return Err(DispatchError::bad_request([format!(
                        "Body type {declared} does not match path type {type_name}"
                    )]));
                }
            }
            submit(manager.as_ref(), &type_name, body.data, body.metadata).await
        }
    });

    let untyped = Route::new(move |request: InboundRequest| {
        let manager = Arc::clone(&manager);
        async move {
            let body = SubmissionBody::parse(&request)?;
            let type_name = body
                .type_name
                .filter(|t| !t.trim().is_empty())
                .ok_or_else(|| DispatchError::bad_request(["Missing required field type"]))?;
            submit(manager.as_ref(), &type_name, body.data, body.metadata).await
        }
    });

    vec![
        (Method::POST, format!("{base}/{{{TYPE_PARAMETER}}}"), typed),
        (Method::POST, base, untyped),
    ]
}

/// Builds the metadata route at `path`.
pub fn meta_route(
    path: &str,
    manager: Arc<dyn QueueManager>,
    processor_types: Vec<String>,
) -> RouteSpec {
    let processor_types = Arc::new(processor_types);
    let route = Route::new(move |_request: InboundRequest| {
        let manager = Arc::clone(&manager);
        let processor_types = Arc::clone(&processor_types);
        async move {
            let size = manager
                .fetch_approximate_number_of_queue_entries()
                .await
                .map_err(task_error)?;
            Ok(json!({
                "processorTypes": processor_types.as_slice(),
                "localMode": manager.is_local(),
                "approximateQueueSize": size,
            }))
        }
    });
    (Method::GET, path.to_string(), route)
}

async fn submit(
    manager: &dyn QueueManager,
    type_name: &str,
    data: Value,
    metadata: Value,
) -> DispatchResult<Value> {
    let entry = manager
        .create_entry(type_name, data, metadata)
        .await
        .map_err(task_error)?
        .ok_or_else(|| {
            DispatchError::with_status(404, format!("No processor registered for type {type_name}"))
        })?;

    tracing::info!(entry_id = %entry.id, entry_type = %entry.type_name, "background entry submitted");

    serde_json::to_value(&entry)
        .map_err(|e| DispatchError::internal_with_source("failed to serialize entry", e))
}

/// Maps a queue failure onto the HTTP error taxonomy.
pub fn task_error(error: TaskError) -> DispatchError {
    match error {
        TaskError::InvalidPayload { errors, .. } => DispatchError::bad_request(errors),
        TaskError::UnknownProcessor(type_name) => DispatchError::with_status(
            404,
            format!("No processor registered for type {type_name}"),
        ),
        other => DispatchError::internal_with_source("background submission failed", other),
    }
}
