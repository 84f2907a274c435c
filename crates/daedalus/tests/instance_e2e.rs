//! End-to-end tests through a fully built instance.

use daedalus::config::{BackgroundMode, DaedalusConfig};
use daedalus::core::{InboundRequest, Response};
use daedalus::sample::{self, SAMPLE_GUEST_TOKEN, SAMPLE_META_PATH, SAMPLE_USER_TOKEN};
use daedalus::tasks::{
    builtin, InMemoryNotificationClient, InMemoryQueueClient, QueueClient, NotificationClient,
    TaskError,
};
use daedalus::{BootstrapError, Instance};
use http::Method;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;

async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn sample_instance() -> Instance {
    sample::sample_instance_builder().build().unwrap()
}

fn remote_config() -> DaedalusConfig {
    let mut config = sample::sample_config();
    config.background.mode = BackgroundMode::Remote;
    config.background.queue_url = Some("https://queue.test/jobs".to_string());
    config.background.notification_address = Some("notify:jobs".to_string());
    config
}

#[tokio::test]
async fn test_sample_multi_routes() {
    let instance = sample_instance();

    let response = instance
        .dispatch(InboundRequest::new(Method::GET, "/multi/fixed"))
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(body_json(response).await["flag"], "fixed");

    let response = instance
        .dispatch(InboundRequest::new(Method::GET, "/multi/abc"))
        .await;
    let body = body_json(response).await;
    assert_eq!(body["flag"], "variable");
    assert_eq!(body["pathParameters"]["v"], "abc");
}

#[tokio::test]
async fn test_sample_error_route() {
    let instance = sample_instance();

    let response = instance
        .dispatch(InboundRequest::new(Method::GET, "/err/418"))
        .await;
    assert_eq!(response.status(), 418);

    let response = instance
        .dispatch(InboundRequest::new(Method::GET, "/err/teapot"))
        .await;
    assert_eq!(response.status(), 500);
    let body = body_json(response).await;
    assert_eq!(body["errors"], json!(["Internal Server Error"]));
}

#[tokio::test]
async fn test_sample_simple_item() {
    let instance = sample_instance();

    let response = instance
        .dispatch(InboundRequest::new(Method::GET, "/meta/simple-item").with_query("num", "7"))
        .await;
    assert_eq!(
        body_json(response).await,
        json!({"numberField": 7, "stringField": "Test-String"})
    );

    let response = instance
        .dispatch(InboundRequest::new(Method::GET, "/meta/simple-item"))
        .await;
    assert_eq!(body_json(response).await["numberField"], 5);
}

#[tokio::test]
async fn test_sample_item_requires_user_role() {
    let instance = sample_instance();
    let request = || InboundRequest::new(Method::GET, "/meta/item/42");

    let response = instance.dispatch(request()).await;
    assert_eq!(response.status(), 401);

    let response = instance
        .dispatch(request().with_header("authorization", &format!("Bearer {SAMPLE_GUEST_TOKEN}")))
        .await;
    assert_eq!(response.status(), 403);

    let response = instance
        .dispatch(request().with_header("authorization", &format!("Bearer {SAMPLE_USER_TOKEN}")))
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(body_json(response).await["pathParameters"]["itemId"], "42");
}

#[tokio::test]
async fn test_sample_cors_matches_request() {
    let instance = sample_instance();

    let response = instance
        .dispatch(
            InboundRequest::new(Method::OPTIONS, "/meta/server")
                .with_header("origin", "https://app.test")
                .with_header("access-control-request-method", "GET"),
        )
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "https://app.test"
    );
    assert_eq!(response.headers()["access-control-allow-methods"], "GET");
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_local_submission_with_implied_type() {
    let instance = sample_instance();

    let response = instance
        .dispatch(
            InboundRequest::new(Method::POST, format!("/background/{}", builtin::ECHO_TYPE))
                .with_json_body(&json!({"data": {"a": 1}, "metadata": {"b": 2}})),
        )
        .await;
    assert_eq!(response.status(), 200);

    let body = body_json(response).await;
    assert_eq!(body["type"], builtin::ECHO_TYPE);
    assert_eq!(body["data"], json!({"a": 1}));
    assert!(!body["id"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_local_submission_with_body_type() {
    let instance = sample_instance();

    let response = instance
        .dispatch(
            InboundRequest::new(Method::POST, "/background")
                .with_json_body(&json!({"type": builtin::NO_OP_TYPE})),
        )
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(body_json(response).await["type"], builtin::NO_OP_TYPE);
}

#[tokio::test]
async fn test_submission_errors() {
    let instance = sample_instance();

    let response = instance
        .dispatch(InboundRequest::new(Method::POST, "/background/NoSuchProcessor"))
        .await;
    assert_eq!(response.status(), 404);

    let response = instance
        .dispatch(InboundRequest::new(Method::POST, "/background").with_body("{not json"))
        .await;
    assert_eq!(response.status(), 400);

    let response = instance
        .dispatch(InboundRequest::new(Method::POST, "/background").with_json_body(&json!({})))
        .await;
    assert_eq!(response.status(), 400);
    assert_eq!(
        body_json(response).await["errors"],
        json!(["Missing required field type"])
    );
}

#[tokio::test]
async fn test_local_submission_validates_payload() {
    let instance = sample_instance();

    let response = instance
        .dispatch(
            InboundRequest::new(
                Method::POST,
                format!("/background/{}", builtin::SAMPLE_INPUT_VALIDATED_TYPE),
            )
            .with_json_body(&json!({"data": {"nameParam": "x"}})),
        )
        .await;
    assert_eq!(response.status(), 400);
    assert_eq!(
        body_json(response).await["errors"],
        json!(["Missing required field numberParam"])
    );
}

#[tokio::test]
async fn test_local_meta() {
    let instance = sample_instance();

    let response = instance
        .dispatch(InboundRequest::new(Method::GET, SAMPLE_META_PATH))
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(
        body_json(response).await,
        json!({
            "processorTypes": [
                builtin::ECHO_TYPE,
                builtin::NO_OP_TYPE,
                builtin::SAMPLE_DELAY_TYPE,
                builtin::SAMPLE_INPUT_VALIDATED_TYPE,
            ],
            "localMode": true,
            "approximateQueueSize": 0,
        })
    );
}

#[tokio::test]
async fn test_remote_round_trip() {
    let queue = Arc::new(InMemoryQueueClient::new());
    let notifications = Arc::new(InMemoryNotificationClient::new());
    let instance = sample::sample_instance_builder()
        .config(remote_config())
        .remote_clients(
            Arc::clone(&queue) as Arc<dyn QueueClient>,
            Arc::clone(&notifications) as Arc<dyn NotificationClient>,
        )
        .build()
        .unwrap();
    assert!(!instance.queue_manager().is_local());

    let response = instance
        .dispatch(
            InboundRequest::new(Method::POST, format!("/background/{}", builtin::ECHO_TYPE))
                .with_json_body(&json!({"data": {"n": 3}})),
        )
        .await;
    assert_eq!(response.status(), 200);

    let response = instance
        .dispatch(InboundRequest::new(Method::GET, SAMPLE_META_PATH))
        .await;
    let meta = body_json(response).await;
    assert_eq!(meta["localMode"], false);
    assert_eq!(meta["approximateQueueSize"], 1);

    let published = notifications.published_messages();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].0, "notify:jobs");
    assert_eq!(instance.handle_queue_message(&published[0].1).await.unwrap(), None);

    let sent = queue.drain();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "https://queue.test/jobs");
    let result = instance.handle_queue_message(&sent[0].1).await.unwrap();
    assert_eq!(result, Some(json!({"data": {"n": 3}, "metadata": null})));
}

#[tokio::test]
async fn test_remote_queue_failure_is_server_error() {
    let queue = Arc::new(InMemoryQueueClient::new());
    queue.set_failing(true);
    let instance = sample::sample_instance_builder()
        .config(remote_config())
        .remote_clients(queue, Arc::new(InMemoryNotificationClient::new()))
        .build()
        .unwrap();

    let response = instance
        .dispatch(InboundRequest::new(
            Method::POST,
            format!("/background/{}", builtin::NO_OP_TYPE),
        ))
        .await;
    assert_eq!(response.status(), 500);
}

#[test]
fn test_remote_mode_requires_clients() {
    let result = sample::sample_instance_builder().config(remote_config()).build();
    assert!(matches!(
        result,
        Err(BootstrapError::Task(TaskError::InvalidConfig(_)))
    ));
}

#[test]
fn test_remote_mode_reports_missing_settings() {
    let mut config = remote_config();
    config.background.notification_address = None;
    config.background.queue_url = Some(String::new());

    let error = sample::sample_instance_builder()
        .config(config)
        .remote_clients(
            Arc::new(InMemoryQueueClient::new()),
            Arc::new(InMemoryNotificationClient::new()),
        )
        .build()
        .err()
        .unwrap();
    let message = error.to_string();
    assert!(message.contains("Remote queue config missing notification address"));
    assert!(message.contains("Remote queue config missing queue url"));
}

#[test]
fn test_background_paths_without_processors_rejected() {
    let error = Instance::builder()
        .config(sample::sample_config())
        .build()
        .err()
        .unwrap();
    assert!(error.to_string().contains("No processes specified"));
}

#[tokio::test]
async fn test_routes_only_instance() {
    let instance = Instance::builder()
        .route(
            Method::GET,
            "/meta/server",
            daedalus::Route::new(|_| async { Ok(json!({"status": "ok"})) }),
        )
        .build()
        .unwrap();

    assert!(instance.registry().is_empty());
    assert!(instance.queue_manager().is_local());

    let response = instance
        .dispatch(InboundRequest::new(Method::GET, "/meta/server"))
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(body_json(response).await, json!({"status": "ok"}));

    let response = instance
        .dispatch(InboundRequest::new(Method::POST, "/background"))
        .await;
    assert_eq!(response.status(), 404);
}

#[test]
fn test_invalid_config_rejected() {
    let mut config = sample::sample_config();
    config.http.default_timeout_ms = 0;
    let result = sample::sample_instance_builder().config(config).build();
    assert!(matches!(result, Err(BootstrapError::Config(_))));
}

#[test]
fn test_schema_processor_without_validator_rejected() {
    let result = Instance::builder()
        .processors(builtin::all())
        .build();
    assert!(matches!(result, Err(BootstrapError::Task(_))));
}

#[tokio::test]
async fn test_custom_stage_and_entry_path() {
    let mut config = sample::sample_config();
    config.http.custom_stage = Some("v1".to_string());
    config.background.path_prefix = Some("jobs".to_string());
    let instance = sample::sample_instance_builder().config(config).build().unwrap();

    let response = instance
        .dispatch(InboundRequest::new(Method::GET, "/v1/meta/server").with_stage("prod"))
        .await;
    assert_eq!(response.status(), 200);

    assert_eq!(instance.entry_path("abc"), "jobs/abc");
}
