//! End-to-end tests for the webhook endpoint
//!
//! Requests go through the full router; the task API is a wiremock server.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use task_intake_webhook::{
    config::{Config, ListRules, TaskApiConfig},
    router::build_router,
    startup::initialize_app,
    utils::compute_signature,
};
use tower::ServiceExt;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SECRET: &str = "shared-secret";
const SECUNDA_LIST: &str = "901205280473";

fn test_config(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.webhook_secret = Some(SECRET.to_string());
    config.task_api = TaskApiConfig {
        base_url: server.uri(),
        token: Some("pk_test".to_string()),
        timeout_secs: Some(5),
    };
    config.fields.tracker_list_id = Some("tracker".to_string());
    config.fields.date_field_id = Some("date-field".to_string());
    config.fields.entity_field_id = Some("entity-field".to_string());
    config.rules = ListRules::parse(
        &format!("{}=SASOL SECUNDA", SECUNDA_LIST),
        "SASOL SECUNDA=opt-secunda",
        "",
    )
    .unwrap();
    config
}

fn app(config: Config) -> Router {
    build_router(initialize_app(config).unwrap())
}

fn signed_post(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/json")
        .header("X-Signature", compute_signature(SECRET, body.as_bytes()).unwrap())
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

/// Any call reaching the mock server fails the test on drop.
async fn forbid_remote_calls(server: &MockServer) {
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_secunda_task_runs_all_actions() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/list/tracker/task/T1"))
        .and(header("authorization", "pk_test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/task/T1/field/date-field"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/task/T1/field/entity-field"))
        .and(body_json(json!({"value": "opt-secunda"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let body = json!({"event": "taskCreated", "task_id": "T1", "list_id": SECUNDA_LIST}).to_string();
    let (status, response) = send(app(test_config(&server)), signed_post(&body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        response,
        json!({
            "ok": true,
            "attached": true,
            "dateStamped": true,
            "entitySet": true,
            "entityName": "SASOL SECUNDA"
        })
    );
}

#[tokio::test]
async fn test_other_events_are_acknowledged_without_calls() {
    let server = MockServer::start().await;
    forbid_remote_calls(&server).await;

    let body = json!({"event": "taskMoved", "task_id": "T1"}).to_string();
    let (status, response) = send(app(test_config(&server)), signed_post(&body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response, json!({"ok": true}));
}

#[tokio::test]
async fn test_task_created_without_task_id_is_acknowledged() {
    let server = MockServer::start().await;
    forbid_remote_calls(&server).await;

    let body = json!({"event": "taskCreated", "list_id": SECUNDA_LIST}).to_string();
    let (status, response) = send(app(test_config(&server)), signed_post(&body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response, json!({"ok": true}));
}

#[tokio::test]
async fn test_non_post_is_rejected_with_json_405() {
    let server = MockServer::start().await;
    forbid_remote_calls(&server).await;

    for verb in ["GET", "PUT", "DELETE"] {
        let request = Request::builder()
            .method(verb)
            .uri("/webhook")
            .body(Body::empty())
            .unwrap();
        let (status, response) = send(app(test_config(&server)), request).await;

        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response["ok"], false);
        assert_eq!(response["error"]["code"], "VAL_3002");
    }
}

#[tokio::test]
async fn test_bad_signature_is_401_even_for_invalid_json() {
    let server = MockServer::start().await;
    forbid_remote_calls(&server).await;

    for body in [r#"{"event":"taskCreated","task_id":"T1"}"#, "{not json"] {
        let request = Request::builder()
            .method("POST")
            .uri("/webhook")
            .header("X-Signature", compute_signature("wrong-secret", body.as_bytes()).unwrap())
            .body(Body::from(body))
            .unwrap();
        let (status, response) = send(app(test_config(&server)), request).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(response["error"]["code"], "AUTH_1002");
    }
}

#[tokio::test]
async fn test_missing_signature_is_401() {
    let server = MockServer::start().await;
    forbid_remote_calls(&server).await;

    let request = Request::builder()
        .method("POST")
        .uri("/webhook")
        .body(Body::from(r#"{"event":"taskCreated","task_id":"T1"}"#))
        .unwrap();
    let (status, response) = send(app(test_config(&server)), request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(response["error"]["code"], "AUTH_1001");
}

#[tokio::test]
async fn test_signature_over_reserialized_body_is_rejected() {
    let server = MockServer::start().await;
    forbid_remote_calls(&server).await;

    let raw = r#"{ "event": "taskMoved",   "task_id": "T1" }"#;
    let reserialized = serde_json::to_string(&serde_json::from_str::<Value>(raw).unwrap()).unwrap();

    let request = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("X-Signature", compute_signature(SECRET, reserialized.as_bytes()).unwrap())
        .body(Body::from(raw))
        .unwrap();
    let (status, _) = send(app(test_config(&server)), request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_valid_signature_with_malformed_json_is_400() {
    let server = MockServer::start().await;
    forbid_remote_calls(&server).await;

    let (status, response) = send(app(test_config(&server)), signed_post("{not json")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["ok"], false);
    assert_eq!(response["error"]["code"], "VAL_3001");
}

#[tokio::test]
async fn test_oversized_body_is_rejected_with_json_413() {
    let server = MockServer::start().await;
    forbid_remote_calls(&server).await;

    let padding = "x".repeat(3 * 1024 * 1024);
    let body = json!({"event": "taskCreated", "task_id": "T1", "note": padding}).to_string();
    let (status, response) = send(app(test_config(&server)), signed_post(&body)).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response["ok"], false);
    assert_eq!(response["error"]["code"], "VAL_3003");
    assert_eq!(response["error"]["code_number"], 3003);
    assert!(response["request_id"].is_string());
}

#[tokio::test]
async fn test_missing_secret_is_500_not_401() {
    let server = MockServer::start().await;
    forbid_remote_calls(&server).await;

    let mut config = test_config(&server);
    config.webhook_secret = None;

    let (status, response) = send(app(config), signed_post(r#"{"event":"taskCreated"}"#)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response["error"]["code"], "INT_9998");
}

#[tokio::test]
async fn test_missing_token_is_500_for_actionable_task() {
    let server = MockServer::start().await;
    forbid_remote_calls(&server).await;

    let mut config = test_config(&server);
    config.task_api.token = None;

    let body = json!({"event": "taskCreated", "task_id": "T1", "list_id": SECUNDA_LIST}).to_string();
    let (status, response) = send(app(config), signed_post(&body)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response["error"]["code"], "INT_9998");
}

#[tokio::test]
async fn test_attach_conflict_counts_as_attached() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/list/tracker/task/T1"))
        .respond_with(ResponseTemplate::new(409).set_body_string(r#"{"err":"Task already in list"}"#))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let body = json!({"event": "taskCreated", "task_id": "T1", "list_id": SECUNDA_LIST}).to_string();
    let (status, response) = send(app(test_config(&server)), signed_post(&body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["attached"], true);
}

#[tokio::test]
async fn test_missing_entity_option_reports_entity_not_set() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/task/T1/field/entity-field"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let mut config = test_config(&server);
    config.rules.entity_options.clear();

    let body = json!({"event": "taskCreated", "task_id": "T1", "list_id": SECUNDA_LIST}).to_string();
    let (status, response) = send(app(config), signed_post(&body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["attached"], true);
    assert_eq!(response["entitySet"], false);
    assert_eq!(response["entityName"], "SASOL SECUNDA");
}

#[tokio::test]
async fn test_failed_list_lookup_proceeds_unresolved() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/task/T1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/task/T1/field/date-field"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let body = json!({"event": "taskCreated", "task": {"id": "T1"}}).to_string();
    let (status, response) = send(app(test_config(&server)), signed_post(&body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        response,
        json!({
            "ok": true,
            "attached": false,
            "dateStamped": true,
            "entitySet": false,
            "entityName": null
        })
    );
}

#[tokio::test]
async fn test_list_filter_skips_other_lists() {
    let server = MockServer::start().await;
    forbid_remote_calls(&server).await;

    let mut config = test_config(&server);
    config.only_list_id = Some(SECUNDA_LIST.to_string());

    let body = json!({"event": "taskCreated", "payload": {"task_id": "T1", "list_id": "123"}}).to_string();
    let (status, response) = send(app(config), signed_post(&body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response, json!({"ok": true, "skipped": true}));
}

#[tokio::test]
async fn test_health_endpoint() {
    let server = MockServer::start().await;
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, response) = send(app(test_config(&server)), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["status"], "healthy");
    assert_eq!(response["environment"], "development");
}
