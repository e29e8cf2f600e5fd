//! In-process endpoint tests: drive the routers directly with a stub
//! recognition engine, no network and no model downloads.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use ocr_web::echo;
use ocr_web::error::OcrError;
use ocr_web::ocr::{OcrCapability, TextRegion};
use ocr_web::server::{self, AppState, Envelope, HealthResponse};

/// Stub engine with a canned outcome.
struct StubEngine {
    outcome: Result<Vec<TextRegion>, String>,
}

impl OcrCapability for StubEngine {
    fn recognize(
        &self,
        _img_path: &str,
        _detect_orientation: bool,
    ) -> Result<Vec<TextRegion>, OcrError> {
        match &self.outcome {
            Ok(regions) => Ok(regions.clone()),
            Err(msg) => Err(OcrError::Processing(msg.clone())),
        }
    }
}

fn gateway(outcome: Result<Vec<TextRegion>, String>) -> Router {
    let state = AppState {
        engine: Arc::new(StubEngine { outcome }),
    };
    server::router(state)
}

fn sample_regions() -> Vec<TextRegion> {
    vec![TextRegion {
        text: "你好".to_string(),
        confidence: 0.98,
        bounding_box: [[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]],
    }]
}

async fn post_ocr(app: Router, body: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/ocr")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn get_body(app: Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn ocr_success_passes_regions_through() {
    let app = gateway(Ok(sample_regions()));

    let (status, body) = post_ocr(app, r#"{"imgPath":"/tmp/sample.png"}"#).await;

    assert_eq!(status, StatusCode::OK);
    let envelope: Envelope = serde_json::from_slice(&body).unwrap();
    assert_eq!(envelope.code, 0);
    assert_eq!(envelope.msg, "ok");
    assert_eq!(envelope.data, Some(sample_regions()));
}

#[tokio::test]
async fn ocr_success_keeps_non_ascii_unescaped() {
    let app = gateway(Ok(sample_regions()));

    let (status, body) = post_ocr(app, r#"{"imgPath":"/tmp/sample.png"}"#).await;

    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(body).unwrap();
    assert!(text.contains("你好"), "body was {}", text);
    assert!(!text.contains("\\u"), "body was {}", text);
}

#[tokio::test]
async fn ocr_missing_img_path_is_rejected() {
    let app = gateway(Ok(sample_regions()));

    let (status, body) = post_ocr(app, "{}").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let envelope: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(envelope["code"], -1);
    assert_eq!(envelope["msg"], "Missing imgPath parameter");
    assert!(envelope.get("data").is_none());
}

#[tokio::test]
async fn ocr_wrong_typed_img_path_is_rejected() {
    let app = gateway(Ok(sample_regions()));

    let (status, body) = post_ocr(app, r#"{"imgPath":42}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let envelope: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(envelope["msg"], "Missing imgPath parameter");
}

#[tokio::test]
async fn ocr_empty_img_path_is_rejected() {
    let app = gateway(Ok(sample_regions()));

    let (status, body) = post_ocr(app, r#"{"imgPath":""}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let envelope: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(envelope["msg"], "Missing imgPath parameter");
}

#[tokio::test]
async fn ocr_malformed_json_is_rejected() {
    let app = gateway(Ok(sample_regions()));

    let (status, body) = post_ocr(app, "{").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let envelope: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(envelope["code"], -1);
    assert_eq!(envelope["msg"], "Invalid JSON format");
}

#[tokio::test]
async fn ocr_engine_failure_surfaces_raw_message() {
    let app = gateway(Err("Failed to load image: No such file or directory".to_string()));

    let (status, body) = post_ocr(app, r#"{"imgPath":"/tmp/sample.png"}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let envelope: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(envelope["code"], -1);
    assert_eq!(
        envelope["msg"],
        "Failed to load image: No such file or directory"
    );
    assert!(envelope.get("data").is_none());
}

#[tokio::test]
async fn health_reports_ok() {
    let app = gateway(Ok(vec![]));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let health: HealthResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(health.status, "ok");
    assert!(!health.version.is_empty());
}

#[tokio::test]
async fn hello_returns_fixed_text() {
    let (status, body) = get_body(echo::router(), "/hello").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Hello, World!");
}

#[tokio::test]
async fn path_parameter_is_echoed() {
    let (status, body) = get_body(echo::router(), "/path/abc").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "abc");
}

#[tokio::test]
async fn query_returns_success_with_name() {
    let (status, body) = get_body(echo::router(), "/query?name=test").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "SUCCESS");
}

#[tokio::test]
async fn query_without_parameters_still_succeeds() {
    let (status, body) = get_body(echo::router(), "/query").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "SUCCESS");
}

#[tokio::test]
async fn post_echoes_json_document() {
    let payload = json!({"name": "bob", "age": 3});

    let response = echo::router()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/post")
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let echoed: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(echoed, payload);
}

#[tokio::test]
async fn merged_app_serves_both_route_groups() {
    let app = echo::router().merge(gateway(Ok(sample_regions())));

    let (hello_status, hello_body) = get_body(app.clone(), "/hello").await;
    assert_eq!(hello_status, StatusCode::OK);
    assert_eq!(hello_body, "Hello, World!");

    let (ocr_status, _) = post_ocr(app, r#"{"imgPath":"/tmp/sample.png"}"#).await;
    assert_eq!(ocr_status, StatusCode::OK);
}
