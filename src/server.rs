use axum::{
    body::Bytes,
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::echo;
use crate::error::OcrError;
use crate::ocr::ocrs::OcrsCapability;
use crate::ocr::{OcrCapability, TextRegion};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<dyn OcrCapability>,
}

/// Uniform response envelope shared by the success and error paths.
/// `data` is omitted from the serialized body when absent.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope {
    pub code: i32,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<TextRegion>>,
}

impl Envelope {
    pub fn ok(data: Vec<TextRegion>) -> Self {
        Self {
            code: 0,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }

    pub fn error(msg: String) -> Self {
        Self {
            code: -1,
            msg,
            data: None,
        }
    }
}

/// Health check response
#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Build the OCR gateway router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ocr", post(handle_ocr))
        .route("/health", get(handle_health))
        .with_state(state)
}

/// Run the HTTP server
pub async fn run(config: Config) -> anyhow::Result<()> {
    let engine = OcrsCapability::new()?;
    let addr = format!("{}:{}", config.host, config.port);

    let state = AppState {
        engine: Arc::new(engine),
    };

    let app = echo::router()
        .merge(router(state))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Handle OCR requests
async fn handle_ocr(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Envelope>, OcrError> {
    let payload: serde_json::Value = serde_json::from_slice(&body).map_err(|_| {
        tracing::error!("Invalid JSON format");
        OcrError::InvalidJson
    })?;

    // Explicit check rather than a deserialization error: absent, non-string
    // and empty values all answer with the same client fault.
    let img_path = match payload.get("imgPath").and_then(|v| v.as_str()) {
        Some(path) if !path.is_empty() => path.to_string(),
        _ => return Err(OcrError::MissingImgPath),
    };

    tracing::info!("ocr imgPath: {}", img_path);

    // Blocking call; takes as long as the engine takes. No timeout, no retry.
    let regions = state.engine.recognize(&img_path, true).map_err(|e| {
        tracing::error!("ocr error: {}", e);
        e
    })?;

    Ok(Json(Envelope::ok(regions)))
}

/// Handle health check requests
async fn handle_health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
