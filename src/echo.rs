//! Tutorial route group exercising the three parameter-binding styles:
//! static route, path parameter, query parameter. Stateless, no coupling
//! to the OCR gateway.

use axum::{
    extract::{Path, Query},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;

/// Query-string parameters for `/query`. Missing keys are absent values,
/// never an error.
#[derive(Debug, Deserialize)]
pub struct QueryParams {
    pub name: Option<String>,
    pub age: Option<String>,
}

pub fn router() -> Router {
    Router::new()
        .route("/hello", get(handle_hello))
        .route("/path/:name", get(handle_path))
        .route("/query", get(handle_query))
        .route("/post", post(handle_post))
}

async fn handle_hello() -> &'static str {
    "Hello, World!"
}

/// Echoes the path segment verbatim.
async fn handle_path(Path(name): Path<String>) -> String {
    name
}

async fn handle_query(Query(params): Query<QueryParams>) -> &'static str {
    tracing::info!("name: {}", params.name.as_deref().unwrap_or(""));
    "SUCCESS"
}

/// Echoes a JSON document back, logging its `name` and `age` members.
async fn handle_post(Json(payload): Json<Value>) -> Json<Value> {
    let name = payload.get("name").cloned().unwrap_or(Value::Null);
    let age = payload.get("age").cloned().unwrap_or(Value::Null);
    tracing::info!("name: {}, age: {}", name, age);

    Json(payload)
}
