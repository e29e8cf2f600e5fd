use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::server::Envelope;

/// Failure taxonomy for the OCR gateway: two client faults with fixed
/// messages, everything else a processing fault surfaced with its raw text.
#[derive(Error, Debug)]
pub enum OcrError {
    #[error("Invalid JSON format")]
    InvalidJson,

    #[error("Missing imgPath parameter")]
    MissingImgPath,

    #[error("Failed to initialize OCR engine: {0}")]
    Initialization(String),

    // Renders as the bare inner text so the engine's message reaches the
    // caller unchanged.
    #[error("{0}")]
    Processing(String),
}

impl IntoResponse for OcrError {
    fn into_response(self) -> Response {
        let status = match &self {
            OcrError::InvalidJson | OcrError::MissingImgPath => StatusCode::BAD_REQUEST,
            OcrError::Initialization(_) | OcrError::Processing(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(Envelope::error(self.to_string()));

        (status, body).into_response()
    }
}
