//! Error types for WordGen API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Token is required")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("No data provided")]
    MissingBody,

    #[error("Template not found")]
    TemplateNotFound,

    #[error("Engine error: {0}")]
    Engine(#[from] docx_engine::EngineError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Clients match on these bodies, keep them stable.
        let (status, body) = match &self {
            ApiError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                json!({ "message": "Token is required" }),
            ),
            ApiError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                json!({ "message": "Invalid token" }),
            ),
            ApiError::MissingBody => (
                StatusCode::BAD_REQUEST,
                json!({ "message": "No data provided" }),
            ),
            ApiError::TemplateNotFound => {
                tracing::error!("Report template is missing");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "message": "Template not found" }),
                )
            }
            ApiError::Engine(e) => {
                tracing::error!("Generation error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "message": "Error generating document", "error": e.to_string() }),
                )
            }
            ApiError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "message": "Error generating document", "error": e.to_string() }),
                )
            }
            ApiError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "message": "Error generating document", "error": e.to_string() }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
