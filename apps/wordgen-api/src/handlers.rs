//! HTTP handlers for WordGen API

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use docx_engine::generate;

use crate::auth;
use crate::error::ApiError;
use crate::models::*;
use crate::state::AppState;

/// Name every generated report downloads as
pub const GENERATED_FILENAME: &str = "generated_document.docx";

const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Health check endpoint
pub async fn health(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HealthResponse>, ApiError> {
    sqlx::query("SELECT 1").execute(&state.db).await?;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        service: "wordgen-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

/// Generate a report from the configured template
pub async fn generate_word(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Option<Json<GenerateRequest>>,
) -> Result<(StatusCode, [(String, String); 2], Vec<u8>), ApiError> {
    // Authenticate
    let auth_header = headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::MissingToken)?;
    let token = auth::token_from_header(auth_header);
    let claims = auth::validate_access_token(token, &state.secret_key)
        .map_err(|_| ApiError::InvalidToken)?;

    // An unparseable body arrives here as None
    let request = match body {
        Some(Json(request)) if !request.is_empty() => request,
        _ => return Err(ApiError::MissingBody),
    };

    // Load the template
    let template = tokio::fs::read(&state.template_path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ApiError::TemplateNotFound
        } else {
            ApiError::Engine(e.into())
        }
    })?;

    // Run the pipeline off the async runtime
    let input = request.to_generation_input();
    let generated = tokio::task::spawn_blocking(move || generate(&template, &input))
        .await
        .map_err(|e| ApiError::Internal(e.into()))??;

    // Record the generation
    let generation_id = Uuid::new_v4().to_string();
    let input_json =
        serde_json::to_string(&request).map_err(|e| ApiError::Internal(e.into()))?;

    sqlx::query(
        r#"
        INSERT INTO generations (id, user_id, filename, market_name, input_json, status, created_at)
        VALUES (?, ?, ?, ?, ?, 'completed', ?)
        "#,
    )
    .bind(&generation_id)
    .bind(&claims.user_id)
    .bind(GENERATED_FILENAME)
    .bind(request.market_name_field())
    .bind(&input_json)
    .bind(Utc::now().to_rfc3339())
    .execute(&state.db)
    .await?;

    tracing::info!(
        "Generated document {} for user {}: {} replacements, {} warnings",
        generation_id,
        claims.user_id,
        generated.summary.replacements,
        generated.summary.warnings.len()
    );

    Ok((
        StatusCode::OK,
        [
            ("Content-Type".to_string(), DOCX_CONTENT_TYPE.to_string()),
            (
                "Content-Disposition".to_string(),
                format!("attachment; filename=\"{}\"", GENERATED_FILENAME),
            ),
        ],
        generated.bytes,
    ))
}
