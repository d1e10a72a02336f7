// Common types and utilities for API handlers

use axum::{
    extract::rejection::JsonRejection,
    http::{header, HeaderMap, StatusCode},
    response::Json,
};
use chrono::Utc;
use serde::Serialize;
use tracing::error;

use crate::errors::ActionError;

// Helper type for API responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;
pub type ApiError = (StatusCode, Json<ApiResponse<()>>);

#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

pub fn status_for(err: &ActionError) -> StatusCode {
    match err {
        ActionError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
        ActionError::TargetNotFound { .. } => StatusCode::NOT_FOUND,
        ActionError::DuplicateResult { .. } => StatusCode::CONFLICT,
        ActionError::PersistenceFailure { .. } => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Maps a domain error onto the JSON error envelope
pub fn action_error(err: ActionError) -> ApiError {
    let status = status_for(&err);
    if status.is_server_error() {
        error!("Request failed: {}", err);
    }
    (status, Json(ApiResponse::error(err.to_string())))
}

/// Unwraps a decoded body; undecodable bodies are invalid requests
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => Err(action_error(ActionError::invalid_request(
            rejection.body_text(),
        ))),
    }
}

pub fn unauthorized(message: &str) -> ApiError {
    (
        StatusCode::UNAUTHORIZED,
        Json(ApiResponse::error(message.to_string())),
    )
}

/// Token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
