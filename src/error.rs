// src/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Not found")]
    NotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // 失败原因只进日志，响应体一律为空
        let status = match &self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::InvalidCredentials => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::ValidationError(msg) => {
                tracing::debug!("Validation error: {}", msg);
                StatusCode::BAD_REQUEST
            }
            AppError::DatabaseError(e) => {
                tracing::error!("Database error: {:?}", e);
                StatusCode::BAD_REQUEST
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                StatusCode::BAD_REQUEST
            }
        };

        status.into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
