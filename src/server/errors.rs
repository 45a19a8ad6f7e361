use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

pub type ApiResponse<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request")]
    BadRequest,

    #[error("resource not found")]
    NotFound,

    #[error("method not allowed")]
    MethodNotAllowed,

    /// A quiz asked for a category id that is neither 0 nor a known category.
    #[error("invalid category {0}")]
    InvalidCategory(i64),

    #[error("unprocessable: {0}")]
    Unprocessable(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest | ApiError::InvalidCategory(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Unprocessable(_) | ApiError::Database(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
        }
    }

    // the only text a caller ever sees
    fn message(&self) -> &'static str {
        match self.status_code() {
            StatusCode::BAD_REQUEST => "bad request",
            StatusCode::NOT_FOUND => "resource not found",
            StatusCode::METHOD_NOT_ALLOWED => "method not allowed",
            _ => "unprocessable",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: u16,
    pub message: &'static str,
}

impl From<&ApiError> for ErrorBody {
    fn from(err: &ApiError) -> Self {
        Self {
            success: false,
            error: err.status_code().as_u16(),
            message: err.message(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Database(error) => tracing::error!("Database error: {error}"),
            ApiError::Unprocessable(reason) => tracing::warn!("Unprocessable request: {reason}"),
            ApiError::InvalidCategory(id) => tracing::info!("Quiz requested unknown category {id}"),
            _ => {}
        }
        let status = self.status_code();
        (status, Json(ErrorBody::from(&self))).into_response()
    }
}
