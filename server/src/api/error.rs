use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use larder_core::{ImageError, IngredientLineError, SubscriptionError};
use thiserror::Error;

use super::ErrorResponse;

/// Every failure a handler can report, mapped onto one HTTP status each.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    IngredientLines(#[from] IngredientLineError),

    #[error(transparent)]
    InvalidImage(#[from] ImageError),

    #[error(transparent)]
    Subscription(#[from] SubscriptionError),

    /// Adding a favorite/cart mark that already exists.
    #[error("{0}")]
    AlreadyMarked(&'static str),

    /// Removing a favorite/cart mark that does not exist.
    #[error("{0}")]
    NotMarked(&'static str),

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(&'static str),

    /// An ingredient disappeared between validation and insert.
    #[error("A referenced ingredient no longer exists")]
    ReferentialIntegrityViolation,

    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("{0}")]
    Internal(&'static str),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::IngredientLines(_)
            | ApiError::InvalidImage(_)
            | ApiError::Subscription(_)
            | ApiError::AlreadyMarked(_)
            | ApiError::NotMarked(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) | ApiError::ReferentialIntegrityViolation => {
                StatusCode::CONFLICT
            }
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "ValidationError",
            ApiError::IngredientLines(e) => e.code(),
            ApiError::InvalidImage(_) => "InvalidImageError",
            ApiError::Subscription(e) => e.code(),
            ApiError::AlreadyMarked(_) => "AlreadyMarked",
            ApiError::NotMarked(_) => "NotMarked",
            ApiError::Forbidden(_) => "PermissionDenied",
            ApiError::NotFound(_) => "NotFound",
            ApiError::Conflict(_) => "Conflict",
            ApiError::ReferentialIntegrityViolation => "ReferentialIntegrityViolation",
            ApiError::Database(_) | ApiError::Internal(_) => "InternalError",
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match &self {
            ApiError::Database(e) => {
                tracing::error!("Database error: {}", e);
                "Internal server error".to_string()
            }
            ApiError::Internal(message) => {
                tracing::error!("Internal error: {}", message);
                message.to_string()
            }
            other => other.to_string(),
        };

        (
            status,
            Json(ErrorResponse {
                error,
                code: Some(self.code().to_string()),
            }),
        )
            .into_response()
    }
}
