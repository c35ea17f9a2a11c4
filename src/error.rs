use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::password::PasswordError;
use crate::media::MediaError;
use crate::store::StoreError;
use crate::validation::FieldErrors;

/// Error body shared by every route.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<FieldErrors>,
}

/// Application-level error type for HTTP handlers.
///
/// Implements [`IntoResponse`] so handlers can bubble failures up with `?`.
/// Internal failures are logged here and answered with a generic message.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Payload failed its schema.
    #[error("Validation failed")]
    Validation(FieldErrors),

    #[error("{0}")]
    BadRequest(String),

    /// Login rejected. Deliberately the same for unknown email and wrong password.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// A feature whose configuration is missing.
    #[error("{0} is not configured")]
    Unconfigured(&'static str),

    #[error("Upstream service error: {0}")]
    Upstream(String),

    #[error("Store error: {0}")]
    Store(StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unconfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Store(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::Validation(details) => ErrorResponse {
                error: "Validation failed".to_string(),
                message: None,
                details: Some(details),
            },
            AppError::Upstream(msg) => {
                tracing::error!(error = %msg, "Upstream service failed");
                ErrorResponse {
                    error: "Upload failed".to_string(),
                    message: None,
                    details: None,
                }
            }
            AppError::Store(err) => {
                tracing::error!(error = %err, "Store error");
                ErrorResponse {
                    error: "Internal server error".to_string(),
                    message: None,
                    details: None,
                }
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                ErrorResponse {
                    error: "Internal server error".to_string(),
                    message: None,
                    details: None,
                }
            }
            other => ErrorResponse {
                error: other.to_string(),
                message: None,
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => AppError::Conflict(msg),
            other => AppError::Store(other),
        }
    }
}

impl From<FieldErrors> for AppError {
    fn from(errors: FieldErrors) -> Self {
        AppError::Validation(errors)
    }
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AppError::Internal(format!("failed to sign session: {err}"))
    }
}

impl From<MediaError> for AppError {
    fn from(err: MediaError) -> Self {
        AppError::Upstream(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let res = err.into_response();
        let status = res.status();
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_validation_carries_details() {
        let (status, body) = render(FieldErrors::field("name", "Required").into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Validation failed");
        assert_eq!(body["details"]["fieldErrors"]["name"][0], "Required");
    }

    #[tokio::test]
    async fn test_slug_conflict_maps_to_409() {
        let err: AppError = crate::store::slug_conflict("hello-world").into();
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Slug already exists: hello-world");
    }

    #[tokio::test]
    async fn test_internal_errors_are_not_leaked() {
        let err: AppError = StoreError::Database(sqlx::Error::PoolTimedOut).into();
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
        assert!(body.get("message").is_none());
    }

    #[tokio::test]
    async fn test_unconfigured_is_503() {
        let (status, body) = render(AppError::Unconfigured("Image upload")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "Image upload is not configured");
    }
}
