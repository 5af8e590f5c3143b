use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::auth::AuthError;
use crate::catalog::CatalogError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Login and registration answer 401/409 with their own bodies; everything
/// else goes through here.
///
/// Every variant renders as `{"status": <code>, "message": <text>}`; a rejected
/// upstream write additionally carries the raw upstream `body`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Unauthorized")]
    Forbidden,

    #[error("backend error: {0}")]
    UpstreamTransport(String),

    #[error("backend_failed")]
    UpstreamRejected(Value),

    #[error("Init failed: {0}")]
    Seed(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Session store error: {0}")]
    Session(#[from] redis::RedisError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<CatalogError> for AppError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::Database(e) => AppError::Database(e),
            CatalogError::Seed(msg) => AppError::Seed(msg),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Database(e) => AppError::Database(e),
            AuthError::Session(e) => AppError::Session(e),
            other => AppError::Internal(anyhow::Error::new(other)),
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::UpstreamTransport(_) | AppError::UpstreamRejected(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::Seed(_)
            | AppError::Database(_)
            | AppError::Session(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            AppError::UpstreamRejected(raw) => {
                tracing::warn!("Upstream rejected write: {raw}");
                json!({
                    "status": status.as_u16(),
                    "message": self.to_string(),
                    "body": raw,
                })
            }
            AppError::UpstreamTransport(msg) => {
                tracing::error!("Upstream transport error: {msg}");
                json!({ "status": status.as_u16(), "message": self.to_string() })
            }
            AppError::Seed(msg) => {
                tracing::error!("Catalog seed failed: {msg}");
                json!({ "status": status.as_u16(), "message": self.to_string() })
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                json!({ "status": status.as_u16(), "message": "A database error occurred" })
            }
            AppError::Session(e) => {
                tracing::error!("Session store error: {e}");
                json!({ "status": status.as_u16(), "message": "A session error occurred" })
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                json!({ "status": status.as_u16(), "message": "An internal server error occurred" })
            }
            _ => json!({ "status": status.as_u16(), "message": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
