use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Duration;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::auth::{AuthError, JwtCodec, SecretKey, TokenCodec, TOKEN_LIFETIME_HOURS};
use crate::lifecycle::ServiceLifecycle;
use crate::user::repository::UserRepository;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub secret_key: SecretKey,
    pub token_codec: Arc<dyn TokenCodec>,
    pub user_repository: Arc<dyn UserRepository + Send + Sync>,
    pub lifecycle: Arc<ServiceLifecycle>,
    pub token_lifetime: Duration,
}

impl AppState {
    pub fn new(
        secret_key: SecretKey,
        user_repository: Arc<dyn UserRepository + Send + Sync>,
    ) -> Self {
        Self {
            secret_key,
            token_codec: Arc::new(JwtCodec::new()),
            user_repository,
            lifecycle: Arc::new(ServiceLifecycle::new()),
            token_lifetime: Duration::hours(TOKEN_LIFETIME_HOURS),
        }
    }

    pub fn with_token_codec(mut self, token_codec: Arc<dyn TokenCodec>) -> Self {
        self.token_codec = token_codec;
        self
    }

    pub fn with_token_lifetime(mut self, token_lifetime: Duration) -> Self {
        self.token_lifetime = token_lifetime;
        self
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unprocessable: {0}")]
    Unprocessable(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Service unavailable")]
    ServiceUnavailable,
}

impl From<AuthError> for AppError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::IdentityNotFound(_) => AppError::Unauthorized(
                "cannot continue this request since user is not found with this token"
                    .to_string(),
            ),
            // Issuance failures are not the caller's fault
            AuthError::SigningError(_) => AppError::Unprocessable(error.to_string()),
            other => AppError::Forbidden(format!("error when validating access token: {}", other)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::DatabaseError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", msg),
            ),
            AppError::ServiceUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "server is shutting down".to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "message": error_message
            }
        }));

        (status, body).into_response()
    }
}
