use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::shared::AppError;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Decodes a request payload by content type: url-encoded forms, JSON otherwise
pub fn decode_payload<T: DeserializeOwned>(
    content_type: Option<&str>,
    body: &[u8],
) -> Result<T, AppError> {
    let decoded = if is_form(content_type) {
        serde_urlencoded::from_bytes(body).map_err(|e| e.to_string())
    } else {
        serde_json::from_slice(body).map_err(|e| e.to_string())
    };

    decoded.map_err(|reason| {
        debug!(content_type = ?content_type, error = %reason, "Failed to bind payload");
        AppError::BadRequest(format!("fail when binding the payload: {}", reason))
    })
}

fn is_form(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
}

/// Axum extractor that binds JSON or form bodies and rejects with `AppError`
#[derive(Debug)]
pub struct Payload<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        let body = Bytes::from_request(req, state).await.map_err(|e| {
            AppError::BadRequest(format!("fail when binding the payload: {}", e))
        })?;

        decode_payload(content_type.as_deref(), &body).map(Payload)
    }
}
