use axum::response::{IntoResponse, Response};
use futures::future::BoxFuture;
use tracing::warn;

use super::handler::{Handler, Request};
use crate::shared::AppError;

/// Largest request body buffered into the pipeline
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Turns a chain `Handler` into something axum can route to.
///
/// The body is read into memory exactly once here; every later stage works
/// on the buffered copy.
pub fn into_route_handler(
    handler: Handler,
) -> impl Fn(axum::extract::Request) -> BoxFuture<'static, Response> + Clone + Send + Sync + 'static
{
    move |req: axum::extract::Request| -> BoxFuture<'static, Response> {
        let handler = handler.clone();
        Box::pin(async move {
            let (parts, body) = req.into_parts();
            let body = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(error = %e, "Failed to buffer request body");
                    return AppError::BadRequest(format!(
                        "error when reading the request body: {}",
                        e
                    ))
                    .into_response();
                }
            };

            handler(Request::new(parts.method, parts.uri, parts.headers, body)).await
        })
    }
}
