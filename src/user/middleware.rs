use axum::http::header::AUTHORIZATION;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{models::User, repository::UserRepository};
use crate::auth::{AuthError, SecretKey, TokenCodec};
use crate::pipeline::{handler_fn, middleware_fn, Handler, Middleware, Request};
use crate::shared::{AppError, AppState};

/// Access token authentication for chain handlers.
///
/// Reads a bearer token from the `Authorization` header, falling back to an
/// `access_token` field in the JSON or form body. The inner handler only runs
/// once the token verifies and its subject resolves to a stored user, which
/// is attached to the request.
#[derive(Clone)]
pub struct AuthMiddleware {
    token_codec: Arc<dyn TokenCodec>,
    secret_key: SecretKey,
    users: Arc<dyn UserRepository + Send + Sync>,
}

#[derive(Deserialize)]
struct BodyToken {
    access_token: Option<String>,
}

impl AuthMiddleware {
    pub fn new(
        token_codec: Arc<dyn TokenCodec>,
        secret_key: SecretKey,
        users: Arc<dyn UserRepository + Send + Sync>,
    ) -> Self {
        Self {
            token_codec,
            secret_key,
            users,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            Arc::clone(&state.token_codec),
            state.secret_key.clone(),
            Arc::clone(&state.user_repository),
        )
    }

    /// Authenticates `req`, then delegates to `next` or answers with the failure
    #[instrument(name = "auth_middleware", skip(self, req, next), fields(uri = %req.uri()))]
    pub async fn handle(&self, mut req: Request, next: Handler) -> Response {
        match self.authenticate(&req).await {
            Ok(user) => {
                info!(
                    user_id = user.id,
                    username = %user.username,
                    "Authentication successful, attaching user to request"
                );
                req.set_user(user);
                next(req).await
            }
            Err(e) => {
                warn!(error = %e, "Request rejected by auth middleware");
                e.into_response()
            }
        }
    }

    async fn authenticate(&self, req: &Request) -> Result<User, AppError> {
        // A missing token still goes through decode so there is one failure path
        let token = extract_token(req);

        let claims = self.token_codec.decode(&token, &self.secret_key)?;
        debug!(subject_id = %claims.subject_id(), "Access token verified");

        let not_found = || AuthError::IdentityNotFound(claims.subject_id().to_string());
        let user_id: i64 = claims.subject_id().parse().map_err(|_| not_found())?;

        match self.users.find_by_id(user_id).await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => {
                warn!(user_id, "Token subject no longer exists");
                Err(not_found().into())
            }
            Err(e) => {
                warn!(user_id, error = %e, "Identity lookup failed");
                Err(not_found().into())
            }
        }
    }
}

/// Wraps handlers so they only run for authenticated callers.
/// Usage: Chain::new().with(protect(&state)).then(handler)
pub fn protect(state: &AppState) -> Middleware {
    let auth = Arc::new(AuthMiddleware::from_state(state));

    middleware_fn(move |next: Handler| {
        let auth = Arc::clone(&auth);
        handler_fn(move |req| {
            let auth = Arc::clone(&auth);
            let next = Arc::clone(&next);
            async move { auth.handle(req, next).await }
        })
    })
}

/// Candidate token from the header, else the body, else empty
pub fn extract_token(req: &Request) -> String {
    bearer_token(req)
        .or_else(|| body_token(req))
        .unwrap_or_default()
}

fn bearer_token(req: &Request) -> Option<String> {
    let header = req.header(AUTHORIZATION)?.trim();
    let mut parts = header.split_whitespace();

    let scheme = parts.next()?;
    let token = parts.next()?;

    scheme
        .eq_ignore_ascii_case("bearer")
        .then(|| token.to_string())
}

// Peeks at the buffered JSON or form body; the bytes stay on the request
fn body_token(req: &Request) -> Option<String> {
    if req.body().is_empty() {
        return None;
    }

    req.bind::<BodyToken>()
        .ok()?
        .access_token
        .filter(|token| !token.trim().is_empty())
}
