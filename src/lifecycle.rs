use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

use crate::shared::{AppError, AppState};

/// Tracks whether the service still takes new requests.
/// Flipped once on shutdown and never back.
#[derive(Debug)]
pub struct ServiceLifecycle {
    accepting: AtomicBool,
}

impl ServiceLifecycle {
    pub fn new() -> Self {
        Self {
            accepting: AtomicBool::new(true),
        }
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting.load(Ordering::Acquire)
    }

    pub fn shutdown(&self) {
        if self.accepting.swap(false, Ordering::AcqRel) {
            info!("not receiving requests anymore");
        }
    }
}

impl Default for ServiceLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

/// Rejects every request with 503 once shutdown has begun.
/// Usage: .layer(middleware::from_fn_with_state(app_state.clone(), lifecycle::reject_when_stopped))
pub async fn reject_when_stopped(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !state.lifecycle.is_accepting() {
        warn!(uri = %req.uri(), "Rejecting request during shutdown");
        return Err(AppError::ServiceUnavailable);
    }

    Ok(next.run(req).await)
}
