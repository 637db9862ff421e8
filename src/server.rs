use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::lifecycle::{reject_when_stopped, ServiceLifecycle};
use crate::pipeline::{into_route_handler, Chain};
use crate::shared::{AppError, AppState};
use crate::user;

/// Builds the application router with every route and layer wired up
pub fn build_router(state: AppState) -> Router {
    let protected = Chain::new().with(user::protect(&state));

    let user_routes = Router::new()
        .route("/register", post(user::register))
        .route("/login", post(user::login))
        .route(
            "/profile",
            get(into_route_handler(protected.then(user::profile_handler()))),
        );

    Router::new()
        .nest("/api/v1/user", user_routes)
        .fallback(route_not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            reject_when_stopped,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn route_not_found() -> AppError {
    AppError::NotFound("route not found".to_string())
}

/// Serves `state` on `listener` until ctrl-c or SIGTERM, then stops taking
/// requests and drains in-flight ones.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    let lifecycle = Arc::clone(&state.lifecycle);
    let app = build_router(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(lifecycle))
        .await
}

async fn shutdown_signal(lifecycle: Arc<ServiceLifecycle>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("got an interrupt, exiting...");
    lifecycle.shutdown();
}
