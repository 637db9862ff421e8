use clap::Parser;
use jwt_login::{
    server, AppState, Config, InMemoryUserRepository, PostgresUserRepository, UserRepository,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    let config = Config::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.default_log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting JWT login server");

    // Postgres when a connection string is given, otherwise an in-memory store
    let user_repository: Arc<dyn UserRepository + Send + Sync> = match &config.db_url {
        Some(db_url) => match PostgresUserRepository::connect(db_url).await {
            Ok(repository) => Arc::new(repository),
            Err(e) => {
                error!(error = %e, "database connection fail");
                return;
            }
        },
        None => {
            warn!("No database configured, users are kept in memory");
            Arc::new(InMemoryUserRepository::new())
        }
    };

    let app_state = AppState::new(config.secret_key(), user_repository)
        .with_token_lifetime(config.token_lifetime());

    let listener = match tokio::net::TcpListener::bind(&config.listen_address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, address = %config.listen_address, "failed to bind listen address");
            return;
        }
    };

    info!("running api at {}", config.listen_address);
    if let Err(e) = server::serve(listener, app_state).await {
        error!(error = %e, "error while running api, exiting...");
    }
}
