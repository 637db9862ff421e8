// Library crate for the JWT login server
// This file exposes the public API for the binary and integration tests

pub mod auth;
pub mod config;
pub mod lifecycle;
pub mod pipeline;
pub mod server;
pub mod shared;
pub mod user;

// Re-export commonly used types for easier access in tests
pub use auth::{AuthError, Claims, JwtCodec, SecretKey, TokenCodec};
pub use config::Config;
pub use lifecycle::ServiceLifecycle;
pub use pipeline::{chain, Chain, Handler, Middleware, Request};
pub use server::build_router;
pub use shared::{AppError, AppState};
pub use user::repository::{InMemoryUserRepository, PostgresUserRepository, UserRepository};
