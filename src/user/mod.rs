// Public API - what other modules can use
pub use handlers::{login, profile, profile_handler, register};
pub use middleware::{extract_token, protect, AuthMiddleware};
pub use service::UserService;

// Internal modules
mod handlers;
mod middleware;
pub mod models;
mod password;
pub mod repository;
mod service;
pub mod types;
