// Public API - what other modules can use
pub use claims::{Claims, TOKEN_LIFETIME_HOURS};
pub use error::AuthError;
pub use token::{JwtCodec, SecretKey, TokenCodec};

// Internal modules
mod claims;
mod error;
mod token;
