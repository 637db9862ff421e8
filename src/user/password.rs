use crate::shared::AppError;

/// Hash a password using bcrypt.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    // Use a lower cost factor for development speed
    let cost = if cfg!(debug_assertions) { 4 } else { 10 };
    bcrypt::hash(password, cost)
        .map_err(|e| AppError::Unprocessable(format!("fail when hashing password: {}", e)))
}

/// Verify a password against a bcrypt hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    bcrypt::verify(password, hash)
        .map_err(|e| AppError::Unprocessable(format!("fail when checking password: {}", e)))
}
