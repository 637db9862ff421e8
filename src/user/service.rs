use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    models::{NewUser, User},
    password::{hash_password, verify_password},
    repository::UserRepository,
    types::{AuthResponse, LoginRequest, RegisterRequest},
};
use crate::auth::{Claims, SecretKey, TokenCodec};
use crate::shared::{AppError, AppState};

/// Service for registration, login and token issuance
pub struct UserService {
    repository: Arc<dyn UserRepository + Send + Sync>,
    token_codec: Arc<dyn TokenCodec>,
    secret_key: SecretKey,
    token_lifetime: Duration,
}

impl UserService {
    pub fn new(
        repository: Arc<dyn UserRepository + Send + Sync>,
        token_codec: Arc<dyn TokenCodec>,
        secret_key: SecretKey,
        token_lifetime: Duration,
    ) -> Self {
        Self {
            repository,
            token_codec,
            secret_key,
            token_lifetime,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            Arc::clone(&state.user_repository),
            Arc::clone(&state.token_codec),
            state.secret_key.clone(),
            state.token_lifetime,
        )
    }

    /// Registers a new user and returns their first access token
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AppError> {
        require_value(&request.name, "name")?;
        require_value(&request.username, "username")?;
        require_value(&request.password, "password")?;

        if self
            .repository
            .find_by_username(&request.username)
            .await?
            .is_some()
        {
            warn!("Registration rejected, username taken");
            return Err(AppError::BadRequest(
                "user with this username already registered".to_string(),
            ));
        }

        let password_hash = hash_password(&request.password)?;

        let user = self
            .repository
            .create_user(NewUser {
                name: request.name,
                username: request.username,
                password_hash,
            })
            .await
            .map_err(|e| AppError::Unprocessable(format!("fail inserting user into db: {}", e)))?;

        info!(user_id = user.id, "User registered");
        self.authenticated(user)
    }

    /// Checks credentials and returns a fresh access token
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AppError> {
        require_value(&request.username, "username")?;
        require_value(&request.password, "password")?;

        let user = self
            .repository
            .find_by_username(&request.username)
            .await?
            .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;

        if !verify_password(&request.password, &user.password_hash)? {
            warn!(user_id = user.id, "Login rejected, wrong password");
            return Err(AppError::Unauthorized("wrong password".to_string()));
        }

        info!(user_id = user.id, "User logged in");
        self.authenticated(user)
    }

    /// Signs a token for `user` valid from now for the configured lifetime
    pub fn issue_token(&self, user: &User) -> Result<String, AppError> {
        let claims = Claims::issue(
            user.id.to_string(),
            user.username.clone(),
            Utc::now(),
            self.token_lifetime,
        );

        Ok(self.token_codec.encode(&claims, &self.secret_key)?)
    }

    fn authenticated(&self, user: User) -> Result<AuthResponse, AppError> {
        let access_token = self.issue_token(&user)?;

        Ok(AuthResponse {
            access_token,
            user: user.profile(),
        })
    }
}

fn require_value(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest(format!("{} cannot be empty", field)));
    }
    Ok(())
}
