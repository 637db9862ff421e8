use serde::{Deserialize, Serialize};

/// Body of POST /api/v1/user/register
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Body of POST /api/v1/user/login
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub registered_at: i64, // Epoch seconds
}

/// Response for login and registration
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct AuthResponse {
    pub access_token: String,
    pub user: UserProfile,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ProfileResponse {
    pub user: UserProfile,
}
