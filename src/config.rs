use chrono::Duration;
use clap::Parser;

use crate::auth::{SecretKey, TOKEN_LIFETIME_HOURS};

/// Keeps `exp` a 10-digit epoch time for any issuance in this century
const MAX_TOKEN_LIFETIME_HOURS: i64 = 100_000;

/// Server configuration; every flag can also come from the environment
#[derive(Debug, Clone, Parser)]
#[command(author, version, about = "JWT login example server.")]
pub struct Config {
    /// Server secret key used to sign and verify access tokens
    #[arg(long, env = "SECRET_KEY", default_value = "ndjsHJUTUI8uok", hide_env_values = true)]
    pub secret_key: String,

    /// Address to bind
    #[arg(long, env = "LISTEN_ADDRESS", default_value = "localhost:8000")]
    pub listen_address: String,

    /// Connection string to postgres; users are kept in memory when absent
    #[arg(long, env = "DB_URL")]
    pub db_url: Option<String>,

    /// Whether to show sql debug logs or not
    #[arg(long, env = "DB_DEBUG")]
    pub db_debug: bool,

    /// Lifetime of issued access tokens, in hours
    #[arg(
        long,
        env = "TOKEN_LIFETIME_HOURS",
        default_value_t = TOKEN_LIFETIME_HOURS,
        value_parser = clap::value_parser!(i64).range(1..=MAX_TOKEN_LIFETIME_HOURS)
    )]
    pub token_lifetime_hours: i64,
}

impl Config {
    pub fn secret_key(&self) -> SecretKey {
        SecretKey::new(self.secret_key.clone())
    }

    pub fn token_lifetime(&self) -> Duration {
        Duration::hours(self.token_lifetime_hours)
    }

    /// Default tracing filter when RUST_LOG is unset
    pub fn default_log_filter(&self) -> String {
        let sqlx_level = if self.db_debug { "debug" } else { "warn" };
        format!("jwt_login=debug,tower_http=debug,sqlx={}", sqlx_level)
    }
}
