use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::error::AuthError;

/// Lifetime of tokens handed out at login and registration
pub const TOKEN_LIFETIME_HOURS: i64 = 5;

// Epoch seconds rendered with exactly 10 digits
const EPOCH_SECONDS_MIN: i64 = 1_000_000_000;
const EPOCH_SECONDS_MAX: i64 = 9_999_999_999;

/// Identity and validity window carried by an access token.
///
/// Serialised with the short keys of the token payload (`id`, `username`,
/// `iss`, `nbf`, `exp`). Values are never mutated after construction; every
/// issuance builds a fresh set of claims.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    #[serde(rename = "id")]
    subject_id: String,
    #[serde(rename = "username")]
    subject_name: String,
    #[serde(rename = "iss")]
    issued_at: i64,
    #[serde(rename = "nbf")]
    not_before: i64,
    #[serde(rename = "exp")]
    expires_at: i64,
}

impl Claims {
    pub fn new(
        subject_id: impl Into<String>,
        subject_name: impl Into<String>,
        issued_at: i64,
        not_before: i64,
        expires_at: i64,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            subject_name: subject_name.into(),
            issued_at,
            not_before,
            expires_at,
        }
    }

    /// Claims for a token issued and activated at `now`, expiring after `lifetime`
    pub fn issue(
        subject_id: impl Into<String>,
        subject_name: impl Into<String>,
        now: DateTime<Utc>,
        lifetime: Duration,
    ) -> Self {
        let issued_at = now.timestamp();
        Self::new(
            subject_id,
            subject_name,
            issued_at,
            issued_at,
            (now + lifetime).timestamp(),
        )
    }

    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    pub fn subject_name(&self) -> &str {
        &self.subject_name
    }

    pub fn issued_at(&self) -> i64 {
        self.issued_at
    }

    pub fn not_before(&self) -> i64 {
        self.not_before
    }

    pub fn expires_at(&self) -> i64 {
        self.expires_at
    }

    /// Validates the claims against the current wall-clock time
    pub fn validate(&self) -> Result<(), AuthError> {
        self.validate_at(Utc::now().timestamp())
    }

    /// Validates the claims against `now` (epoch seconds).
    ///
    /// Checks run in a fixed order and stop at the first failure.
    pub fn validate_at(&self, now: i64) -> Result<(), AuthError> {
        if self.subject_id.trim().is_empty() {
            return Err(AuthError::MissingSubjectId);
        }

        if self.subject_name.trim().is_empty() {
            return Err(AuthError::MissingSubjectName);
        }

        if !is_epoch_seconds(self.issued_at) {
            return Err(AuthError::IssuedAtInvalid);
        }

        if self.issued_at > now {
            return Err(AuthError::TokenUsedBeforeIssued);
        }

        if !is_epoch_seconds(self.not_before) {
            return Err(AuthError::NotBeforeInvalid);
        }

        // Active from the not-before second onwards, inclusive
        if self.not_before > now {
            return Err(AuthError::TokenNotYetValid);
        }

        if !is_epoch_seconds(self.expires_at) || self.expires_at <= now {
            return Err(AuthError::TokenExpired);
        }

        Ok(())
    }
}

fn is_epoch_seconds(value: i64) -> bool {
    (EPOCH_SECONDS_MIN..=EPOCH_SECONDS_MAX).contains(&value)
}
