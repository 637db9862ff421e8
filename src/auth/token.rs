use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, instrument};

use super::{claims::Claims, error::AuthError};

/// The only algorithm tokens are issued with and accepted under
const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;
const SIGNING_ALGORITHM_NAME: &str = "HS256";

/// Symmetric key used to sign and verify tokens.
///
/// Read once at startup and shared read-only by every request.
#[derive(Clone)]
pub struct SecretKey(String);

impl SecretKey {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

/// Turns claims into a signed token and back.
/// Alternative token backends plug in behind this trait.
pub trait TokenCodec: Send + Sync {
    fn encode(&self, claims: &Claims, key: &SecretKey) -> Result<String, AuthError>;

    /// Verifies the signature, then validates the claims
    fn decode(&self, token: &str, key: &SecretKey) -> Result<Claims, AuthError>;
}

/// HS256 JWT codec backed by `jsonwebtoken`
#[derive(Debug, Clone, Copy, Default)]
pub struct JwtCodec;

#[derive(Deserialize)]
struct RawHeader {
    alg: Option<String>,
}

impl JwtCodec {
    pub fn new() -> Self {
        Self
    }

    /// Rejects tokens whose header names any algorithm other than HS256,
    /// before any signature work is attempted.
    fn check_algorithm(token: &str) -> Result<(), AuthError> {
        let segments: Vec<&str> = token.split('.').collect();
        if segments.len() != 3 || segments[0].is_empty() || segments[1].is_empty() {
            return Err(AuthError::MalformedToken);
        }

        let header_bytes = URL_SAFE_NO_PAD
            .decode(segments[0])
            .map_err(|_| AuthError::MalformedToken)?;
        let header: RawHeader =
            serde_json::from_slice(&header_bytes).map_err(|_| AuthError::MalformedToken)?;

        match header.alg.as_deref() {
            Some(SIGNING_ALGORITHM_NAME) => Ok(()),
            Some(other) => Err(AuthError::UnsupportedAlgorithm(other.to_string())),
            None => Err(AuthError::UnsupportedAlgorithm("none".to_string())),
        }
    }

    // Temporal rules belong to Claims::validate, not to the library
    fn validation() -> Validation {
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::new();
        validation
    }
}

impl TokenCodec for JwtCodec {
    #[instrument(skip(self, claims, key))]
    fn encode(&self, claims: &Claims, key: &SecretKey) -> Result<String, AuthError> {
        debug!(
            subject_id = %claims.subject_id(),
            exp_timestamp = claims.expires_at(),
            "Signing access token"
        );

        encode(
            &Header::new(SIGNING_ALGORITHM),
            claims,
            &EncodingKey::from_secret(key.as_bytes()),
        )
        .map_err(|e| {
            debug!(error = %e, "Failed to sign access token");
            AuthError::SigningError(e.to_string())
        })
    }

    #[instrument(skip(self, token, key))]
    fn decode(&self, token: &str, key: &SecretKey) -> Result<Claims, AuthError> {
        debug!("Decoding and validating access token");

        Self::check_algorithm(token)?;

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(key.as_bytes()),
            &Self::validation(),
        )
        .map(|data| data.claims)
        .map_err(|e| {
            debug!(error = %e, "Failed to decode access token");
            decode_error(e.kind())
        })?;

        claims.validate()?;

        debug!(
            subject_id = %claims.subject_id(),
            subject_name = %claims.subject_name(),
            exp = claims.expires_at(),
            "Access token decoded successfully"
        );
        Ok(claims)
    }
}

// The header was already pinned to HS256, so a library algorithm complaint
// names nothing the caller sent
fn decode_error(kind: &ErrorKind) -> AuthError {
    match kind {
        ErrorKind::InvalidSignature => AuthError::SignatureInvalid,
        ErrorKind::InvalidAlgorithm => AuthError::UnsupportedAlgorithm("unknown".to_string()),
        _ => AuthError::MalformedToken,
    }
}
