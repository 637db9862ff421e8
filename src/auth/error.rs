use thiserror::Error;

/// Failures raised while issuing, decoding or validating an access token
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("token is malformed")]
    MalformedToken,

    #[error("signature is invalid")]
    SignatureInvalid,

    #[error("unexpected signing method: {0}")]
    UnsupportedAlgorithm(String),

    #[error("id must contain a value")]
    MissingSubjectId,

    #[error("username must contain a value")]
    MissingSubjectName,

    #[error("iss must be an epoch time of 10 digits")]
    IssuedAtInvalid,

    #[error("token used before issued")]
    TokenUsedBeforeIssued,

    #[error("nbf must be an epoch time of 10 digits")]
    NotBeforeInvalid,

    #[error("token is not valid yet")]
    TokenNotYetValid,

    #[error("token is expired")]
    TokenExpired,

    #[error("fail generating access token: {0}")]
    SigningError(String),

    #[error("no identity found for subject {0}")]
    IdentityNotFound(String),
}
