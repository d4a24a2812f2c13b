// crates/gatekey-lib/src/error.rs

//! Central error type for the credential and token service.
use thiserror::Error;

/// Service error types with error codes and HTTP-equivalent status mapping
#[derive(Error, Debug)]
pub enum AuthError {
    /// Unknown identifier or wrong secret. The two causes are merged on
    /// purpose so callers cannot enumerate registered identifiers.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Malformed token")]
    MalformedToken,

    #[error("Token expired")]
    ExpiredToken,

    #[error("Token signature mismatch")]
    SignatureMismatch,

    #[error("Token signed with an unsupported algorithm")]
    UnsupportedAlgorithm,

    #[error("Identifier already registered: {0}")]
    DuplicateIdentifier(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Authentication rate limit exceeded")]
    RateLimited,

    #[error("Stored credential failed integrity check: {0}")]
    Integrity(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP-equivalent status code for this error.
    ///
    /// The core carries no HTTP framework; embedding layers map this
    /// number onto whatever response type they use.
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::InvalidCredentials
            | AuthError::MalformedToken
            | AuthError::ExpiredToken
            | AuthError::SignatureMismatch
            | AuthError::UnsupportedAlgorithm => 401,
            AuthError::DuplicateIdentifier(_) => 409,
            AuthError::InvalidInput(_) => 400,
            AuthError::RateLimited => 429,
            _ => 500,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "AUTH_001",
            AuthError::RateLimited => "AUTH_002",
            AuthError::DuplicateIdentifier(_) => "AUTH_003",
            AuthError::MalformedToken => "TOKEN_001",
            AuthError::ExpiredToken => "TOKEN_002",
            AuthError::SignatureMismatch => "TOKEN_003",
            AuthError::UnsupportedAlgorithm => "TOKEN_004",
            AuthError::InvalidInput(_) => "VAL_001",
            AuthError::Integrity(_) => "STORE_001",
            AuthError::Config(_) => "CFG_001",
            AuthError::Io(_) => "IO_001",
            AuthError::Json(_) => "JSON_001",
            AuthError::Internal(_) => "INT_001",
        }
    }

    /// Get a sanitized message suitable for production use.
    ///
    /// Every authentication rejection sanitizes to the same text, so the
    /// response body reveals nothing beyond "it failed".
    pub fn sanitized_message(&self) -> String {
        match self {
            AuthError::InvalidCredentials
            | AuthError::MalformedToken
            | AuthError::ExpiredToken
            | AuthError::SignatureMismatch
            | AuthError::UnsupportedAlgorithm => "Authentication failed".to_string(),
            AuthError::DuplicateIdentifier(_) => "Identifier already registered".to_string(),
            AuthError::InvalidInput(_) => "Invalid input provided".to_string(),
            AuthError::RateLimited => {
                "Too many authentication attempts, please try again later".to_string()
            },
            _ => "An internal server error occurred".to_string(),
        }
    }

    /// Whether this error must abort process initialization.
    ///
    /// Only configuration errors are fatal; every runtime failure is a
    /// typed result the caller maps to a status.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AuthError::Config(_))
    }
}

impl From<String> for AuthError {
    fn from(msg: String) -> Self {
        AuthError::Internal(msg)
    }
}

impl From<&str> for AuthError {
    fn from(msg: &str) -> Self {
        AuthError::Internal(msg.to_string())
    }
}
