// ============================
// crates/gatekey-lib/src/token/service.rs
// ============================
//! Bearer-token issuance and verification.
use std::collections::BTreeMap;

use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
    Engine as _,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use gatekey_common::{ClaimValue, Claims};

use crate::config::Settings;
use crate::error::AuthError;

/// Minimum signing key size in bytes (256 bits)
pub const MIN_SIGNING_KEY_BYTES: usize = 32;

/// Signing algorithms the service will mint and accept.
///
/// The verifier accepts exactly the configured algorithm; a token whose
/// header names anything else is rejected without further inspection.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenAlgorithm {
    HS256,
    HS384,
    HS512,
}

impl Default for TokenAlgorithm {
    fn default() -> Self {
        TokenAlgorithm::HS256
    }
}

impl From<TokenAlgorithm> for jsonwebtoken::Algorithm {
    fn from(algorithm: TokenAlgorithm) -> Self {
        match algorithm {
            TokenAlgorithm::HS256 => jsonwebtoken::Algorithm::HS256,
            TokenAlgorithm::HS384 => jsonwebtoken::Algorithm::HS384,
            TokenAlgorithm::HS512 => jsonwebtoken::Algorithm::HS512,
        }
    }
}

/// Symmetric signing key material.
///
/// Loaded once at startup, read-only for the process lifetime, wiped on
/// drop. Rotation would require a key id in the token header and a
/// versioned lookup; the single-key lifecycle has no mid-process
/// mutation.
pub struct SigningKey(Vec<u8>);

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey").finish_non_exhaustive()
    }
}

impl SigningKey {
    /// Parse key material from configuration.
    ///
    /// Accepts base64 (url-safe or standard) or raw bytes, and enforces
    /// the minimum size. An empty or short key is a fatal configuration
    /// error.
    pub fn from_config(raw: &str) -> Result<Self, AuthError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AuthError::Config("signing key is missing".to_string()));
        }

        let bytes = decode_key_material(trimmed);
        if bytes.len() < MIN_SIGNING_KEY_BYTES {
            return Err(AuthError::Config(format!(
                "signing key must be at least {MIN_SIGNING_KEY_BYTES} bytes, got {}",
                bytes.len()
            )));
        }
        Ok(Self(bytes))
    }

    /// Generate a fresh key from OS entropy, for provisioning and tests.
    pub fn generate() -> Self {
        let mut buffer = vec![0u8; MIN_SIGNING_KEY_BYTES];
        OsRng.fill_bytes(&mut buffer);
        Self(buffer)
    }

    /// Encode the key for storage in configuration.
    pub fn to_base64(&self) -> String {
        URL_SAFE_NO_PAD.encode(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Drop for SigningKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

fn decode_key_material(raw: &str) -> Vec<u8> {
    if let Ok(bytes) = URL_SAFE_NO_PAD.decode(raw) {
        if bytes.len() >= MIN_SIGNING_KEY_BYTES {
            return bytes;
        }
    }
    if let Ok(bytes) = STANDARD.decode(raw) {
        if bytes.len() >= MIN_SIGNING_KEY_BYTES {
            return bytes;
        }
    }
    raw.as_bytes().to_vec()
}

/// Issues and verifies signed bearer tokens.
///
/// Stateless and shareable: issuance and verification touch no mutable
/// state, so one instance serves arbitrarily many concurrent callers.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: TokenAlgorithm,
}

impl TokenService {
    /// Create a token service bound to a key and algorithm.
    pub fn new(key: &SigningKey, algorithm: TokenAlgorithm) -> Self {
        Self {
            encoding: EncodingKey::from_secret(key.as_bytes()),
            decoding: DecodingKey::from_secret(key.as_bytes()),
            algorithm,
        }
    }

    /// Create a token service from loaded settings.
    ///
    /// This is the process-startup path: a missing or undersized signing
    /// key aborts here, before any request is served.
    pub fn from_settings(settings: &Settings) -> Result<Self, AuthError> {
        let key = SigningKey::from_config(&settings.signing_key)?;
        Ok(Self::new(&key, settings.algorithm))
    }

    pub fn algorithm(&self) -> TokenAlgorithm {
        self.algorithm
    }

    /// Issue a token for `subject`, valid for `ttl_secs` from now.
    ///
    /// Output is the compact three-segment form: base64url header
    /// (algorithm + type), base64url payload, base64url signature.
    pub fn issue(
        &self,
        subject: &str,
        extra: BTreeMap<String, ClaimValue>,
        ttl_secs: u64,
    ) -> Result<String, AuthError> {
        let ttl = i64::try_from(ttl_secs).unwrap_or(i64::MAX);
        self.sign(&Claims::new(subject, extra, ttl))
    }

    /// Sign caller-built claims.
    pub fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(self.algorithm.into()), claims, &self.encoding)
            .map_err(|err| AuthError::Internal(format!("token signing failed: {err}")))
    }

    /// Verify a token and return its claims.
    ///
    /// Signature integrity is checked before any claim is inspected, so a
    /// tampered payload can never surface a claims-level error. Expiry is
    /// enforced with zero leeway.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(self.algorithm.into());
        validation.leeway = 0;
        validation.validate_exp = true;

        match decode::<Claims>(token, &self.decoding, &validation) {
            Ok(data) => Ok(data.claims),
            Err(err) => Err(map_token_error(&err)),
        }
    }
}

/// Extract the token from an `Authorization`-style header value.
pub fn from_bearer(value: &str) -> Option<&str> {
    value.strip_prefix("Bearer ").map(str::trim)
}

fn map_token_error(err: &jsonwebtoken::errors::Error) -> AuthError {
    use jsonwebtoken::errors::ErrorKind;

    match err.kind() {
        ErrorKind::InvalidSignature => AuthError::SignatureMismatch,
        ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
        ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
            AuthError::UnsupportedAlgorithm
        },
        ErrorKind::InvalidToken
        | ErrorKind::MissingRequiredClaim(_)
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_) => AuthError::MalformedToken,
        _ => AuthError::Internal(err.to_string()),
    }
}
