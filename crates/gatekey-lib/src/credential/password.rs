// ============================
// crates/gatekey-lib/src/credential/password.rs
// ============================
//! Password hashing and verification.
use scrypt::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
    Params, Scrypt,
};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::error::AuthError;

/// Minimum password length
pub const MIN_PASSWORD_LENGTH: usize = 10;

/// Scrypt cost parameters.
///
/// The cost trades hashing latency for brute-force resistance. Parameters
/// are embedded in each emitted hash string, so lowering the cost only
/// affects credentials hashed afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashCost {
    /// log2 of the scrypt work factor N
    pub log_n: u8,
    /// Block size
    pub r: u32,
    /// Parallelism
    pub p: u32,
}

impl Default for HashCost {
    fn default() -> Self {
        Self {
            log_n: Params::RECOMMENDED_LOG_N,
            r: Params::RECOMMENDED_R,
            p: Params::RECOMMENDED_P,
        }
    }
}

impl HashCost {
    /// Build scrypt parameters, rejecting out-of-range cost values.
    pub fn params(&self) -> Result<Params, AuthError> {
        Params::new(self.log_n, self.r, self.p, Params::RECOMMENDED_LEN)
            .map_err(|err| AuthError::Config(format!("invalid scrypt cost parameters: {err}")))
    }
}

/// Password complexity requirements
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordRequirements {
    pub min_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_digit: bool,
    pub require_special: bool,
}

impl Default for PasswordRequirements {
    fn default() -> Self {
        Self {
            min_length: MIN_PASSWORD_LENGTH,
            require_uppercase: true,
            require_lowercase: true,
            require_digit: true,
            require_special: true,
        }
    }
}

/// Hash a password using scrypt.
///
/// Every call draws a fresh salt: hashing the same plaintext twice yields
/// different strings, and both verify against the original plaintext.
pub fn hash_password(plain: &str, cost: &HashCost) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let params = cost.params()?;
    let hash = Scrypt
        .hash_password_customized(plain.as_bytes(), None, None, params, &salt)?
        .to_string();
    Ok(hash)
}

/// Verify a password against a hash.
///
/// Fails closed: a stored hash that cannot be parsed counts as a
/// verification failure and is logged as a data-integrity warning,
/// never an error the caller has to handle.
pub fn verify_password(hash: &str, plain: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(err) => {
            tracing::warn!(%err, "stored credential hash is malformed, failing verification");
            return false;
        },
    };
    Scrypt.verify_password(plain.as_bytes(), &parsed_hash).is_ok()
}

/// Check if a password meets the complexity requirements
pub fn validate_password_strength(password: &str, requirements: &PasswordRequirements) -> bool {
    if password.len() < requirements.min_length {
        return false;
    }

    if requirements.require_uppercase && !password.chars().any(|c| c.is_uppercase()) {
        return false;
    }

    if requirements.require_lowercase && !password.chars().any(|c| c.is_lowercase()) {
        return false;
    }

    if requirements.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
        return false;
    }

    if requirements.require_special && !password.chars().any(|c| !c.is_alphanumeric()) {
        return false;
    }

    true
}

/// Securely hash a password and zeroize the original
pub fn hash_password_secure(plain: &mut String, cost: &HashCost) -> anyhow::Result<String> {
    let hash = hash_password(plain, cost)?;
    plain.zeroize();
    Ok(hash)
}
