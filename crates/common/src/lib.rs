// ================
// common/src/lib.rs
// ================
//! Common types shared between the gatekey core and its collaborators.
//! This module defines the claims carried inside bearer tokens and the
//! request/response payloads an embedding layer serializes on the wire.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single scalar claim value.
///
/// Token payloads are flat: every custom claim is a scalar. Nested
/// structures are rejected at deserialization time.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum ClaimValue {
    /// Boolean claim
    Bool(bool),
    /// Integer claim
    Int(i64),
    /// Floating-point claim
    Float(f64),
    /// String claim
    Str(String),
}

impl From<bool> for ClaimValue {
    fn from(value: bool) -> Self {
        ClaimValue::Bool(value)
    }
}

impl From<i64> for ClaimValue {
    fn from(value: i64) -> Self {
        ClaimValue::Int(value)
    }
}

impl From<f64> for ClaimValue {
    fn from(value: f64) -> Self {
        ClaimValue::Float(value)
    }
}

impl From<&str> for ClaimValue {
    fn from(value: &str) -> Self {
        ClaimValue::Str(value.to_string())
    }
}

impl From<String> for ClaimValue {
    fn from(value: String) -> Self {
        ClaimValue::Str(value)
    }
}

/// The payload of a bearer token.
///
/// Immutable once issued: the signature covers every field. Registered
/// fields use the conventional short names so tokens interoperate with
/// standard bearer-token tooling.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Claims {
    /// Subject: the authenticated identifier
    pub sub: String,
    /// Issuance time, unix seconds
    pub iat: i64,
    /// Expiry time, unix seconds
    pub exp: i64,
    /// Unique token id, for audit trails and future revocation
    pub jti: String,
    /// Custom scalar claims
    #[serde(flatten)]
    pub extra: BTreeMap<String, ClaimValue>,
}

impl Claims {
    /// Create claims issued now, expiring `ttl_secs` from now.
    pub fn new(
        subject: impl Into<String>,
        extra: BTreeMap<String, ClaimValue>,
        ttl_secs: i64,
    ) -> Self {
        Self::new_at(subject, extra, ttl_secs, Utc::now().timestamp())
    }

    /// Create claims with an explicit issuance time.
    ///
    /// Expiry is always `issued_at + ttl_secs`.
    pub fn new_at(
        subject: impl Into<String>,
        extra: BTreeMap<String, ClaimValue>,
        ttl_secs: i64,
        issued_at: i64,
    ) -> Self {
        Self {
            sub: subject.into(),
            iat: issued_at,
            exp: issued_at.saturating_add(ttl_secs),
            jti: Uuid::new_v4().to_string(),
            extra,
        }
    }

    /// Add a custom claim.
    pub fn with_claim(mut self, name: impl Into<String>, value: impl Into<ClaimValue>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }

    /// Look up a custom claim by name.
    pub fn get(&self, name: &str) -> Option<&ClaimValue> {
        self.extra.get(name)
    }

    /// Whether the token has passed its expiry time.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Remaining lifetime in seconds, zero once expired.
    pub fn remaining_ttl(&self) -> i64 {
        (self.exp - Utc::now().timestamp()).max(0)
    }
}

/// Request to register a new credential
/// # Fields
/// * `username` - Unique, case-sensitive identifier
/// * `password` - Plaintext secret, hashed by the core and never stored
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
}

/// Response to a successful signup.
///
/// Carries only the identifier: hash material never leaves the core.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SignupResponse {
    pub username: String,
}

/// Request to exchange a credential pair for a bearer token
/// # Fields
/// * `username` - Identifier to authenticate as
/// * `password` - Plaintext secret to verify
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response to a successful login
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginResponse {
    /// Signed bearer token in compact three-segment form
    pub token: String,
}
