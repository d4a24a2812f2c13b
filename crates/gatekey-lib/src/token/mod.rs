// ============================
// crates/gatekey-lib/src/token/mod.rs
// ============================
//! Token issuance and verification.

mod service;

pub use gatekey_common::{ClaimValue, Claims};
pub use service::{
    from_bearer, SigningKey, TokenAlgorithm, TokenService, MIN_SIGNING_KEY_BYTES,
};
