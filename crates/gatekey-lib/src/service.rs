// ============================
// crates/gatekey-lib/src/service.rs
// ============================
//! Service seam between the credential/token core and embedding layers.
use async_trait::async_trait;

use gatekey_common::Claims;

use crate::error::AuthError;

/// Capability object an embedding layer (HTTP handlers, RPC, CLI) calls
/// into. Passed in explicitly rather than auto-wired, so identity
/// verification stays decoupled from routing and tests can substitute
/// their own implementation.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new credential and return its identifier.
    ///
    /// Hash material never leaves the core.
    async fn signup(&self, identifier: &str, password: &str) -> Result<String, AuthError>;

    /// Exchange an identifier/password pair for a signed bearer token.
    ///
    /// Unknown identifier and wrong password are indistinguishable to the
    /// caller: both are `InvalidCredentials`.
    async fn login(&self, identifier: &str, password: &str) -> Result<String, AuthError>;

    /// Verify a bearer token and return its claims.
    ///
    /// Accepts either the raw token or a `Bearer `-prefixed header value.
    async fn authenticate(&self, bearer: &str) -> Result<Claims, AuthError>;
}
