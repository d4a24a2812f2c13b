// ============================
// gatekey-lib/src/lib.rs
// ============================
//! Core credential and bearer-token service.
//!
//! Two leaf components composed linearly: the credential verifier owns
//! password hashing policy, the token service owns the signing key and
//! the token lifecycle. [`AuthService`] is the narrow seam embedding
//! layers call into; everything HTTP-, schema-, or UI-shaped lives with
//! the caller.

pub mod config;
pub mod credential;
pub mod error;
pub mod rate_limit;
pub mod service;
mod service_impl;
pub mod token;
pub mod validation;

pub use gatekey_common as common;
pub use service_impl::DefaultAuth;

use std::sync::Arc;

use crate::config::Settings;
use crate::credential::store::CredentialStore;
use crate::error::AuthError;
use crate::rate_limit::AuthRateLimiter;
use crate::service::AuthService;

/// Service state an embedding process shares across its handlers
#[derive(Clone)]
pub struct AuthState<S> {
    /// Authentication service
    pub auth: Arc<dyn AuthService>,
    /// Settings the service was built from
    pub settings: Arc<Settings>,
    /// Credential storage backend
    pub store: S,
    /// Login throttle, shared with the service
    pub limiter: AuthRateLimiter,
}

impl<S> std::fmt::Debug for AuthState<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("settings", &self.settings)
            .field("limiter", &self.limiter)
            .finish_non_exhaustive()
    }
}

impl<S: CredentialStore + Clone + 'static> AuthState<S> {
    /// Create service state over a storage backend.
    ///
    /// This is the composition root: the settings are validated, the
    /// signing key is loaded exactly once, and everything downstream
    /// treats it as immutable.
    pub fn new(store: S, settings: Settings) -> Result<Self, AuthError> {
        settings.validate()?;

        let limiter = AuthRateLimiter::default();
        let auth = DefaultAuth::new(store.clone(), &settings)?
            .with_rate_limiter(limiter.clone());

        Ok(Self {
            auth: Arc::new(auth),
            settings: Arc::new(settings),
            store,
            limiter,
        })
    }
}
