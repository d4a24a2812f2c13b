// ============================
// crates/gatekey-lib/src/service_impl.rs
// ============================
use std::collections::BTreeMap;

use async_trait::async_trait;
use metrics::counter;

use gatekey_common::Claims;

use crate::config::Settings;
use crate::credential::password::{
    hash_password, validate_password_strength, verify_password, HashCost, PasswordRequirements,
};
use crate::credential::store::{Credential, CredentialStore};
use crate::error::AuthError;
use crate::rate_limit::AuthRateLimiter;
use crate::service::AuthService;
use crate::token::{from_bearer, TokenService};

// Metric keys
const SIGNUP_CREATED: &str = "auth.signup.created";
const LOGIN_SUCCESS: &str = "auth.login.success";
const LOGIN_FAILURE: &str = "auth.login.failure";
const LOGIN_THROTTLED: &str = "auth.login.throttled";
const TOKEN_ACCEPTED: &str = "auth.token.accepted";
const TOKEN_REJECTED: &str = "auth.token.rejected";

// Verified when an identifier is unknown, so that path does the same
// amount of hashing work as a wrong-password rejection.
const DECOY_PASSWORD: &str = "gatekey-decoy-credential";

/// Default `AuthService` implementation over a credential store.
pub struct DefaultAuth<S> {
    store: S,
    tokens: TokenService,
    cost: HashCost,
    requirements: PasswordRequirements,
    token_ttl_secs: u64,
    limiter: AuthRateLimiter,
    decoy_hash: String,
}

impl<S: CredentialStore> DefaultAuth<S> {
    /// Build the service from settings.
    ///
    /// Fails fast on an unusable signing key or hash cost, before any
    /// request is served.
    pub fn new(store: S, settings: &Settings) -> Result<Self, AuthError> {
        let tokens = TokenService::from_settings(settings)?;
        let decoy_hash = hash_password(DECOY_PASSWORD, &settings.hash_cost)
            .map_err(|err| AuthError::Internal(format!("failed to prepare decoy hash: {err}")))?;

        Ok(Self {
            store,
            tokens,
            cost: settings.hash_cost.clone(),
            requirements: settings.password_requirements.clone(),
            token_ttl_secs: settings.token_ttl_secs,
            limiter: AuthRateLimiter::default(),
            decoy_hash,
        })
    }

    /// Replace the default login throttle.
    pub fn with_rate_limiter(mut self, limiter: AuthRateLimiter) -> Self {
        self.limiter = limiter;
        self
    }

    /// The token service this instance signs with.
    pub fn token_service(&self) -> &TokenService {
        &self.tokens
    }
}

#[async_trait]
impl<S: CredentialStore> AuthService for DefaultAuth<S> {
    async fn signup(&self, identifier: &str, password: &str) -> Result<String, AuthError> {
        crate::validation::validate_identifier(identifier)?;
        crate::validation::validate_password_input(password)?;
        if !validate_password_strength(password, &self.requirements) {
            return Err(AuthError::InvalidInput(format!(
                "password must be at least {} characters and contain uppercase, lowercase, digit, and special character",
                self.requirements.min_length
            )));
        }

        let secret_hash = hash_password(password, &self.cost)
            .map_err(|err| AuthError::Internal(err.to_string()))?;
        self.store
            .insert(Credential::new(identifier, secret_hash))
            .await?;

        counter!(SIGNUP_CREATED).increment(1);
        tracing::debug!(identifier, "credential registered");
        Ok(identifier.to_string())
    }

    async fn login(&self, identifier: &str, password: &str) -> Result<String, AuthError> {
        if !self.limiter.check(identifier) {
            counter!(LOGIN_THROTTLED).increment(1);
            return Err(AuthError::RateLimited);
        }

        let credential = self.store.get(identifier).await?;
        let verified = match credential.as_ref() {
            Some(credential) => verify_password(&credential.secret_hash, password),
            None => {
                // burn a verification so unknown identifiers cost the
                // same as wrong passwords
                let _ = verify_password(&self.decoy_hash, password);
                false
            },
        };

        if !verified {
            self.limiter.record_failure(identifier);
            counter!(LOGIN_FAILURE).increment(1);
            tracing::debug!(identifier, "login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        self.limiter.record_success(identifier);
        let token = self
            .tokens
            .issue(identifier, BTreeMap::new(), self.token_ttl_secs)?;
        counter!(LOGIN_SUCCESS).increment(1);
        tracing::debug!(identifier, "login accepted");
        Ok(token)
    }

    async fn authenticate(&self, bearer: &str) -> Result<Claims, AuthError> {
        let token = from_bearer(bearer).unwrap_or(bearer);
        match self.tokens.verify(token) {
            Ok(claims) => {
                counter!(TOKEN_ACCEPTED).increment(1);
                Ok(claims)
            },
            Err(err) => {
                counter!(TOKEN_REJECTED).increment(1);
                Err(err)
            },
        }
    }
}
