//! End-to-end signup/login/authenticate flows over the in-memory and
//! flat-file credential stores.

use std::time::Duration;

use gatekey_common::{LoginRequest, SignupRequest};
use gatekey_lib::config::Settings;
use gatekey_lib::credential::{FlatFileCredentialStore, HashCost, MemoryCredentialStore};
use gatekey_lib::error::AuthError;
use gatekey_lib::rate_limit::AuthRateLimiter;
use gatekey_lib::service::AuthService;
use gatekey_lib::{AuthState, DefaultAuth};

const TEST_KEY: &str = "an-integration-test-signing-key-of-ample-length";
const USERNAME: &str = "test123456";
const PASSWORD: &str = "Sup3r$ecret-pw";

fn test_settings() -> Settings {
    Settings {
        signing_key: TEST_KEY.to_string(),
        // cheap cost so the suite stays fast
        hash_cost: HashCost { log_n: 8, r: 8, p: 1 },
        ..Settings::default()
    }
}

fn service() -> DefaultAuth<MemoryCredentialStore> {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    DefaultAuth::new(MemoryCredentialStore::new(), &test_settings()).unwrap()
}

#[tokio::test]
async fn signup_returns_the_identifier_and_nothing_else() {
    let auth = service();

    let created = auth.signup(USERNAME, PASSWORD).await.unwrap();
    assert_eq!(created, USERNAME);
}

#[tokio::test]
async fn duplicate_signup_is_rejected() {
    let auth = service();
    auth.signup(USERNAME, PASSWORD).await.unwrap();

    let err = auth.signup(USERNAME, PASSWORD).await.unwrap_err();
    assert!(matches!(err, AuthError::DuplicateIdentifier(id) if id == USERNAME));
}

#[tokio::test]
async fn weak_passwords_are_rejected_at_signup() {
    let auth = service();

    let err = auth.signup(USERNAME, "test132").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidInput(_)));
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn unknown_user_and_wrong_password_are_indistinguishable() {
    let auth = service();
    auth.signup(USERNAME, PASSWORD).await.unwrap();

    let unknown = auth.login("doesnotexist", "whatever").await.unwrap_err();
    let wrong = auth.login(USERNAME, "whatever").await.unwrap_err();

    assert!(matches!(unknown, AuthError::InvalidCredentials));
    assert!(matches!(wrong, AuthError::InvalidCredentials));
    assert_eq!(unknown.status_code(), 401);
    assert_eq!(wrong.status_code(), 401);
    assert_eq!(unknown.sanitized_message(), wrong.sanitized_message());
}

#[tokio::test]
async fn login_issues_a_token_the_service_accepts() {
    let auth = service();
    auth.signup(USERNAME, PASSWORD).await.unwrap();

    let token = auth.login(USERNAME, PASSWORD).await.unwrap();
    assert!(!token.is_empty());
    assert_eq!(token.split('.').count(), 3);

    let claims = auth
        .authenticate(&format!("Bearer {token}"))
        .await
        .unwrap();
    assert_eq!(claims.sub, USERNAME);
    assert!(!claims.is_expired());

    // the raw token works too
    let claims = auth.authenticate(&token).await.unwrap();
    assert_eq!(claims.sub, USERNAME);
}

#[tokio::test]
async fn malformed_bearer_tokens_are_rejected() {
    let auth = service();

    let err = auth.authenticate("Bearer not-a-real-token").await.unwrap_err();
    assert!(matches!(err, AuthError::MalformedToken));
    assert_eq!(err.status_code(), 401);
}

#[tokio::test]
async fn repeated_failures_lock_the_identifier_out() {
    let settings = test_settings();
    let auth = DefaultAuth::new(MemoryCredentialStore::new(), &settings)
        .unwrap()
        .with_rate_limiter(AuthRateLimiter::new(2, Duration::from_secs(600)));
    auth.signup(USERNAME, PASSWORD).await.unwrap();

    for _ in 0..2 {
        let err = auth.login(USERNAME, "wrong-password").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    // locked out now, even with the right password
    let err = auth.login(USERNAME, PASSWORD).await.unwrap_err();
    assert!(matches!(err, AuthError::RateLimited));
    assert_eq!(err.status_code(), 429);
}

#[tokio::test]
async fn wire_payloads_drive_the_service() {
    let auth = service();

    let signup: SignupRequest = serde_json::from_str(
        r#"{"username":"test123456","password":"Sup3r$ecret-pw"}"#,
    )
    .unwrap();
    auth.signup(&signup.username, &signup.password).await.unwrap();

    let login: LoginRequest = serde_json::from_str(
        r#"{"username":"test123456","password":"Sup3r$ecret-pw"}"#,
    )
    .unwrap();
    let token = auth.login(&login.username, &login.password).await.unwrap();
    assert_eq!(token.split('.').count(), 3);
}

#[tokio::test]
async fn flat_file_store_backs_the_same_flow() {
    let dir = tempfile::tempdir().unwrap();
    let store = FlatFileCredentialStore::new(dir.path()).unwrap();
    let auth = DefaultAuth::new(store, &test_settings()).unwrap();

    auth.signup(USERNAME, PASSWORD).await.unwrap();
    let token = auth.login(USERNAME, PASSWORD).await.unwrap();
    let claims = auth.authenticate(&token).await.unwrap();
    assert_eq!(claims.sub, USERNAME);

    let err = auth.signup(USERNAME, PASSWORD).await.unwrap_err();
    assert!(matches!(err, AuthError::DuplicateIdentifier(_)));
}

#[tokio::test]
async fn auth_state_builds_only_with_a_signing_key() {
    let err = AuthState::new(MemoryCredentialStore::new(), Settings::default()).unwrap_err();
    assert!(err.is_fatal());

    let state = AuthState::new(MemoryCredentialStore::new(), test_settings()).unwrap();
    state.auth.signup(USERNAME, PASSWORD).await.unwrap();
    let token = state.auth.login(USERNAME, PASSWORD).await.unwrap();
    assert_eq!(state.auth.authenticate(&token).await.unwrap().sub, USERNAME);
}
