//! Session lifecycle integration tests
//!
//! Drives `SessionManager` against a wiremock server, covering the login,
//! register, refresh, and logout transitions and the credential-atomicity
//! guarantees around them.

mod common;

use common::{access_token, api_and_session, authed_store};

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use chitchat::auth::{MemoryTokenStore, TokenStore};
use chitchat::error::AuthError;

// ---------------------------------------------------------------------------
// login
// ---------------------------------------------------------------------------

/// Successful login stores both tokens and flips the session to
/// authenticated with the user id decoded from the access token.
#[tokio::test]
async fn test_login_success_establishes_session() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .and(body_json(json!({"username": "alice", "password": "correct-pw"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": access_token(1),
            "refresh": "refresh-1",
        })))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let (_api, session) = api_and_session(&server.uri(), store.clone());

    session.login("alice", "correct-pw").await.expect("login succeeds");

    // Both tokens present, never access-only.
    let credential = store.get().unwrap().expect("credential stored");
    assert_eq!(credential.access, access_token(1));
    assert_eq!(credential.refresh, "refresh-1");

    let current = session.current_session();
    assert!(current.is_authenticated);
    assert_eq!(current.user_id, Some(1));
}

/// A 401 from the login endpoint maps to `InvalidCredentials` and leaves
/// the store untouched: the session stays anonymous.
#[tokio::test]
async fn test_login_rejected_leaves_session_anonymous() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "No active account found with the given credentials"
        })))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let (_api, session) = api_and_session(&server.uri(), store.clone());

    let result = session.login("alice", "wrong-pw").await;
    assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    assert!(store.get().unwrap().is_none());
    assert!(!session.current_session().is_authenticated);
}

/// Server failures map to `AuthUnavailable`, distinct from bad
/// credentials.
#[tokio::test]
async fn test_login_server_error_is_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let (_api, session) = api_and_session(&server.uri(), store.clone());

    let result = session.login("alice", "correct-pw").await;
    assert!(matches!(result, Err(AuthError::AuthUnavailable(_))));
    assert!(store.get().unwrap().is_none());
}

// ---------------------------------------------------------------------------
// register
// ---------------------------------------------------------------------------

/// Registration success does not establish a session: no credential side
/// effect by design.
#[tokio::test]
async fn test_register_success_does_not_log_in() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/register/"))
        .and(body_json(json!({"username": "carol", "password": "pw123456"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"username": "carol"})))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let (_api, session) = api_and_session(&server.uri(), store.clone());

    session.register("carol", "pw123456").await.expect("register succeeds");
    assert!(store.get().unwrap().is_none());
    assert!(!session.current_session().is_authenticated);
}

/// A 400 from the registration endpoint surfaces the server reason.
#[tokio::test]
async fn test_register_rejected_carries_reason() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/register/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "username already exists"
        })))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let (_api, session) = api_and_session(&server.uri(), store);

    match session.register("alice", "pw123456").await {
        Err(AuthError::RegistrationRejected(reason)) => {
            assert_eq!(reason, "username already exists");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

// ---------------------------------------------------------------------------
// refresh
// ---------------------------------------------------------------------------

/// A successful refresh replaces the credential wholesale, keeping the
/// prior refresh token when the server does not rotate it.
#[tokio::test]
async fn test_refresh_replaces_access_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh/"))
        .and(body_json(json!({"refresh": "refresh-token"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": access_token(7),
        })))
        .mount(&server)
        .await;

    let store = authed_store(1);
    let (_api, session) = api_and_session(&server.uri(), store.clone());

    session.refresh().await.expect("refresh succeeds");

    let credential = store.get().unwrap().expect("credential present");
    assert_eq!(credential.access, access_token(7));
    assert_eq!(credential.refresh, "refresh-token");
}

/// A rejected refresh token clears the credential: the session falls back
/// to anonymous rather than keeping a dead pair around.
#[tokio::test]
async fn test_refresh_rejection_transitions_to_anonymous() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Token is invalid or expired"
        })))
        .mount(&server)
        .await;

    let store = authed_store(1);
    let (_api, session) = api_and_session(&server.uri(), store.clone());

    let result = session.refresh().await;
    assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    assert!(store.get().unwrap().is_none());
    assert!(!session.current_session().is_authenticated);
}

// ---------------------------------------------------------------------------
// logout
// ---------------------------------------------------------------------------

/// Logout clears the store unconditionally and is idempotent.
#[tokio::test]
async fn test_logout_is_unconditional_and_idempotent() {
    let server = MockServer::start().await;
    let store = authed_store(1);
    let (_api, session) = api_and_session(&server.uri(), store.clone());

    assert!(session.current_session().is_authenticated);
    session.logout();
    assert!(store.get().unwrap().is_none());
    assert!(!session.current_session().is_authenticated);

    // Second logout from the anonymous state is a no-op.
    session.logout();
    assert!(store.get().unwrap().is_none());
}
