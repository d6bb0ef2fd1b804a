//! Shared helpers for integration tests
//!
//! Builds engine components against a wiremock server and fabricates the
//! JSON bodies and structurally valid (unsigned) access tokens the tests
//! feed through them.

use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde_json::{json, Value};

use chitchat::api::ApiClient;
use chitchat::auth::{Credential, MemoryTokenStore, SessionManager};

/// Builds an unsigned access token whose payload carries `user_id`, the
/// same claim shape the real server issues.
#[allow(dead_code)]
pub fn access_token(user_id: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload =
        URL_SAFE_NO_PAD.encode(format!(r#"{{"user_id":{},"exp":1800000000}}"#, user_id));
    format!("{}.{}.signature", header, payload)
}

/// A token store pre-seeded with a structurally valid credential for
/// `user_id`.
#[allow(dead_code)]
pub fn authed_store(user_id: i64) -> Arc<MemoryTokenStore> {
    Arc::new(MemoryTokenStore::with_credential(Credential {
        access: access_token(user_id),
        refresh: "refresh-token".to_string(),
    }))
}

/// An `ApiClient` pointed at the wiremock server's `/api/` prefix.
#[allow(dead_code)]
pub fn api_client(server_uri: &str, store: Arc<MemoryTokenStore>) -> ApiClient {
    ApiClient::new(
        url::Url::parse(&format!("{}/api/", server_uri)).expect("valid url"),
        Duration::from_secs(5),
        store,
    )
    .expect("client builds")
}

/// An `ApiClient` + `SessionManager` pair sharing one store.
#[allow(dead_code)]
pub fn api_and_session(
    server_uri: &str,
    store: Arc<MemoryTokenStore>,
) -> (ApiClient, SessionManager) {
    let api = api_client(server_uri, store.clone());
    let session = SessionManager::new(api.clone(), store);
    (api, session)
}

#[allow(dead_code)]
pub fn user_json(id: i64, username: &str) -> Value {
    json!({"id": id, "username": username})
}

#[allow(dead_code)]
pub fn conversation_json(id: i64, participants: &[(i64, &str)]) -> Value {
    json!({
        "id": id,
        "participants": participants
            .iter()
            .map(|(id, name)| user_json(*id, name))
            .collect::<Vec<_>>(),
        "created_at": "2024-05-01T10:00:00Z",
    })
}

#[allow(dead_code)]
pub fn message_json(
    id: i64,
    conversation: i64,
    sender: (i64, &str),
    content: &str,
    timestamp: &str,
) -> Value {
    json!({
        "id": id,
        "conversation": conversation,
        "sender": user_json(sender.0, sender.1),
        "content": content,
        "timestamp": timestamp,
    })
}
