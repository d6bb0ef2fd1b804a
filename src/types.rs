//! Wire entities shared across the ChitChat client
//!
//! These structs mirror the JSON bodies produced and consumed by the
//! ChitChat REST API. Identifiers are server-assigned integers; timestamps
//! are RFC-3339 strings deserialized via chrono's serde support.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable identifier for a user.
pub type UserId = i64;

/// Stable identifier for a conversation.
pub type ConversationId = i64;

/// Stable identifier for a message.
pub type MessageId = i64;

/// A user as returned by the listing endpoints: id plus display name.
///
/// Immutable once fetched within a view lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
}

/// A conversation between two or more users.
///
/// `participants` is exactly the set the server returned; the current user
/// is a member by construction (server-enforced). Identity is the
/// server-assigned `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub participants: Vec<UserSummary>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Conversation {
    /// Returns the participants other than `user_id`, for display.
    pub fn peers(&self, user_id: UserId) -> Vec<&UserSummary> {
        self.participants
            .iter()
            .filter(|p| p.id != user_id)
            .collect()
    }
}

/// A single message within a conversation.
///
/// Immutable once observed. The timeline ordering key is
/// `(timestamp, id)` ascending, with `id` as the tiebreak for equal
/// timestamps; arrival order is never trusted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub conversation: ConversationId,
    pub sender: UserSummary,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// The total ordering key for timeline placement.
    pub fn ordering_key(&self) -> (DateTime<Utc>, MessageId) {
        (self.timestamp, self.id)
    }
}

// ---------------------------------------------------------------------------
// Request/response payloads
// ---------------------------------------------------------------------------

/// Body for `POST auth/login/` and `POST auth/register/`.
#[derive(Debug, Serialize)]
pub struct CredentialsRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Successful response from `POST auth/login/`: the token pair.
#[derive(Debug, Deserialize)]
pub struct TokenPairResponse {
    pub access: String,
    pub refresh: String,
}

/// Body for `POST auth/refresh/`.
#[derive(Debug, Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

/// Response from `POST auth/refresh/`. The refresh token is only present
/// when the server rotates it.
#[derive(Debug, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Body for `POST conversations/`.
#[derive(Debug, Serialize)]
pub struct CreateConversationRequest {
    pub participants: Vec<UserId>,
}

/// Body for `POST conversations/{id}/messages/`.
#[derive(Debug, Serialize)]
pub struct SendMessageRequest<'a> {
    pub content: &'a str,
}

/// Error body shape used by the API for rejections (`{"error": "..."}`,
/// with `detail` as the framework fallback).
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}
