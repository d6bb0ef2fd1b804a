//! Error types for the ChitChat client
//!
//! This module defines the per-component error taxonomies used throughout
//! the synchronization engine, using `thiserror` for ergonomic error
//! handling. Transport and server failures are converted into these types
//! at component boundaries; raw `reqwest` errors never cross a public API.

use thiserror::Error;

/// Errors produced by [`SessionManager`](crate::auth::SessionManager)
/// operations.
///
/// Each variant maps to a distinct user-visible message so that "wrong
/// credentials" is never conflated with "service unavailable".
#[derive(Error, Debug)]
pub enum AuthError {
    /// The server rejected the supplied username/password (HTTP 401).
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// The registration endpoint rejected the request (HTTP 400), typically
    /// because the username is taken or the password is too weak. Carries
    /// the server-supplied reason.
    #[error("Registration rejected: {0}")]
    RegistrationRejected(String),

    /// The authentication service could not be reached or answered with an
    /// unexpected failure (network error, 5xx, malformed response).
    #[error("Authentication service unavailable: {0}")]
    AuthUnavailable(String),
}

/// Errors produced by [`ConversationDirectory`](crate::ConversationDirectory)
/// operations.
#[derive(Error, Debug)]
pub enum DirectoryError {
    /// No authenticated session; no request was issued.
    #[error("Not authenticated")]
    Unauthorized,

    /// The target user id is not present in the cached candidate list; no
    /// request was issued.
    #[error("Unknown user: not in the candidate list")]
    InvalidTarget,

    /// The server refused to create the conversation (duplicate pair,
    /// self-conversation, ...). Carries the server reason verbatim for
    /// display.
    #[error("{0}")]
    ConversationRejected(String),

    /// The directory endpoints could not be reached or answered with an
    /// unexpected failure. Cached state is left untouched.
    #[error("Directory unavailable: {0}")]
    DirectoryUnavailable(String),
}

/// Errors produced by [`ConversationSession`](crate::ConversationSession)
/// operations.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The message body was empty or whitespace-only; no request was issued
    /// and the timeline was not touched.
    #[error("Message body is empty")]
    EmptyMessage,

    /// The server answered 401. Propagated upward as a session-invalidation
    /// signal so the caller can force a transition to Anonymous.
    #[error("Session expired or not authenticated")]
    Unauthorized,

    /// The conversation does not exist on the server (HTTP 404).
    #[error("Conversation not found")]
    NotFound,

    /// The message endpoints or live subscription could not be reached or
    /// answered with an unexpected failure.
    #[error("Conversation service unavailable: {0}")]
    SessionUnavailable(String),
}

/// Low-level HTTP failure classification shared by all components.
///
/// [`ApiClient`](crate::api::ApiClient) maps every response status into one
/// of these variants; each component then translates them into its own
/// taxonomy ([`AuthError`], [`DirectoryError`], [`SessionError`]).
#[derive(Error, Debug)]
pub enum ApiError {
    /// HTTP 401. The sole trigger for a refresh attempt or logout.
    #[error("unauthorized")]
    Unauthorized,

    /// HTTP 404.
    #[error("not found")]
    NotFound,

    /// HTTP 400 with a server-supplied reason (the `error` or `detail`
    /// field of the body, falling back to the raw body).
    #[error("{0}")]
    Rejected(String),

    /// Network failure, timeout, 5xx, or a malformed response body.
    #[error("{0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Unavailable(e.to_string())
    }
}

/// Errors for configuration and credential-storage plumbing outside the
/// component taxonomies above.
#[derive(Error, Debug)]
pub enum ChitChatError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Credential storage errors
    #[error("Credential storage error: {0}")]
    Storage(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Keyring/credential storage errors
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

/// Result type alias for ChitChat operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation at the CLI
/// layer. Component APIs return their concrete taxonomies instead.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_credentials_display() {
        let error = AuthError::InvalidCredentials;
        assert_eq!(error.to_string(), "Invalid username or password");
    }

    #[test]
    fn test_registration_rejected_display() {
        let error = AuthError::RegistrationRejected("username already exists".to_string());
        assert_eq!(
            error.to_string(),
            "Registration rejected: username already exists"
        );
    }

    #[test]
    fn test_auth_unavailable_display() {
        let error = AuthError::AuthUnavailable("connection refused".to_string());
        assert_eq!(
            error.to_string(),
            "Authentication service unavailable: connection refused"
        );
    }

    #[test]
    fn test_directory_unauthorized_display() {
        let error = DirectoryError::Unauthorized;
        assert_eq!(error.to_string(), "Not authenticated");
    }

    #[test]
    fn test_conversation_rejected_carries_server_reason_verbatim() {
        let error =
            DirectoryError::ConversationRejected("Conversation already exists.".to_string());
        assert_eq!(error.to_string(), "Conversation already exists.");
    }

    #[test]
    fn test_empty_message_display() {
        let error = SessionError::EmptyMessage;
        assert_eq!(error.to_string(), "Message body is empty");
    }

    #[test]
    fn test_session_not_found_display() {
        let error = SessionError::NotFound;
        assert_eq!(error.to_string(), "Conversation not found");
    }

    #[test]
    fn test_api_error_rejected_display() {
        let error = ApiError::Rejected("you cannot chat with yourself".to_string());
        assert_eq!(error.to_string(), "you cannot chat with yourself");
    }

    #[test]
    fn test_config_error_display() {
        let error = ChitChatError::Config("invalid format".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid format");
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{bad json}").unwrap_err();
        let error: ChitChatError = json_error.into();
        assert!(matches!(error, ChitChatError::Serialization(_)));
    }

    #[test]
    fn test_errors_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AuthError>();
        assert_send_sync::<DirectoryError>();
        assert_send_sync::<SessionError>();
        assert_send_sync::<ApiError>();
        assert_send_sync::<ChitChatError>();
    }
}
