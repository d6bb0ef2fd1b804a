//! HTTP client for the ChitChat REST API
//!
//! [`ApiClient`] wraps a `reqwest::Client` with the service base URL, a
//! bounded per-request timeout, and bearer-token injection from the
//! [`TokenStore`]. Every endpoint gets a typed method; every non-success
//! status is mapped into [`ApiError`] so callers translate a small, closed
//! set of failures into their own taxonomy:
//!
//! - `401` -> [`ApiError::Unauthorized`] -- the sole trigger for a refresh
//!   attempt or a fallback to logout, never retried here.
//! - `404` -> [`ApiError::NotFound`]
//! - `400` -> [`ApiError::Rejected`] carrying the server reason verbatim
//! - anything else (network, timeout, 5xx, bad body) ->
//!   [`ApiError::Unavailable`]

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::auth::TokenStore;
use crate::error::{ApiError, ChitChatError, Result};
use crate::types::{
    ApiErrorBody, Conversation, ConversationId, CreateConversationRequest, CredentialsRequest,
    Message, RefreshRequest, RefreshResponse, SendMessageRequest, TokenPairResponse, UserId,
    UserSummary,
};

/// Typed client for the ChitChat REST API.
///
/// Cheap to clone via its internal `Arc`s; one instance is shared by the
/// session manager, the directory, and the conversation session.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
    store: Arc<dyn TokenStore>,
}

impl ApiClient {
    /// Creates a client targeting `base` with the given per-request timeout.
    ///
    /// No network I/O is performed at construction time.
    ///
    /// # Errors
    ///
    /// Returns [`ChitChatError::Config`] if the HTTP client cannot be
    /// built (TLS initialization failure).
    pub fn new(base: Url, timeout: Duration, store: Arc<dyn TokenStore>) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("chitchat/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ChitChatError::Config(format!("failed to create HTTP client: {}", e)))?;

        tracing::debug!("Initialized API client: base={}", base);

        Ok(Self { http, base, store })
    }

    fn endpoint(&self, path: &str) -> std::result::Result<Url, ApiError> {
        self.base
            .join(path)
            .map_err(|e| ApiError::Unavailable(format!("invalid endpoint path '{}': {}", path, e)))
    }

    /// Attaches `Authorization: Bearer <access>` from the token store.
    ///
    /// A missing credential is reported as [`ApiError::Unauthorized`]
    /// without issuing the request; the server would reject it anyway.
    fn authed(&self, builder: RequestBuilder) -> std::result::Result<RequestBuilder, ApiError> {
        let credential = self
            .store
            .get()
            .map_err(|e| ApiError::Unavailable(format!("token store read failed: {}", e)))?
            .ok_or(ApiError::Unauthorized)?;
        Ok(builder.bearer_auth(credential.access))
    }

    /// Maps a non-success response into [`ApiError`], consuming the body
    /// for the rejection reason where one is expected.
    async fn classify_failure(response: Response) -> ApiError {
        let status = response.status();
        match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
            StatusCode::NOT_FOUND => ApiError::NotFound,
            StatusCode::BAD_REQUEST => {
                let body = response.text().await.unwrap_or_default();
                let reason = serde_json::from_str::<ApiErrorBody>(&body)
                    .ok()
                    .and_then(|b| b.error.or(b.detail))
                    .unwrap_or(body);
                ApiError::Rejected(reason)
            }
            _ => {
                let body = response.text().await.unwrap_or_default();
                tracing::warn!("Server returned HTTP {}: {}", status, body);
                ApiError::Unavailable(format!("HTTP {}", status))
            }
        }
    }

    /// Sends the request and decodes a JSON body of type `T` on success.
    async fn send_json<T: DeserializeOwned>(
        builder: RequestBuilder,
    ) -> std::result::Result<T, ApiError> {
        let response = builder.send().await?;
        if !response.status().is_success() {
            return Err(Self::classify_failure(response).await);
        }
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Unavailable(format!("malformed response body: {}", e)))
    }

    // -----------------------------------------------------------------------
    // Authentication endpoints (no bearer token)
    // -----------------------------------------------------------------------

    /// `POST auth/login/` -- exchanges credentials for a token pair.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> std::result::Result<TokenPairResponse, ApiError> {
        let url = self.endpoint("auth/login/")?;
        tracing::debug!("POST {}", url);
        Self::send_json(
            self.http
                .post(url)
                .json(&CredentialsRequest { username, password }),
        )
        .await
    }

    /// `POST auth/register/` -- creates an account. Does not return tokens.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
    ) -> std::result::Result<(), ApiError> {
        let url = self.endpoint("auth/register/")?;
        tracing::debug!("POST {}", url);
        let response = self
            .http
            .post(url)
            .json(&CredentialsRequest { username, password })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::classify_failure(response).await);
        }
        Ok(())
    }

    /// `POST auth/refresh/` -- exchanges a refresh token for a new access
    /// token (and possibly a rotated refresh token).
    pub async fn refresh(
        &self,
        refresh_token: &str,
    ) -> std::result::Result<RefreshResponse, ApiError> {
        let url = self.endpoint("auth/refresh/")?;
        tracing::debug!("POST {}", url);
        Self::send_json(self.http.post(url).json(&RefreshRequest {
            refresh: refresh_token,
        }))
        .await
    }

    // -----------------------------------------------------------------------
    // Authenticated endpoints
    // -----------------------------------------------------------------------

    /// `GET users/` -- candidate users to start conversations with.
    pub async fn list_users(&self) -> std::result::Result<Vec<UserSummary>, ApiError> {
        let url = self.endpoint("users/")?;
        tracing::debug!("GET {}", url);
        Self::send_json(self.authed(self.http.get(url))?).await
    }

    /// `GET conversations/` -- conversations the current user belongs to.
    pub async fn list_conversations(&self) -> std::result::Result<Vec<Conversation>, ApiError> {
        let url = self.endpoint("conversations/")?;
        tracing::debug!("GET {}", url);
        Self::send_json(self.authed(self.http.get(url))?).await
    }

    /// `POST conversations/` -- creates a conversation with the given
    /// participant set.
    pub async fn create_conversation(
        &self,
        participants: Vec<UserId>,
    ) -> std::result::Result<Conversation, ApiError> {
        let url = self.endpoint("conversations/")?;
        tracing::debug!("POST {}", url);
        Self::send_json(
            self.authed(self.http.post(url))?
                .json(&CreateConversationRequest { participants }),
        )
        .await
    }

    /// `GET conversations/{id}/messages/` -- full message history snapshot.
    pub async fn fetch_messages(
        &self,
        conversation_id: ConversationId,
    ) -> std::result::Result<Vec<Message>, ApiError> {
        let url = self.endpoint(&format!("conversations/{}/messages/", conversation_id))?;
        tracing::debug!("GET {}", url);
        Self::send_json(self.authed(self.http.get(url))?).await
    }

    /// `POST conversations/{id}/messages/` -- sends a message and returns
    /// the authoritative record with server-assigned id and timestamp.
    pub async fn send_message(
        &self,
        conversation_id: ConversationId,
        content: &str,
    ) -> std::result::Result<Message, ApiError> {
        let url = self.endpoint(&format!("conversations/{}/messages/", conversation_id))?;
        tracing::debug!("POST {}", url);
        Self::send_json(
            self.authed(self.http.post(url))?
                .json(&SendMessageRequest { content }),
        )
        .await
    }

    /// The current access token, if any. Used to authenticate the live
    /// update subscription.
    pub fn access_token(&self) -> std::result::Result<Option<String>, ApiError> {
        Ok(self
            .store
            .get()
            .map_err(|e| ApiError::Unavailable(format!("token store read failed: {}", e)))?
            .map(|c| c.access))
    }
}
