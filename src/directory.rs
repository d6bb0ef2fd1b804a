//! Conversation directory: cached conversations and candidate users
//!
//! [`ConversationDirectory`] fetches and caches the list of conversations
//! the current user belongs to, plus the candidate users available for
//! starting new ones. Both lists are refreshed by one `load()` whose two
//! fetches are joined before a single atomic state replacement, so a
//! reader never observes one list refreshed and the other stale. Failed
//! loads leave the prior cache untouched: stale-but-available beats a
//! blanked UI.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::api::ApiClient;
use crate::auth::SessionManager;
use crate::error::{ApiError, DirectoryError};
use crate::types::{Conversation, ConversationId, UserId, UserSummary};

/// Cached directory snapshot.
#[derive(Debug, Default, Clone)]
struct DirectoryState {
    conversations: Vec<Conversation>,
    candidate_users: Vec<UserSummary>,
    selected: Option<ConversationId>,
}

/// The cached list of conversations and candidate users.
///
/// Requires an authenticated session for every network operation; when
/// anonymous, operations fail with [`DirectoryError::Unauthorized`] before
/// any request is issued.
#[derive(Debug, Clone)]
pub struct ConversationDirectory {
    api: ApiClient,
    session: SessionManager,
    state: Arc<RwLock<DirectoryState>>,
}

impl ConversationDirectory {
    /// Creates an empty directory over the shared API client and session
    /// manager.
    pub fn new(api: ApiClient, session: SessionManager) -> Self {
        Self {
            api,
            session,
            state: Arc::new(RwLock::new(DirectoryState::default())),
        }
    }

    /// Fetches candidate users and conversations concurrently and replaces
    /// the cache atomically from the caller's perspective.
    ///
    /// Both fetches must complete before either list is applied; if one
    /// fails, neither is applied and the prior cache survives.
    ///
    /// # Errors
    ///
    /// [`DirectoryError::Unauthorized`] without issuing requests when the
    /// session is anonymous, or when the server rejects the token;
    /// [`DirectoryError::DirectoryUnavailable`] on transport failures.
    pub async fn load(&self) -> Result<(), DirectoryError> {
        if !self.session.current_session().is_authenticated {
            return Err(DirectoryError::Unauthorized);
        }

        // Explicit join: partial completion must never become visible.
        let (candidate_users, conversations) =
            tokio::try_join!(self.api.list_users(), self.api.list_conversations())
                .map_err(map_api_error)?;

        let mut state = self.state.write().await;
        state.candidate_users = candidate_users;
        state.conversations = conversations;
        // Drop a selection that no longer resolves to a cached entry.
        if let Some(selected) = state.selected {
            if !state.conversations.iter().any(|c| c.id == selected) {
                state.selected = None;
            }
        }
        tracing::debug!(
            "Directory loaded: {} conversations, {} candidate users",
            state.conversations.len(),
            state.candidate_users.len()
        );
        Ok(())
    }

    /// Starts a conversation with `other_user_id` and appends it to the
    /// cached list without a full refetch.
    ///
    /// The participant set submitted is `{other_user_id, current_user_id}`.
    /// The created conversation is returned so the caller can select it.
    ///
    /// # Errors
    ///
    /// [`DirectoryError::Unauthorized`] when anonymous;
    /// [`DirectoryError::InvalidTarget`] (no network call) when
    /// `other_user_id` is absent from the cached candidate list;
    /// [`DirectoryError::ConversationRejected`] with the server's reason
    /// verbatim on a conflict (duplicate pair, self-conversation);
    /// [`DirectoryError::DirectoryUnavailable`] on transport failures.
    pub async fn start_conversation(
        &self,
        other_user_id: UserId,
    ) -> Result<Conversation, DirectoryError> {
        let session = self.session.current_session();
        let current_user_id = match (session.is_authenticated, session.user_id) {
            (true, Some(user_id)) => user_id,
            _ => return Err(DirectoryError::Unauthorized),
        };

        // Stale or absent target ids are knowable client-side; skip the
        // round-trip.
        let target_known = self
            .state
            .read()
            .await
            .candidate_users
            .iter()
            .any(|u| u.id == other_user_id);
        if !target_known {
            return Err(DirectoryError::InvalidTarget);
        }

        let conversation = self
            .api
            .create_conversation(vec![other_user_id, current_user_id])
            .await
            .map_err(|e| match e {
                ApiError::Rejected(reason) => DirectoryError::ConversationRejected(reason),
                other => map_api_error(other),
            })?;

        let mut state = self.state.write().await;
        state.conversations.push(conversation.clone());
        tracing::info!(
            "Started conversation {} with user {}",
            conversation.id,
            other_user_id
        );
        Ok(conversation)
    }

    /// Marks `conversation_id` as the selected conversation.
    ///
    /// The id must correspond to a cached entry (a directory listing or a
    /// conversation just returned by
    /// [`start_conversation`](Self::start_conversation), which is appended
    /// simultaneously); unknown ids are ignored.
    pub async fn select(&self, conversation_id: ConversationId) {
        let mut state = self.state.write().await;
        if state.conversations.iter().any(|c| c.id == conversation_id) {
            state.selected = Some(conversation_id);
        } else {
            tracing::warn!(
                "Ignoring selection of unknown conversation {}",
                conversation_id
            );
        }
    }

    /// The currently selected conversation id, if any.
    pub async fn selected(&self) -> Option<ConversationId> {
        self.state.read().await.selected
    }

    /// Snapshot of the cached conversations.
    pub async fn conversations(&self) -> Vec<Conversation> {
        self.state.read().await.conversations.clone()
    }

    /// Snapshot of the cached candidate users.
    pub async fn candidate_users(&self) -> Vec<UserSummary> {
        self.state.read().await.candidate_users.clone()
    }
}

fn map_api_error(e: ApiError) -> DirectoryError {
    match e {
        ApiError::Unauthorized => DirectoryError::Unauthorized,
        other => DirectoryError::DirectoryUnavailable(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{MemoryTokenStore, SessionManager};
    use std::time::Duration;

    fn anonymous_directory() -> ConversationDirectory {
        let store = Arc::new(MemoryTokenStore::new());
        let api = ApiClient::new(
            url::Url::parse("http://localhost:8000/api/").unwrap(),
            Duration::from_secs(1),
            store.clone(),
        )
        .unwrap();
        let session = SessionManager::new(api.clone(), store);
        ConversationDirectory::new(api, session)
    }

    #[tokio::test]
    async fn test_load_while_anonymous_fails_without_requests() {
        // No server is listening; an issued request would surface as
        // DirectoryUnavailable, so Unauthorized proves the gate fired
        // first.
        let directory = anonymous_directory();
        assert!(matches!(
            directory.load().await,
            Err(DirectoryError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_start_conversation_while_anonymous_is_unauthorized() {
        let directory = anonymous_directory();
        assert!(matches!(
            directory.start_conversation(2).await,
            Err(DirectoryError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_select_unknown_conversation_is_ignored() {
        let directory = anonymous_directory();
        directory.select(99).await;
        assert!(directory.selected().await.is_none());
    }
}
