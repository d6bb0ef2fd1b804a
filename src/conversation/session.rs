//! Active-conversation session: snapshot + live-update reconciliation
//!
//! [`ConversationSession`] maintains the gap-free, deduplicated,
//! time-ordered timeline for one conversation at a time, fed from two
//! racing sources: the bulk history fetch and the live update stream.
//!
//! # Ordering discipline
//!
//! `open` establishes the live subscription *before* issuing the bulk
//! fetch, so messages pushed while the fetch is in flight are not lost;
//! the [`Timeline`] dedupes by id so they are not duplicated once the
//! fetch lands either. Final ordering is always recomputed from
//! `(timestamp, id)`, never taken from arrival order.
//!
//! # Cancellation
//!
//! Every `open` bumps a generation counter under the state lock. Both the
//! live forwarding task and the bulk fetch compare their captured
//! generation against the current one at apply time; a stale fetch for a
//! previously viewed conversation resolves into a discard instead of
//! overwriting the newer selection.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;

use crate::api::ApiClient;
use crate::error::{ApiError, SessionError};
use crate::transport::{LiveEvent, LiveTransport, TransportError};
use crate::types::{ConversationId, Message, UserSummary};

/// An update surfaced to the UI while a conversation is open.
///
/// `Message` events have already been merged into the timeline (only
/// newly inserted messages are surfaced). `Typing` and `Presence` are
/// ephemeral, best-effort metadata that never touch the timeline.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Message(Message),
    Typing(UserSummary),
    Presence(Vec<UserSummary>),
}

/// Mutable state guarded by one lock: the generation counter, the active
/// conversation, its timeline, and the live forwarding task.
#[derive(Debug, Default)]
struct SessionState {
    generation: u64,
    conversation_id: Option<ConversationId>,
    timeline: super::Timeline,
    live_task: Option<JoinHandle<()>>,
}

impl SessionState {
    /// Bumps the generation, discarding the previous conversation's
    /// timeline and aborting its forwarding task. Returns the new
    /// generation.
    fn reset(&mut self, conversation_id: Option<ConversationId>) -> u64 {
        self.generation += 1;
        self.conversation_id = conversation_id;
        self.timeline.clear();
        if let Some(task) = self.live_task.take() {
            task.abort();
        }
        self.generation
    }
}

/// The session for the one active conversation.
///
/// Cheap to clone; clones share the same state, which is what allows a
/// second `open` to supersede a first whose fetch is still in flight. Not
/// multi-conversation-concurrent by design: each `open` discards the
/// previous timeline, matching the single-selection model of the
/// directory.
#[derive(Debug, Clone)]
pub struct ConversationSession {
    api: ApiClient,
    transport: Arc<dyn LiveTransport>,
    state: Arc<RwLock<SessionState>>,
    updates_tx: mpsc::UnboundedSender<SessionEvent>,
    updates_rx: Arc<Mutex<mpsc::UnboundedReceiver<SessionEvent>>>,
}

impl ConversationSession {
    /// Creates a session with no active conversation.
    pub fn new(api: ApiClient, transport: Arc<dyn LiveTransport>) -> Self {
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        Self {
            api,
            transport,
            state: Arc::new(RwLock::new(SessionState::default())),
            updates_tx,
            updates_rx: Arc::new(Mutex::new(updates_rx)),
        }
    }

    /// Opens `conversation_id`: discards any prior timeline, establishes
    /// the live subscription, then fetches and merges the full history.
    ///
    /// If another `open` (or [`close`](Self::close)) supersedes this one
    /// while the history fetch is in flight, the fetch result is discarded
    /// at resolution time and `Ok(())` is returned -- the newer selection
    /// owns the state.
    ///
    /// # Errors
    ///
    /// [`SessionError::Unauthorized`] when anonymous or the server rejects
    /// the token, [`SessionError::NotFound`] for an unknown conversation,
    /// [`SessionError::SessionUnavailable`] for transport failures.
    pub async fn open(&self, conversation_id: ConversationId) -> Result<(), SessionError> {
        let access_token = self
            .api
            .access_token()
            .map_err(|e| SessionError::SessionUnavailable(e.to_string()))?
            .ok_or(SessionError::Unauthorized)?;

        let generation = self.state.write().await.reset(Some(conversation_id));
        tracing::debug!(
            "Opening conversation {} (generation {})",
            conversation_id,
            generation
        );

        // Subscribe before fetching so nothing pushed during the fetch is
        // lost.
        let events = self
            .transport
            .subscribe(conversation_id, &access_token)
            .await
            .map_err(|e| match e {
                TransportError::Unauthorized => SessionError::Unauthorized,
                TransportError::ConnectionFailed(reason) => {
                    SessionError::SessionUnavailable(reason)
                }
            })?;

        let task = tokio::spawn(Self::forward_live_events(
            Arc::clone(&self.state),
            self.updates_tx.clone(),
            events,
            conversation_id,
            generation,
        ));

        {
            let mut state = self.state.write().await;
            if state.generation == generation {
                state.live_task = Some(task);
            } else {
                // Superseded between reset and subscribe; stand down.
                task.abort();
                return Ok(());
            }
        }

        let history = self
            .api
            .fetch_messages(conversation_id)
            .await
            .map_err(map_api_error)?;

        let mut state = self.state.write().await;
        if state.generation == generation {
            let inserted = state.timeline.merge(history);
            tracing::debug!(
                "Merged {} history messages for conversation {}",
                inserted,
                conversation_id
            );
        } else {
            tracing::debug!(
                "Discarding stale history fetch for conversation {}",
                conversation_id
            );
        }
        Ok(())
    }

    /// Forwards live events into the timeline until superseded.
    async fn forward_live_events(
        state: Arc<RwLock<SessionState>>,
        updates_tx: mpsc::UnboundedSender<SessionEvent>,
        mut events: mpsc::UnboundedReceiver<LiveEvent>,
        conversation_id: ConversationId,
        generation: u64,
    ) {
        while let Some(event) = events.recv().await {
            let update = match event {
                LiveEvent::Message(message) => {
                    if message.conversation != conversation_id {
                        tracing::debug!(
                            "Ignoring live message for conversation {} on subscription {}",
                            message.conversation,
                            conversation_id
                        );
                        continue;
                    }
                    let mut state = state.write().await;
                    if state.generation != generation {
                        break;
                    }
                    if !state.timeline.insert(message.clone()) {
                        // Re-delivery of a message already merged from the
                        // snapshot (or a send echo): no-op.
                        continue;
                    }
                    SessionEvent::Message(message)
                }
                LiveEvent::Typing { user } => {
                    if state.read().await.generation != generation {
                        break;
                    }
                    SessionEvent::Typing(user)
                }
                LiveEvent::Presence { online } => {
                    if state.read().await.generation != generation {
                        break;
                    }
                    SessionEvent::Presence(online)
                }
            };
            if updates_tx.send(update).is_err() {
                break;
            }
        }
    }

    /// Sends a message to the active conversation.
    ///
    /// The body is rejected locally with [`SessionError::EmptyMessage`]
    /// when empty or whitespace-only, without a request or timeline
    /// mutation. On success the authoritative server record (with its
    /// assigned id and timestamp) is merged into the timeline; a later
    /// live echo of the same id dedupes to a no-op.
    pub async fn send(&self, body: &str) -> Result<Message, SessionError> {
        let body = body.trim();
        if body.is_empty() {
            return Err(SessionError::EmptyMessage);
        }

        let conversation_id = self
            .state
            .read()
            .await
            .conversation_id
            .ok_or(SessionError::NotFound)?;

        let message = self
            .api
            .send_message(conversation_id, body)
            .await
            .map_err(map_api_error)?;

        let mut state = self.state.write().await;
        if state.conversation_id == Some(conversation_id) {
            state.timeline.insert(message.clone());
        }
        Ok(message)
    }

    /// Tears down the live subscription and releases the timeline.
    pub async fn close(&self) {
        let mut state = self.state.write().await;
        if let Some(id) = state.conversation_id {
            tracing::debug!("Closing conversation {}", id);
        }
        state.reset(None);
    }

    /// The active conversation id, if any.
    pub async fn conversation_id(&self) -> Option<ConversationId> {
        self.state.read().await.conversation_id
    }

    /// A snapshot of the current timeline, in order.
    pub async fn messages(&self) -> Vec<Message> {
        self.state.read().await.timeline.messages().to_vec()
    }

    /// Waits for the next live update (merged message, typing, presence).
    ///
    /// Returns `None` once every clone of the session has been dropped.
    pub async fn next_update(&self) -> Option<SessionEvent> {
        self.updates_rx.lock().await.recv().await
    }
}

fn map_api_error(e: ApiError) -> SessionError {
    match e {
        ApiError::Unauthorized => SessionError::Unauthorized,
        ApiError::NotFound => SessionError::NotFound,
        ApiError::Rejected(reason) => SessionError::SessionUnavailable(reason),
        ApiError::Unavailable(reason) => SessionError::SessionUnavailable(reason),
    }
}
