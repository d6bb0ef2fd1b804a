//! Live-update transport abstraction
//!
//! This module defines the [`LiveTransport`] trait that delivery mechanisms
//! for incremental conversation updates must satisfy. The core engine only
//! depends on this contract; whether delivery is WebSocket-, SSE-, or
//! poll-based is an implementation concern behind the trait. The crate
//! ships one concrete implementation:
//!
//! - [`fake::FakeTransport`] -- in-process channel pair used by tests and
//!   as the no-feed transport when no remote stream is wired.
//!
//! # Design
//!
//! [`LiveTransport`] is intentionally minimal: callers `subscribe` to one
//! conversation and receive a stream of [`LiveEvent`]s until the returned
//! receiver is dropped. Message events are merged into the timeline by the
//! conversation session; presence and typing events are ephemeral metadata
//! with at-most-once, best-effort delivery that never enter the timeline.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::types::{ConversationId, Message, UserSummary};

/// An incrementally delivered event for one conversation.
#[derive(Debug, Clone, PartialEq)]
pub enum LiveEvent {
    /// A new message. Merged into the timeline keyed by message id;
    /// re-delivery of an already-present id is a no-op.
    Message(Message),

    /// A participant is typing. Ephemeral; never enters the timeline.
    Typing { user: UserSummary },

    /// The set of participants currently online. Ephemeral; never enters
    /// the timeline.
    Presence { online: Vec<UserSummary> },
}

/// Errors raised while establishing a live subscription.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The transport rejected the supplied access token.
    #[error("live subscription rejected: unauthorized")]
    Unauthorized,

    /// The transport could not be reached or dropped the connection during
    /// setup.
    #[error("live subscription failed: {0}")]
    ConnectionFailed(String),
}

/// Abstraction over live-update delivery mechanisms.
///
/// Implementations authenticate with the caller's access token and scope
/// the subscription to a single conversation. The subscription ends when
/// the returned receiver is dropped; tearing down any underlying
/// connection is the implementation's responsibility.
#[async_trait]
pub trait LiveTransport: Send + Sync + std::fmt::Debug {
    /// Opens a subscription for `conversation_id`.
    ///
    /// # Arguments
    ///
    /// * `conversation_id` - The conversation to receive events for.
    /// * `access_token` - The current access token, used by remote
    ///   implementations to authenticate the subscription.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Unauthorized`] if the token is rejected,
    /// or [`TransportError::ConnectionFailed`] if the subscription cannot
    /// be established.
    async fn subscribe(
        &self,
        conversation_id: ConversationId,
        access_token: &str,
    ) -> Result<mpsc::UnboundedReceiver<LiveEvent>, TransportError>;
}

pub mod fake;
