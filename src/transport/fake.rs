//! In-process fake transport for unit and integration tests
//!
//! This module provides [`FakeTransport`] and [`FakeTransportHandle`], an
//! in-process pair that replaces a real network feed in tests. It also
//! doubles as the no-feed transport when the client runs without a remote
//! live stream: subscriptions succeed and simply deliver nothing.
//!
//! # Usage
//!
//! Call [`FakeTransport::new`] to obtain a `(FakeTransport,
//! FakeTransportHandle)` pair. Wire the [`FakeTransport`] into the code
//! under test. From the test side, use the [`FakeTransportHandle`] to push
//! events into any active subscription for a conversation:
//!
//! ```
//! use chitchat::transport::fake::FakeTransport;
//! use chitchat::transport::{LiveEvent, LiveTransport};
//! use chitchat::types::{Message, UserSummary};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let (transport, handle) = FakeTransport::new();
//!
//! let mut events = transport.subscribe(1, "token").await.unwrap();
//!
//! let message = Message {
//!     id: 10,
//!     conversation: 1,
//!     sender: UserSummary { id: 2, username: "bob".into() },
//!     content: "hello".into(),
//!     timestamp: "2024-05-01T12:00:00Z".parse().unwrap(),
//! };
//! handle.push(1, LiveEvent::Message(message.clone()));
//!
//! assert_eq!(events.recv().await, Some(LiveEvent::Message(message)));
//! # }
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::transport::{LiveEvent, LiveTransport, TransportError};
use crate::types::ConversationId;

type Subscribers = Arc<Mutex<HashMap<ConversationId, Vec<mpsc::UnboundedSender<LiveEvent>>>>>;

/// In-process live transport for use in tests and offline operation.
///
/// Implements the full [`LiveTransport`] trait using in-memory channels, so
/// tests can drive the conversation session without a network feed. Create
/// with [`FakeTransport::new`] to obtain both the transport and the
/// complementary [`FakeTransportHandle`].
#[derive(Debug, Default)]
pub struct FakeTransport {
    subscribers: Subscribers,
}

impl FakeTransport {
    /// Create a new `(FakeTransport, FakeTransportHandle)` pair.
    ///
    /// Wire the [`FakeTransport`] into the code under test. Use the
    /// returned [`FakeTransportHandle`] from your test to inject events.
    pub fn new() -> (Self, FakeTransportHandle) {
        let subscribers: Subscribers = Arc::new(Mutex::new(HashMap::new()));
        let transport = Self {
            subscribers: Arc::clone(&subscribers),
        };
        (transport, FakeTransportHandle { subscribers })
    }
}

#[async_trait]
impl LiveTransport for FakeTransport {
    async fn subscribe(
        &self,
        conversation_id: ConversationId,
        _access_token: &str,
    ) -> Result<mpsc::UnboundedReceiver<LiveEvent>, TransportError> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .map_err(|_| TransportError::ConnectionFailed("subscriber lock poisoned".into()))?
            .entry(conversation_id)
            .or_default()
            .push(tx);
        tracing::debug!("Fake live subscription opened for conversation {}", conversation_id);
        Ok(rx)
    }
}

/// Test-side handle for injecting events into a [`FakeTransport`].
#[derive(Debug, Clone)]
pub struct FakeTransportHandle {
    subscribers: Subscribers,
}

impl FakeTransportHandle {
    /// Delivers `event` to every active subscription for
    /// `conversation_id`. Events pushed before any subscription exists are
    /// dropped, matching the at-most-once semantics of a real feed.
    pub fn push(&self, conversation_id: ConversationId, event: LiveEvent) {
        let mut subscribers = match self.subscribers.lock() {
            Ok(guard) => guard,
            Err(_) => return,
        };
        if let Some(senders) = subscribers.get_mut(&conversation_id) {
            // Prune subscriptions whose receiver has been dropped.
            senders.retain(|tx| tx.send(event.clone()).is_ok());
        }
    }

    /// Number of live (undropped) subscriptions for `conversation_id`.
    pub fn subscriber_count(&self, conversation_id: ConversationId) -> usize {
        self.subscribers
            .lock()
            .map(|subscribers| {
                subscribers
                    .get(&conversation_id)
                    .map(|senders| senders.iter().filter(|tx| !tx.is_closed()).count())
                    .unwrap_or(0)
            })
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Message, UserSummary};

    fn message(id: i64, conversation: ConversationId) -> Message {
        Message {
            id,
            conversation,
            sender: UserSummary {
                id: 2,
                username: "bob".to_string(),
            },
            content: format!("message {}", id),
            timestamp: "2024-05-01T12:00:00Z".parse().unwrap(),
        }
    }

    #[tokio::test]
    async fn test_push_reaches_matching_subscription_only() {
        let (transport, handle) = FakeTransport::new();
        let mut sub1 = transport.subscribe(1, "token").await.unwrap();
        let mut sub2 = transport.subscribe(2, "token").await.unwrap();

        handle.push(1, LiveEvent::Message(message(10, 1)));

        assert!(matches!(sub1.recv().await, Some(LiveEvent::Message(m)) if m.id == 10));
        assert!(sub2.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_push_without_subscribers_is_dropped() {
        let (_transport, handle) = FakeTransport::new();
        // Must not panic or error.
        handle.push(1, LiveEvent::Message(message(10, 1)));
    }

    #[tokio::test]
    async fn test_dropped_receiver_is_pruned() {
        let (transport, handle) = FakeTransport::new();
        let events = transport.subscribe(1, "token").await.unwrap();
        assert_eq!(handle.subscriber_count(1), 1);

        drop(events);
        handle.push(1, LiveEvent::Message(message(10, 1)));
        assert_eq!(handle.subscriber_count(1), 0);
    }
}
