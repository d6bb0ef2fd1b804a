//! Ordered, deduplicated message timeline
//!
//! The timeline is fed from two racing sources -- the bulk history fetch
//! and the live update stream -- so its merge must be commutative and
//! idempotent with respect to arrival order. Every insert is keyed by
//! message id (re-delivery is a no-op) and placed by the total order
//! `(timestamp, id)`; arrival order is never trusted.

use std::collections::HashSet;

use crate::types::{Message, MessageId};

/// The ordered, deduplicated sequence of messages for one conversation.
///
/// Invariants, maintained after every mutation:
///
/// - no two entries share an id;
/// - entries are sorted ascending by `(timestamp, id)`.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    messages: Vec<Message>,
    seen: HashSet<MessageId>,
}

impl Timeline {
    /// Creates an empty timeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a message at the position dictated by its ordering key.
    ///
    /// Returns `true` if the message was new, `false` if its id was
    /// already present (the duplicate is discarded, making re-delivery
    /// from either source a no-op).
    ///
    /// # Examples
    ///
    /// ```
    /// use chitchat::conversation::Timeline;
    /// use chitchat::types::{Message, UserSummary};
    ///
    /// let mut timeline = Timeline::new();
    /// let message = Message {
    ///     id: 1,
    ///     conversation: 1,
    ///     sender: UserSummary { id: 2, username: "bob".into() },
    ///     content: "hi".into(),
    ///     timestamp: "2024-05-01T12:00:00Z".parse().unwrap(),
    /// };
    /// assert!(timeline.insert(message.clone()));
    /// assert!(!timeline.insert(message));
    /// assert_eq!(timeline.len(), 1);
    /// ```
    pub fn insert(&mut self, message: Message) -> bool {
        if !self.seen.insert(message.id) {
            return false;
        }
        let key = message.ordering_key();
        let position = self
            .messages
            .partition_point(|existing| existing.ordering_key() < key);
        self.messages.insert(position, message);
        true
    }

    /// Inserts every message from `batch`, deduplicating by id.
    ///
    /// Returns the number of newly inserted messages.
    pub fn merge(&mut self, batch: impl IntoIterator<Item = Message>) -> usize {
        batch
            .into_iter()
            .filter(|message| self.insert(message.clone()))
            .count()
    }

    /// The messages in timeline order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages in the timeline.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the timeline is empty.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Discards all messages, e.g. when switching conversations.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.seen.clear();
    }
}
