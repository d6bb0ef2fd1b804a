//! The active conversation: timeline merge core and session lifecycle

pub mod session;
pub mod timeline;

pub use session::{ConversationSession, SessionEvent};
pub use timeline::Timeline;
