//! ChitChat - terminal direct-messaging client library
//!
//! This library provides the session + conversation synchronization engine
//! for the ChitChat messaging service, plus the thin terminal front-end
//! built on top of it.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `auth`: credential storage, claim decoding, and the session lifecycle
//! - `api`: typed HTTP client for the ChitChat REST contract
//! - `directory`: cached conversation list and candidate users
//! - `conversation`: the active conversation's timeline and live merge
//! - `transport`: live-update delivery contract and in-process fake
//! - `config`: configuration management and validation
//! - `error`: per-component error taxonomies and result alias
//! - `cli`, `commands`, `chat_mode`: terminal front-end
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use chitchat::api::ApiClient;
//! use chitchat::auth::{KeyringTokenStore, SessionManager};
//! use chitchat::Config;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::load("config/config.yaml", None)?;
//! config.validate()?;
//!
//! let store = Arc::new(KeyringTokenStore::new());
//! let api = ApiClient::new(
//!     config.base_url()?,
//!     Duration::from_secs(config.server.timeout_secs),
//!     store.clone(),
//! )?;
//! let session = SessionManager::new(api, store);
//! session.login("alice", "secret").await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod chat_mode;
pub mod cli;
pub mod commands;
pub mod config;
pub mod conversation;
pub mod directory;
pub mod error;
pub mod transport;
pub mod types;

// Re-export commonly used types
pub use auth::{Session, SessionManager};
pub use config::Config;
pub use conversation::{ConversationSession, SessionEvent, Timeline};
pub use directory::ConversationDirectory;
pub use error::{AuthError, DirectoryError, Result, SessionError};
