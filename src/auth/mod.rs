//! Authentication: credential storage, claim decoding, session lifecycle
//!
//! Submodules:
//!
//! - [`token_store`] -- the [`TokenStore`] contract plus keyring-backed and
//!   in-memory implementations.
//! - [`claims`] -- structural (non-verifying) decode of access-token claims.
//! - [`session`] -- [`SessionManager`], the owner of the Anonymous /
//!   Authenticated transitions and the derived [`Session`].

pub mod claims;
pub mod session;
pub mod token_store;

pub use claims::{decode_claims, AccessClaims};
pub use session::{Session, SessionManager};
pub use token_store::{Credential, KeyringTokenStore, MemoryTokenStore, TokenStore};
