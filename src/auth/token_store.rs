//! Credential persistence via the OS keyring
//!
//! The credential pair is stored in two named slots (access, refresh) in the
//! operating system's native credential store (Keychain on macOS, Secret
//! Service on Linux, Windows Credential Manager on Windows), namespaced
//! under a `chitchat` service name.
//!
//! [`TokenStore`] is the narrow get/set/clear contract every other component
//! reads auth state through (via [`SessionManager`]); nothing else touches
//! the slots directly. [`MemoryTokenStore`] provides the same contract
//! backed by process memory for tests and ephemeral sessions.
//!
//! [`SessionManager`]: crate::auth::SessionManager

use crate::error::{ChitChatError, Result};

/// The access/refresh token pair representing an authenticated session.
///
/// Invariant: a credential is either absent entirely (anonymous) or both
/// tokens are present. The store enforces this by writing and reading the
/// two slots as a unit; a read that finds only one slot yields `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    /// Opaque signed access token, sent as `Authorization: Bearer <access>`.
    pub access: String,
    /// Opaque signed refresh token, exchanged for a new pair on expiry.
    pub refresh: String,
}

/// Narrow persistence contract for the credential pair.
///
/// `set` replaces the whole credential atomically from the caller's
/// perspective; `clear` is idempotent. Within one process the store is the
/// only cross-component mutable resource, and last writer wins.
pub trait TokenStore: Send + Sync + std::fmt::Debug {
    /// Returns the stored credential, or `None` when anonymous.
    fn get(&self) -> Result<Option<Credential>>;

    /// Replaces the stored credential wholesale.
    fn set(&self, credential: &Credential) -> Result<()>;

    /// Removes any stored credential. Safe to call when none exists.
    fn clear(&self) -> Result<()>;
}

// ---------------------------------------------------------------------------
// KeyringTokenStore
// ---------------------------------------------------------------------------

/// Slot name for the access token within the keyring service.
const ACCESS_SLOT: &str = "access";

/// Slot name for the refresh token within the keyring service.
const REFRESH_SLOT: &str = "refresh";

/// [`TokenStore`] backed by the OS native keyring.
///
/// Stateless accessor; the keyring itself holds the data, so credentials
/// survive process restarts.
///
/// # Examples
///
/// ```no_run
/// use chitchat::auth::{Credential, KeyringTokenStore, TokenStore};
///
/// # fn example() -> chitchat::error::Result<()> {
/// let store = KeyringTokenStore::new();
/// store.set(&Credential {
///     access: "aaa".to_string(),
///     refresh: "rrr".to_string(),
/// })?;
/// assert!(store.get()?.is_some());
/// store.clear()?;
/// assert!(store.get()?.is_none());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct KeyringTokenStore {
    service: String,
}

impl KeyringTokenStore {
    /// Creates a store using the default `chitchat` service namespace.
    pub fn new() -> Self {
        Self::with_service("chitchat")
    }

    /// Creates a store under a custom service namespace.
    ///
    /// Used by tests to avoid clobbering real credentials.
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, slot: &str) -> Result<keyring::Entry> {
        Ok(keyring::Entry::new(&self.service, slot).map_err(ChitChatError::Keyring)?)
    }

    fn read_slot(&self, slot: &str) -> Result<Option<String>> {
        match self.entry(slot)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(ChitChatError::Keyring(e).into()),
        }
    }

    fn delete_slot(&self, slot: &str) -> Result<()> {
        match self.entry(slot)?.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(ChitChatError::Keyring(e).into()),
        }
    }
}

impl TokenStore for KeyringTokenStore {
    fn get(&self) -> Result<Option<Credential>> {
        let access = self.read_slot(ACCESS_SLOT)?;
        let refresh = self.read_slot(REFRESH_SLOT)?;
        match (access, refresh) {
            (Some(access), Some(refresh)) => Ok(Some(Credential { access, refresh })),
            (None, None) => Ok(None),
            // A lone slot violates the both-or-neither invariant; treat the
            // credential as absent and drop the stragglers.
            _ => {
                tracing::warn!("Found partial credential in keyring; clearing");
                self.clear()?;
                Ok(None)
            }
        }
    }

    fn set(&self, credential: &Credential) -> Result<()> {
        self.entry(ACCESS_SLOT)?
            .set_password(&credential.access)
            .map_err(ChitChatError::Keyring)?;
        self.entry(REFRESH_SLOT)?
            .set_password(&credential.refresh)
            .map_err(ChitChatError::Keyring)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.delete_slot(ACCESS_SLOT)?;
        self.delete_slot(REFRESH_SLOT)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemoryTokenStore
// ---------------------------------------------------------------------------

/// In-memory [`TokenStore`] for tests and ephemeral sessions.
///
/// The whole credential is replaced under one lock acquisition, so no
/// reader ever observes an access token without its refresh token.
///
/// # Examples
///
/// ```
/// use chitchat::auth::{Credential, MemoryTokenStore, TokenStore};
///
/// let store = MemoryTokenStore::new();
/// assert!(store.get().unwrap().is_none());
/// store
///     .set(&Credential {
///         access: "aaa".to_string(),
///         refresh: "rrr".to_string(),
///     })
///     .unwrap();
/// assert_eq!(store.get().unwrap().unwrap().access, "aaa");
/// ```
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    credential: std::sync::Mutex<Option<Credential>>,
}

impl MemoryTokenStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with a credential.
    pub fn with_credential(credential: Credential) -> Self {
        Self {
            credential: std::sync::Mutex::new(Some(credential)),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<Credential>>> {
        self.credential
            .lock()
            .map_err(|_| ChitChatError::Storage("token store lock poisoned".to_string()).into())
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Result<Option<Credential>> {
        Ok(self.lock()?.clone())
    }

    fn set(&self, credential: &Credential) -> Result<()> {
        *self.lock()? = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.lock()? = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential(tag: &str) -> Credential {
        Credential {
            access: format!("access-{}", tag),
            refresh: format!("refresh-{}", tag),
        }
    }

    // -----------------------------------------------------------------------
    // MemoryTokenStore
    // -----------------------------------------------------------------------

    #[test]
    fn test_memory_store_starts_empty() {
        let store = MemoryTokenStore::new();
        assert!(store.get().expect("get").is_none());
    }

    #[test]
    fn test_memory_store_set_then_get_returns_both_tokens() {
        let store = MemoryTokenStore::new();
        store.set(&credential("a")).expect("set");
        let loaded = store.get().expect("get").expect("present");
        assert_eq!(loaded.access, "access-a");
        assert_eq!(loaded.refresh, "refresh-a");
    }

    #[test]
    fn test_memory_store_last_writer_wins() {
        let store = MemoryTokenStore::new();
        store.set(&credential("a")).expect("set a");
        store.set(&credential("b")).expect("set b");
        assert_eq!(store.get().unwrap().unwrap().access, "access-b");
    }

    #[test]
    fn test_memory_store_clear_is_idempotent() {
        let store = MemoryTokenStore::new();
        store.set(&credential("a")).expect("set");
        store.clear().expect("first clear");
        store.clear().expect("second clear is no-op");
        assert!(store.get().unwrap().is_none());
    }

    #[test]
    fn test_memory_store_with_credential_seed() {
        let store = MemoryTokenStore::with_credential(credential("seed"));
        assert_eq!(store.get().unwrap().unwrap().refresh, "refresh-seed");
    }

    // -----------------------------------------------------------------------
    // KeyringTokenStore  (requires system keyring; skipped in CI)
    // -----------------------------------------------------------------------

    #[test]
    #[ignore = "requires system keyring"]
    fn test_keyring_store_roundtrip() {
        let store = KeyringTokenStore::with_service("chitchat-test");
        store.set(&credential("kr")).expect("set");
        let loaded = store.get().expect("get").expect("present");
        assert_eq!(loaded, credential("kr"));
        store.clear().expect("clear");
        assert!(store.get().expect("get after clear").is_none());
    }

    #[test]
    #[ignore = "requires system keyring"]
    fn test_keyring_store_clear_is_idempotent() {
        let store = KeyringTokenStore::with_service("chitchat-test-idempotent");
        store.clear().expect("first clear");
        store.clear().expect("second clear is no-op");
    }
}
