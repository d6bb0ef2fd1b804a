//! Session lifecycle: login, register, refresh, logout
//!
//! [`SessionManager`] is the sole owner of the credential lifecycle. It
//! exposes the derived [`Session`] (recomputed from the token store on
//! every read) and the state transitions between Anonymous and
//! Authenticated. Components needing auth state read through this type,
//! never the store directly.
//!
//! Failure policy per operation:
//!
//! - `login` -- 401 is `InvalidCredentials`; anything else is
//!   `AuthUnavailable`. The store is untouched on failure.
//! - `register` -- 400 is `RegistrationRejected` with the server reason.
//!   Success deliberately does NOT establish a session; the caller logs in
//!   separately.
//! - `refresh` -- a rejected refresh token clears the store (transition to
//!   Anonymous) before failing.
//! - `logout` -- clears the store unconditionally; idempotent.

use std::sync::Arc;

use crate::api::ApiClient;
use crate::auth::claims::decode_claims;
use crate::auth::token_store::{Credential, TokenStore};
use crate::error::{ApiError, AuthError};
use crate::types::UserId;

/// Derived authentication state.
///
/// Never stored: recomputed from the credential on every read.
/// `is_authenticated` reflects structural token validity only; real
/// validity is whatever the server asserts on the next request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    /// Whether a structurally valid credential is present.
    pub is_authenticated: bool,
    /// The current user's id, decoded from the access token claims.
    pub user_id: Option<UserId>,
}

impl Session {
    /// The anonymous session.
    pub fn anonymous() -> Self {
        Self {
            is_authenticated: false,
            user_id: None,
        }
    }
}

/// Owns the login/register/logout state transitions and the derived
/// [`Session`].
///
/// States are Anonymous and Authenticated. Anonymous -> Authenticated on a
/// successful `login`; Authenticated -> Anonymous on `logout` or when a
/// collaborator propagates an authentication rejection (a 401 observed on
/// any authenticated call) and the caller invokes `logout` or a failing
/// `refresh`.
#[derive(Debug, Clone)]
pub struct SessionManager {
    api: ApiClient,
    store: Arc<dyn TokenStore>,
}

impl SessionManager {
    /// Creates a manager over the shared API client and token store.
    ///
    /// The store must be the same instance the `ApiClient` injects bearer
    /// tokens from, so that a stored credential and an authenticated
    /// request can never disagree.
    pub fn new(api: ApiClient, store: Arc<dyn TokenStore>) -> Self {
        Self { api, store }
    }

    /// Returns the current session, derived from the stored credential.
    ///
    /// Pure function of the store contents: O(decode), no network I/O.
    /// Store read errors degrade to Anonymous rather than surfacing, since
    /// a session we cannot read is a session we do not have.
    pub fn current_session(&self) -> Session {
        let credential = match self.store.get() {
            Ok(credential) => credential,
            Err(e) => {
                tracing::warn!("Token store read failed, treating as anonymous: {}", e);
                return Session::anonymous();
            }
        };

        match credential.and_then(|c| decode_claims(&c.access)) {
            Some(claims) => Session {
                is_authenticated: true,
                user_id: Some(claims.user_id),
            },
            None => Session::anonymous(),
        }
    }

    /// Exchanges credentials for a token pair and stores it.
    ///
    /// On success the session transitions to Authenticated. On failure the
    /// token store is untouched.
    ///
    /// # Errors
    ///
    /// [`AuthError::InvalidCredentials`] on HTTP 401;
    /// [`AuthError::AuthUnavailable`] on any other failure.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), AuthError> {
        let pair = self.api.login(username, password).await.map_err(|e| match e {
            ApiError::Unauthorized => AuthError::InvalidCredentials,
            other => AuthError::AuthUnavailable(other.to_string()),
        })?;

        self.store
            .set(&Credential {
                access: pair.access,
                refresh: pair.refresh,
            })
            .map_err(|e| AuthError::AuthUnavailable(format!("failed to store credential: {}", e)))?;

        tracing::info!("Logged in as {}", username);
        Ok(())
    }

    /// Creates an account. No credential side effect on success: the caller
    /// must log in separately (registration and session establishment are
    /// deliberately decoupled).
    ///
    /// # Errors
    ///
    /// [`AuthError::RegistrationRejected`] on HTTP 400 (username taken,
    /// weak password); [`AuthError::AuthUnavailable`] otherwise.
    pub async fn register(&self, username: &str, password: &str) -> Result<(), AuthError> {
        self.api
            .register(username, password)
            .await
            .map_err(|e| match e {
                ApiError::Rejected(reason) => AuthError::RegistrationRejected(reason),
                other => AuthError::AuthUnavailable(other.to_string()),
            })?;

        tracing::info!("Registered account {}", username);
        Ok(())
    }

    /// Exchanges the stored refresh token for a fresh credential, replacing
    /// the stored pair wholesale.
    ///
    /// A 401 from the refresh endpoint means the refresh token itself is
    /// dead: the store is cleared (transition to Anonymous) before the
    /// error is returned.
    ///
    /// # Errors
    ///
    /// [`AuthError::InvalidCredentials`] when there is nothing to refresh
    /// or the server rejects the refresh token;
    /// [`AuthError::AuthUnavailable`] on transport failures.
    pub async fn refresh(&self) -> Result<(), AuthError> {
        let credential = self
            .store
            .get()
            .map_err(|e| AuthError::AuthUnavailable(e.to_string()))?
            .ok_or(AuthError::InvalidCredentials)?;

        let response = match self.api.refresh(&credential.refresh).await {
            Ok(response) => response,
            Err(ApiError::Unauthorized) => {
                tracing::info!("Refresh token rejected, clearing credential");
                let _ = self.store.clear();
                return Err(AuthError::InvalidCredentials);
            }
            Err(other) => return Err(AuthError::AuthUnavailable(other.to_string())),
        };

        let refreshed = Credential {
            access: response.access,
            // Reuse the prior refresh token unless the server rotated it.
            refresh: response.refresh.unwrap_or(credential.refresh),
        };
        self.store
            .set(&refreshed)
            .map_err(|e| AuthError::AuthUnavailable(format!("failed to store credential: {}", e)))?;

        tracing::debug!("Access token refreshed");
        Ok(())
    }

    /// Clears the stored credential. Idempotent; store errors are logged
    /// and swallowed so logout always succeeds from the caller's view.
    pub fn logout(&self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!("Failed to clear credential on logout: {}", e);
        }
        tracing::info!("Logged out");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryTokenStore;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine as _;
    use std::time::Duration;

    fn access_token(user_id: UserId) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload =
            URL_SAFE_NO_PAD.encode(format!(r#"{{"user_id":{},"exp":1800000000}}"#, user_id));
        format!("{}.{}.sig", header, payload)
    }

    fn manager_with_store(store: Arc<MemoryTokenStore>) -> SessionManager {
        let api = ApiClient::new(
            url::Url::parse("http://localhost:8000/api/").unwrap(),
            Duration::from_secs(5),
            store.clone(),
        )
        .unwrap();
        SessionManager::new(api, store)
    }

    #[test]
    fn test_session_anonymous_when_store_empty() {
        let manager = manager_with_store(Arc::new(MemoryTokenStore::new()));
        let session = manager.current_session();
        assert!(!session.is_authenticated);
        assert!(session.user_id.is_none());
    }

    #[test]
    fn test_session_authenticated_with_structurally_valid_token() {
        let store = Arc::new(MemoryTokenStore::with_credential(Credential {
            access: access_token(42),
            refresh: "refresh".to_string(),
        }));
        let manager = manager_with_store(store);
        let session = manager.current_session();
        assert!(session.is_authenticated);
        assert_eq!(session.user_id, Some(42));
    }

    #[test]
    fn test_session_anonymous_with_malformed_access_token() {
        let store = Arc::new(MemoryTokenStore::with_credential(Credential {
            access: "garbage".to_string(),
            refresh: "refresh".to_string(),
        }));
        let manager = manager_with_store(store);
        assert_eq!(manager.current_session(), Session::anonymous());
    }

    #[test]
    fn test_logout_clears_store_and_is_idempotent() {
        let store = Arc::new(MemoryTokenStore::with_credential(Credential {
            access: access_token(1),
            refresh: "refresh".to_string(),
        }));
        let manager = manager_with_store(store.clone());
        manager.logout();
        assert!(store.get().unwrap().is_none());
        manager.logout();
        assert!(store.get().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_refresh_without_credential_is_invalid() {
        let manager = manager_with_store(Arc::new(MemoryTokenStore::new()));
        assert!(matches!(
            manager.refresh().await,
            Err(AuthError::InvalidCredentials)
        ));
    }
}
