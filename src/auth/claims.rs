//! Structural (non-verifying) decode of access-token claims
//!
//! The access token is a JWT whose payload carries the claims the client
//! needs for UI hints: the stable user id and the expiry instant. Decoding
//! here is a pure parse of the token's structure; the signature is never
//! verified and the claims are never trusted for authorization decisions.
//! Real validity is whatever the server asserts on the next request.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::Deserialize;

use crate::types::UserId;

/// Claim set embedded in the access token payload.
///
/// Only the claims the client uses are modeled; unknown claims are ignored.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AccessClaims {
    /// Stable identifier of the authenticated user.
    pub user_id: UserId,

    /// Expiry instant as a Unix timestamp. Display-only; the client never
    /// makes authorization decisions from it.
    #[serde(default)]
    pub exp: Option<i64>,
}

/// Decodes the claim set from an access token, checking structure only.
///
/// A token is structurally valid when it has three dot-separated segments,
/// the middle segment is base64url (unpadded) and its decoded bytes are a
/// JSON object carrying a `user_id` claim. Returns `None` for anything
/// else; a structurally invalid token means the session is anonymous.
///
/// # Examples
///
/// ```
/// use chitchat::auth::decode_claims;
///
/// // Payload: {"user_id": 42, "exp": 1800000000}
/// let token = "eyJhbGciOiJIUzI1NiJ9.eyJ1c2VyX2lkIjo0MiwiZXhwIjoxODAwMDAwMDAwfQ.sig";
/// let claims = decode_claims(token).expect("structurally valid");
/// assert_eq!(claims.user_id, 42);
///
/// assert!(decode_claims("not-a-jwt").is_none());
/// ```
pub fn decode_claims(access_token: &str) -> Option<AccessClaims> {
    let mut segments = access_token.split('.');
    let (_header, payload, _signature) =
        (segments.next()?, segments.next()?, segments.next()?);
    if segments.next().is_some() {
        return None;
    }

    let decoded = URL_SAFE_NO_PAD.decode(payload.as_bytes()).ok()?;
    serde_json::from_slice(&decoded).ok()
}
