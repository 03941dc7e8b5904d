//! Structural JWT claim decoding.
//!
//! The client never verifies the signature — the backend does that when
//! it accepts the handshake. Decoding here only splits the three token
//! segments, base64url-decodes the middle one, and parses the claims.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use buzzline_core::SessionUser;

use crate::errors::AuthError;

/// Claims carried in the session token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Display name the issuer resolved for the account.
    pub name: String,
    /// Account email, when the issuer included it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Expiry, unix seconds.
    pub exp: i64,
}

impl Claims {
    /// Decode the claim segment of `token`.
    ///
    /// Structural only: three dot-separated segments, base64url payload,
    /// JSON claims with a `name`. The signature segment is not inspected.
    pub fn decode(token: &str) -> Result<Self, AuthError> {
        let mut segments = token.split('.');
        let (Some(_header), Some(payload), Some(_signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(AuthError::Malformed(
                "expected three dot-separated segments".to_string(),
            ));
        };

        // Issuers differ on padding; strip it and decode unpadded.
        let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
        let claims: Self = serde_json::from_slice(&bytes)?;
        Ok(claims)
    }

    /// The expiry instant.
    pub fn expires_at(&self) -> Result<DateTime<Utc>, AuthError> {
        DateTime::from_timestamp(self.exp, 0)
            .ok_or_else(|| AuthError::Malformed("exp claim out of range".to_string()))
    }
}

/// Decode `token` into a session user, rejecting expired tokens.
pub fn decode_session_user(token: &str) -> Result<SessionUser, AuthError> {
    let claims = Claims::decode(token)?;
    let expires_at = claims.expires_at()?;
    if expires_at <= Utc::now() {
        return Err(AuthError::Expired(expires_at));
    }
    Ok(SessionUser {
        name: claims.name,
        email: claims.email,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
