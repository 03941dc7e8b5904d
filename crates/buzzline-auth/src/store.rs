//! The credential store.
//!
//! Thin facade over the injected [`TokenStorage`] collaborator: read,
//! write, clear, and decode the one persisted credential. The token is
//! not held in memory beyond the decoded [`SessionUser`] projection.

use buzzline_core::SessionUser;

use crate::claims;
use crate::errors::AuthError;
use crate::storage::TokenStorage;

/// Storage key for the session token. Matches the web client's
/// `localStorage` key so both frontends share a vocabulary.
pub const TOKEN_KEY: &str = "authtoken";

/// Credential store over an injected storage collaborator.
#[derive(Debug)]
pub struct CredentialStore<S> {
    storage: S,
}

impl<S: TokenStorage> CredentialStore<S> {
    /// Store backed by `storage`.
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Fetch the stored token. Absence is soft: `None`, not an error.
    pub fn read(&self) -> Option<String> {
        self.storage.get(TOKEN_KEY)
    }

    /// Persist `token`, overwriting any previous credential.
    pub fn write(&self, token: &str) -> Result<(), AuthError> {
        self.storage.set(TOKEN_KEY, token)?;
        Ok(())
    }

    /// Remove the stored token. Clearing an empty store is a no-op.
    pub fn clear(&self) -> Result<(), AuthError> {
        self.storage.delete(TOKEN_KEY)?;
        Ok(())
    }

    /// Structurally decode `token` into a session user.
    ///
    /// Callers on the session path must [`clear`](Self::clear) the store
    /// when this fails, so a corrupt token is not retried forever.
    pub fn decode(&self, token: &str) -> Result<SessionUser, AuthError> {
        claims::decode_session_user(token)
    }

    /// Resolve the stored credential to a session user.
    ///
    /// Convenience for read-then-decode. Absence is [`AuthError::Absent`];
    /// a token that fails to decode is cleared before the error is
    /// returned.
    pub fn session_user(&self) -> Result<SessionUser, AuthError> {
        let Some(token) = self.read() else {
            return Err(AuthError::Absent);
        };
        match self.decode(&token) {
            Ok(user) => Ok(user),
            Err(e) => {
                if let Err(clear_err) = self.clear() {
                    tracing::warn!(error = %clear_err, "failed to clear rejected credential");
                }
                Err(e)
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
