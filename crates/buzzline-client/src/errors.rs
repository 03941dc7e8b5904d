//! Session core error types.

use buzzline_auth::AuthError;

/// Errors from establishing a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No credential in storage; the frontend routes to login.
    #[error("no stored credential")]
    NoCredential,

    /// The stored credential failed to decode; storage has been cleared
    /// and the frontend routes to login.
    #[error("invalid credential: {0}")]
    InvalidCredential(#[source] AuthError),

    /// The connection handshake failed.
    #[error("connect failed: {0}")]
    Connect(#[from] ConnectionError),
}

/// Errors from the connection controller.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// The WebSocket handshake was rejected or the transport failed
    /// before the connection opened.
    #[error("websocket handshake: {0}")]
    Handshake(#[from] tokio_tungstenite::tungstenite::Error),
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_credential_display() {
        assert_eq!(SessionError::NoCredential.to_string(), "no stored credential");
    }

    #[test]
    fn invalid_credential_wraps_auth_error() {
        let err = SessionError::InvalidCredential(AuthError::Malformed("bad".to_string()));
        assert!(err.to_string().contains("invalid credential"));
    }
}
