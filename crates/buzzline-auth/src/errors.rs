//! Credential error types.

use chrono::{DateTime, Utc};

/// Errors from credential storage and decoding.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No credential is stored; the user must log in.
    #[error("no stored credential")]
    Absent,

    /// The token is not a structurally valid JWT.
    #[error("malformed token: {0}")]
    Malformed(String),

    /// The claim segment is not valid base64url.
    #[error("claim segment encoding: {0}")]
    Encoding(#[from] base64::DecodeError),

    /// The claim segment is not valid JSON or misses a required claim.
    #[error("claim parse: {0}")]
    Claims(#[from] serde_json::Error),

    /// The token's `exp` claim is in the past.
    #[error("token expired at {0}")]
    Expired(DateTime<Utc>),

    /// Storage I/O failure.
    #[error("storage I/O: {0}")]
    Io(#[from] std::io::Error),
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_display() {
        assert_eq!(AuthError::Absent.to_string(), "no stored credential");
    }

    #[test]
    fn malformed_display() {
        let err = AuthError::Malformed("expected three dot-separated segments".to_string());
        assert_eq!(
            err.to_string(),
            "malformed token: expected three dot-separated segments"
        );
    }

    #[test]
    fn expired_display_carries_instant() {
        let at = DateTime::from_timestamp(0, 0).unwrap();
        let err = AuthError::Expired(at);
        assert!(err.to_string().contains("1970-01-01"));
    }

    #[test]
    fn io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = AuthError::from(io_err);
        assert!(err.to_string().contains("denied"));
    }
}
