//! Session user projection.

use serde::{Deserialize, Serialize};

/// Read-only projection of the decoded credential claims.
///
/// Recomputed whenever the credential changes; never mutated on its own.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Display name; also what the backend stamps on broadcast frames.
    pub name: String,
    /// Account email, when the issuer included it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
