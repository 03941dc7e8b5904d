//! Connection lifecycle states.

use serde::{Deserialize, Serialize};

/// Lifecycle of one live connection instance.
///
/// Owned exclusively by the connection controller; observers read it
/// through a watch channel. `Closed` and `Errored` are terminal for the
/// instance — retrying means opening a fresh connection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// No connection attempted yet.
    #[default]
    Idle,
    /// Handshake in flight.
    Connecting,
    /// Live; outbound sends are accepted.
    Open,
    /// Graceful or server-initiated closure.
    Closed,
    /// Transport-level fault.
    Errored,
}

impl ConnectionState {
    /// Whether the connection can carry outbound frames.
    pub fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }

    /// Whether this state is terminal for the connection instance.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Closed | Self::Errored)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
