//! Wire frame types.
//!
//! Outbound frames are the raw trimmed message text with no envelope —
//! the backend wraps them with sender identity before broadcast. Inbound
//! frames are JSON; anything that does not decode as [`ChatFrame`] is
//! unparseable and gets dropped by the session core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::messages::Message;

/// One inbound broadcast frame: `{ sender, text, timestamp? }`.
///
/// Unknown extra fields are tolerated; a missing `sender` or `text`, or
/// a `timestamp` that is not an RFC 3339 string, makes the frame
/// unparseable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatFrame {
    /// Display name the backend stamped on the frame.
    pub sender: String,
    /// Message body.
    pub text: String,
    /// Server-assigned delivery timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ChatFrame {
    /// Parse one inbound text payload.
    pub fn parse(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }
}

impl From<ChatFrame> for Message {
    fn from(frame: ChatFrame) -> Self {
        Self::Chat {
            sender: frame.sender,
            text: frame.text,
            timestamp: frame.timestamp,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
