//! Transcript message types and the rendering projection.
//!
//! A [`Message`] is one confirmed transcript entry. The transcript never
//! holds an unconfirmed locally-composed line: an outbound send appears
//! only once the backend echoes it back, so every connected client sees
//! the same entries in the same (server-delivery) order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Message
// ─────────────────────────────────────────────────────────────────────────────

/// One entry in the transcript.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    /// Locally synthesized status notice (connected, disconnected, error).
    ///
    /// Never sent over the wire.
    System {
        /// Notice text.
        text: String,
    },
    /// A server-confirmed chat line.
    Chat {
        /// Display name of the author, as wrapped by the backend.
        sender: String,
        /// Message body.
        text: String,
        /// Server-assigned delivery timestamp, when the backend sent one.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<DateTime<Utc>>,
    },
}

impl Message {
    /// Build a system notice.
    pub fn system(text: impl Into<String>) -> Self {
        Self::System { text: text.into() }
    }

    /// Whether this entry is a system notice.
    pub fn is_system(&self) -> bool {
        matches!(self, Self::System { .. })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rendering projection
// ─────────────────────────────────────────────────────────────────────────────

/// Which side of the conversation a chat line belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Authored by the session user.
    Mine,
    /// Authored by anyone else.
    Theirs,
}

/// A transcript entry classified for display.
///
/// `System` entries pass through unclassified; `Chat` entries carry a
/// [`Side`] from comparing the sender name with the session user's name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderedMessage {
    /// Neutral, centered status line.
    System {
        /// Notice text.
        text: String,
    },
    /// A chat bubble.
    Chat {
        /// Display name of the author.
        sender: String,
        /// Message body.
        text: String,
        /// Server-assigned delivery timestamp, when present.
        timestamp: Option<DateTime<Utc>>,
        /// Mine or theirs.
        side: Side,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_constructor_tags_variant() {
        let msg = Message::system("You are now connected!");
        assert!(msg.is_system());
        assert_eq!(
            msg,
            Message::System {
                text: "You are now connected!".to_string()
            }
        );
    }

    #[test]
    fn chat_message_serializes_with_type_tag() {
        let msg = Message::Chat {
            sender: "Ann".to_string(),
            text: "hi".to_string(),
            timestamp: None,
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "chat");
        assert_eq!(json["sender"], "Ann");
        assert!(json.get("timestamp").is_none());
    }

    #[test]
    fn side_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Side::Mine).unwrap(), "mine");
        assert_eq!(serde_json::to_value(Side::Theirs).unwrap(), "theirs");
    }
}
