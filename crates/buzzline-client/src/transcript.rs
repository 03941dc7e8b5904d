//! Append-only transcript and its rendering projection.

use buzzline_core::{Message, RenderedMessage, SessionUser, Side};

/// Append-only ordered log of confirmed transcript entries.
///
/// The single source of truth for transcript order. Entries are only
/// ever appended — never reordered, never removed — and only
/// server-confirmed chat lines and locally synthesized system notices
/// go in. There is no separate "pending outbound" buffer to reconcile
/// against, which is what keeps every client's transcript identical in
/// server-delivery order.
#[derive(Clone, Debug, Default)]
pub struct Transcript {
    entries: Vec<Message>,
}

impl Transcript {
    /// An empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one entry to the end of the log.
    pub fn push(&mut self, message: Message) {
        self.entries.push(message);
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the transcript has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entries in append order.
    pub fn entries(&self) -> &[Message] {
        &self.entries
    }

    /// Pure mine-or-theirs projection against the session user.
    ///
    /// Classification compares the sender display name with `user.name`.
    /// The backend sends no stable user id, so two accounts sharing a
    /// display name will misclassify — a latent quirk of the wire
    /// format, kept as-is rather than papered over.
    pub fn render(&self, user: &SessionUser) -> Vec<RenderedMessage> {
        self.entries
            .iter()
            .map(|entry| match entry {
                Message::System { text } => RenderedMessage::System { text: text.clone() },
                Message::Chat {
                    sender,
                    text,
                    timestamp,
                } => RenderedMessage::Chat {
                    sender: sender.clone(),
                    text: text.clone(),
                    timestamp: *timestamp,
                    side: if *sender == user.name {
                        Side::Mine
                    } else {
                        Side::Theirs
                    },
                },
            })
            .collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
