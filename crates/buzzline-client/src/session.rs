//! Session manager — composes credential store, connection, transcript.
//!
//! On connect: resolve the credential, decode it, open the connection
//! with the token on the handshake URL, then pump transport events into
//! the transcript. Everything after setup is event-driven: transport
//! callbacks arrive on the event channel and are applied one at a time,
//! in arrival order. The transcript is mutated only from the pump.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use buzzline_auth::{CredentialStore, TokenStorage};
use buzzline_core::{ChatFrame, ConnectionState, Message, RenderedMessage, SessionUser};
use buzzline_settings::Settings;

use crate::connection::{Connection, ControllerEvent};
use crate::errors::SessionError;
use crate::transcript::Transcript;

/// One live chat session.
///
/// Owns the connection and the transcript for its lifetime; the
/// credential itself is not held beyond the decoded [`SessionUser`]
/// projection.
#[derive(Debug)]
pub struct Session {
    user: SessionUser,
    connection: Connection,
    transcript: Arc<RwLock<Transcript>>,
    updates: watch::Receiver<u64>,
    _pump: JoinHandle<()>,
}

impl Session {
    /// Resolve the stored credential and open the live connection.
    ///
    /// Absence routes to login via [`SessionError::NoCredential`]. A
    /// credential that fails to decode is cleared from storage before
    /// [`SessionError::InvalidCredential`] is returned, so a corrupt
    /// token is not retried on the next start.
    pub async fn connect<S: TokenStorage>(
        settings: &Settings,
        store: &CredentialStore<S>,
    ) -> Result<Self, SessionError> {
        let Some(token) = store.read() else {
            return Err(SessionError::NoCredential);
        };
        let user = match store.decode(&token) {
            Ok(user) => user,
            Err(e) => {
                if let Err(clear_err) = store.clear() {
                    tracing::warn!(error = %clear_err, "failed to clear rejected credential");
                }
                return Err(SessionError::InvalidCredential(e));
            }
        };

        let url = settings.backend.handshake_url(&token);
        let (connection, events) = Connection::open(&url).await?;
        tracing::info!(name = %user.name, "session connected");

        let transcript = Arc::new(RwLock::new(Transcript::new()));
        let (updates_tx, updates) = watch::channel(0);
        let pump = tokio::spawn(event_pump(events, Arc::clone(&transcript), updates_tx));

        Ok(Self {
            user,
            connection,
            transcript,
            updates,
            _pump: pump,
        })
    }

    /// The session user decoded from the credential.
    pub fn user(&self) -> &SessionUser {
        &self.user
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.connection.state()
    }

    /// Whether outbound sends would currently go through.
    pub fn is_connected(&self) -> bool {
        self.connection.state().is_open()
    }

    /// Watch the connection state.
    pub fn state_watch(&self) -> watch::Receiver<ConnectionState> {
        self.connection.state_watch()
    }

    /// Watch transcript revisions; bumped once per appended entry.
    pub fn updates(&self) -> watch::Receiver<u64> {
        self.updates.clone()
    }

    /// Number of transcript entries.
    pub fn transcript_len(&self) -> usize {
        self.transcript.read().len()
    }

    /// Rendered transcript snapshot, classified for the session user.
    pub fn transcript(&self) -> Vec<RenderedMessage> {
        self.transcript.read().render(&self.user)
    }

    /// Send a chat line; subject to the connection's open/non-empty
    /// guard. The transcript entry appears only once the backend echoes
    /// the message back.
    pub fn send(&self, text: &str) {
        self.connection.send(text);
    }

    /// Request teardown. Idempotent: forwarded only while the transport
    /// is open, and the pump winds down once the final close event has
    /// been applied.
    pub fn shutdown(&self) {
        self.connection.close();
    }
}

/// Apply controller events to the transcript, one at a time, in order.
///
/// Each event either fully applies (one appended entry) or applies
/// nothing — a malformed inbound frame is dropped with a diagnostic and
/// leaves both the transcript and the connection state untouched.
async fn event_pump(
    mut events: mpsc::Receiver<ControllerEvent>,
    transcript: Arc<RwLock<Transcript>>,
    updates_tx: watch::Sender<u64>,
) {
    let mut revision: u64 = 0;
    while let Some(event) = events.recv().await {
        let appended = match event {
            ControllerEvent::State { state, notice } => {
                tracing::debug!(?state, "connection state changed");
                transcript.write().push(notice);
                true
            }
            ControllerEvent::Inbound(payload) => match ChatFrame::parse(&payload) {
                Ok(frame) => {
                    transcript.write().push(Message::from(frame));
                    true
                }
                Err(e) => {
                    tracing::warn!(error = %e, "dropping malformed inbound frame");
                    false
                }
            },
        };
        if appended {
            revision += 1;
            let _ = updates_tx.send_replace(revision);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use assert_matches::assert_matches;
    use base64::Engine as _;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    use buzzline_auth::{AuthError, MemoryStorage};
    use buzzline_core::{RenderedMessage, Side};
    use buzzline_settings::{BackendSettings, StorageSettings};

    use super::*;
    use crate::connection::{CONNECTED_NOTICE, DISCONNECTED_NOTICE};
    use crate::testutil::{ServerAction, spawn_backend};

    fn test_token(name: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(
            serde_json::json!({ "name": name, "exp": chrono::Utc::now().timestamp() + 3600 })
                .to_string(),
        );
        format!("{header}.{payload}.unverified")
    }

    fn settings_for(host: &str) -> Settings {
        Settings {
            backend: BackendSettings {
                host: host.to_string(),
                tls: false,
                path: "/ws".to_string(),
            },
            storage: StorageSettings::default(),
        }
    }

    async fn wait_until(mut cond: impl FnMut() -> bool) {
        for _ in 0..200 {
            if cond() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not met within 2s");
    }

    #[tokio::test]
    async fn connect_without_credential_routes_to_login() {
        let store = CredentialStore::new(MemoryStorage::default());
        let result = Session::connect(&settings_for("127.0.0.1:1"), &store).await;
        assert_matches!(result, Err(SessionError::NoCredential));
    }

    #[tokio::test]
    async fn corrupt_credential_is_cleared_before_failing() {
        let store = CredentialStore::new(MemoryStorage::default());
        store.write("corrupt").unwrap();

        let result = Session::connect(&settings_for("127.0.0.1:1"), &store).await;
        assert_matches!(
            result,
            Err(SessionError::InvalidCredential(AuthError::Malformed(_)))
        );
        assert!(store.read().is_none());
    }

    #[tokio::test]
    async fn session_lifecycle_and_projection() {
        let mut backend = spawn_backend().await;
        let store = CredentialStore::new(MemoryStorage::default());
        store.write(&test_token("Ann")).unwrap();

        let session = Session::connect(&settings_for(&backend.host), &store)
            .await
            .unwrap();
        assert_eq!(session.user().name, "Ann");

        let mut server = backend.conns.recv().await.unwrap();
        assert!(
            server
                .query
                .as_deref()
                .unwrap_or_default()
                .starts_with("token=")
        );

        wait_until(|| session.transcript_len() == 1).await;
        assert!(session.is_connected());
        assert_eq!(
            session.transcript()[0],
            RenderedMessage::System {
                text: CONNECTED_NOTICE.to_string()
            }
        );

        // Guard idempotence: empty and whitespace sends never reach the
        // transport; the first frame the server sees is the real one.
        session.send("");
        session.send("   ");
        session.send("  hi  ");
        assert_eq!(server.received.recv().await.unwrap(), "hi");

        // No phantom echo: nothing appended until the server confirms.
        assert_eq!(session.transcript_len(), 1);

        server
            .actions
            .send(ServerAction::Text(
                serde_json::json!({"sender": "Ann", "text": "hi"}).to_string(),
            ))
            .await
            .unwrap();
        server
            .actions
            .send(ServerAction::Text(
                serde_json::json!({"sender": "Bob", "text": "yo"}).to_string(),
            ))
            .await
            .unwrap();
        wait_until(|| session.transcript_len() == 3).await;

        let rendered = session.transcript();
        assert_matches!(
            &rendered[1],
            RenderedMessage::Chat { sender, side: Side::Mine, .. } if sender == "Ann"
        );
        assert_matches!(
            &rendered[2],
            RenderedMessage::Chat { sender, side: Side::Theirs, .. } if sender == "Bob"
        );

        // Malformed frames are dropped; log and state untouched.
        server
            .actions
            .send(ServerAction::Text("not json".to_string()))
            .await
            .unwrap();
        server
            .actions
            .send(ServerAction::Text(
                serde_json::json!({"sender": "Bob", "text": "still here"}).to_string(),
            ))
            .await
            .unwrap();
        wait_until(|| session.transcript_len() == 4).await;
        assert!(session.is_connected());

        // Server-side close: exactly one disconnect notice, status flips.
        server.actions.send(ServerAction::Close).await.unwrap();
        wait_until(|| session.state().is_terminal()).await;
        wait_until(|| session.transcript_len() == 5).await;
        assert!(!session.is_connected());
        assert_eq!(
            session.transcript()[4],
            RenderedMessage::System {
                text: DISCONNECTED_NOTICE.to_string()
            }
        );

        // Teardown after close stays idempotent: no extra notices, no
        // effect from late sends.
        session.shutdown();
        session.shutdown();
        session.send("too late");
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(session.transcript_len(), 5);
    }

    #[tokio::test]
    async fn inbound_frames_append_in_delivery_order() {
        let mut backend = spawn_backend().await;
        let store = CredentialStore::new(MemoryStorage::default());
        store.write(&test_token("Ann")).unwrap();

        let session = Session::connect(&settings_for(&backend.host), &store)
            .await
            .unwrap();
        let server = backend.conns.recv().await.unwrap();

        for i in 0..20 {
            server
                .actions
                .send(ServerAction::Text(
                    serde_json::json!({"sender": "Bob", "text": i.to_string()}).to_string(),
                ))
                .await
                .unwrap();
        }
        wait_until(|| session.transcript_len() == 21).await;

        let rendered = session.transcript();
        for (i, entry) in rendered.iter().skip(1).enumerate() {
            assert_matches!(
                entry,
                RenderedMessage::Chat { text, .. } if *text == i.to_string()
            );
        }
        session.shutdown();
    }

    #[tokio::test]
    async fn updates_watch_tracks_appends() {
        let mut backend = spawn_backend().await;
        let store = CredentialStore::new(MemoryStorage::default());
        store.write(&test_token("Ann")).unwrap();

        let session = Session::connect(&settings_for(&backend.host), &store)
            .await
            .unwrap();
        let server = backend.conns.recv().await.unwrap();
        wait_until(|| session.transcript_len() == 1).await;

        // A receiver cloned now has seen the connected-notice revision;
        // the next wakeup is the next append.
        let mut updates = session.updates();
        server
            .actions
            .send(ServerAction::Text(
                serde_json::json!({"sender": "Bob", "text": "yo"}).to_string(),
            ))
            .await
            .unwrap();
        updates.changed().await.unwrap();
        assert_eq!(session.transcript_len(), 2);
        session.shutdown();
    }
}
