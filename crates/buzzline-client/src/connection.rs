//! Connection controller — owns one live WebSocket over `tokio-tungstenite`.
//!
//! One command channel in, one event channel out: outbound sends and the
//! close request go through an mpsc into a single `tokio::select!` I/O
//! loop; transport occurrences come back to the orchestrator as
//! [`ControllerEvent`]s in arrival order. The loop is the only mutator of
//! the connection state, which observers read through a watch channel.
//!
//! There is no automatic reconnect: `Closed` and `Errored` are terminal
//! for the instance, and retrying means a fresh [`Connection::open`].

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use buzzline_core::{ConnectionState, Message};

use crate::errors::ConnectionError;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Notice synthesized when the connection opens.
pub const CONNECTED_NOTICE: &str = "You are now connected!";
/// Notice synthesized when the connection closes.
pub const DISCONNECTED_NOTICE: &str = "You have been disconnected.";
/// Notice synthesized on a transport fault.
pub const ERROR_NOTICE: &str = "Connection error. Please refresh.";

// ─────────────────────────────────────────────────────────────────────────────
// Events and state machine
// ─────────────────────────────────────────────────────────────────────────────

/// One transport occurrence, in arrival order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportEvent {
    /// Handshake completed.
    Opened,
    /// An inbound text frame.
    Inbound(String),
    /// Graceful or server-initiated closure.
    Closed,
    /// Transport-level fault.
    Errored,
}

/// What the controller delivers to the orchestrator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControllerEvent {
    /// The connection state changed; `notice` is the transcript entry
    /// this transition synthesizes.
    State {
        /// New state.
        state: ConnectionState,
        /// Synthesized system notice.
        notice: Message,
    },
    /// A raw inbound frame payload, to be parsed by the orchestrator.
    Inbound(String),
}

/// State machine for one connection instance.
///
/// Transitions happen only in response to transport events. Events that
/// would not change the state — a duplicate close, anything after a
/// terminal state — apply nothing and synthesize nothing.
#[derive(Debug, Default)]
pub struct StateMachine {
    state: ConnectionState,
}

impl StateMachine {
    /// A fresh machine in `Idle`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Mark the handshake as in flight (`Idle` → `Connecting`).
    pub fn start_connecting(&mut self) {
        if self.state == ConnectionState::Idle {
            self.state = ConnectionState::Connecting;
        }
    }

    /// Apply one transport event.
    ///
    /// Returns the system notice a real transition synthesizes, or
    /// `None` when the event leaves the state untouched.
    pub fn on_event(&mut self, event: &TransportEvent) -> Option<Message> {
        match event {
            TransportEvent::Opened
                if matches!(
                    self.state,
                    ConnectionState::Idle | ConnectionState::Connecting
                ) =>
            {
                self.state = ConnectionState::Open;
                Some(Message::system(CONNECTED_NOTICE))
            }
            TransportEvent::Closed if !self.state.is_terminal() => {
                self.state = ConnectionState::Closed;
                Some(Message::system(DISCONNECTED_NOTICE))
            }
            TransportEvent::Errored if !self.state.is_terminal() => {
                self.state = ConnectionState::Errored;
                Some(Message::system(ERROR_NOTICE))
            }
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Connection
// ─────────────────────────────────────────────────────────────────────────────

/// Internal command message for the I/O loop.
enum Command {
    Send(String),
    Close,
}

/// One live connection to the message-relay backend.
#[derive(Debug)]
pub struct Connection {
    cmd_tx: mpsc::Sender<Command>,
    state_rx: watch::Receiver<ConnectionState>,
    _io: JoinHandle<()>,
}

impl Connection {
    /// Open a WebSocket to `url` and start the I/O loop.
    ///
    /// The credential rides on `url` as a query parameter — the
    /// transport carries auth only at handshake time. The returned
    /// receiver yields [`ControllerEvent`]s in transport arrival order,
    /// starting with the `Open` transition.
    pub async fn open(
        url: &str,
    ) -> Result<(Self, mpsc::Receiver<ControllerEvent>), ConnectionError> {
        let mut machine = StateMachine::new();
        machine.start_connecting();
        let (state_tx, state_rx) = watch::channel(machine.state());

        let (ws, _response) = connect_async(url).await?;

        let (event_tx, event_rx) = mpsc::channel(64);
        let (cmd_tx, cmd_rx) = mpsc::channel(64);

        dispatch(&mut machine, &state_tx, &event_tx, TransportEvent::Opened).await;
        let io = tokio::spawn(io_loop(ws, cmd_rx, event_tx, state_tx, machine));

        Ok((
            Self {
                cmd_tx,
                state_rx,
                _io: io,
            },
            event_rx,
        ))
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// Watch the connection state.
    pub fn state_watch(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    /// Send a chat line.
    ///
    /// A no-op unless the connection is `Open` and `text` is non-empty
    /// after trimming — a UI-level guard, not a protocol requirement.
    /// Sends are fire-and-forget: no acknowledgment, no retry, and no
    /// queueing while disconnected.
    pub fn send(&self, text: &str) {
        let trimmed = text.trim();
        if trimmed.is_empty() || !self.state().is_open() {
            return;
        }
        if self
            .cmd_tx
            .try_send(Command::Send(trimmed.to_string()))
            .is_err()
        {
            tracing::debug!("outbound send dropped: I/O loop gone or backlogged");
        }
    }

    /// Request teardown.
    ///
    /// Forwarded to the transport only while it reports itself open, so
    /// repeated closes stay redundant-error free.
    pub fn close(&self) {
        if !self.state().is_open() {
            return;
        }
        let _ = self.cmd_tx.try_send(Command::Close);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// I/O loop
// ─────────────────────────────────────────────────────────────────────────────

/// Apply `event` to the machine and forward the result, keeping state
/// publication and event delivery in lockstep.
async fn dispatch(
    machine: &mut StateMachine,
    state_tx: &watch::Sender<ConnectionState>,
    event_tx: &mpsc::Sender<ControllerEvent>,
    event: TransportEvent,
) {
    match event {
        TransportEvent::Inbound(payload) => {
            let _ = event_tx.send(ControllerEvent::Inbound(payload)).await;
        }
        transition => {
            if let Some(notice) = machine.on_event(&transition) {
                let _ = state_tx.send_replace(machine.state());
                let _ = event_tx
                    .send(ControllerEvent::State {
                        state: machine.state(),
                        notice,
                    })
                    .await;
            }
        }
    }
}

/// Single I/O loop per connection: commands in, transport events out.
async fn io_loop(
    ws: WsStream,
    mut cmd_rx: mpsc::Receiver<Command>,
    event_tx: mpsc::Sender<ControllerEvent>,
    state_tx: watch::Sender<ConnectionState>,
    mut machine: StateMachine,
) {
    let (mut ws_tx, mut ws_rx) = ws.split();

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => match cmd {
                Some(Command::Send(text)) => {
                    if ws_tx.send(WsMessage::Text(text.into())).await.is_err() {
                        dispatch(&mut machine, &state_tx, &event_tx, TransportEvent::Errored).await;
                        break;
                    }
                }
                // All handles dropped counts as a requested close.
                Some(Command::Close) | None => {
                    let _ = ws_tx.close().await;
                    dispatch(&mut machine, &state_tx, &event_tx, TransportEvent::Closed).await;
                    break;
                }
            },
            frame = ws_rx.next() => match frame {
                Some(Ok(WsMessage::Text(text))) => {
                    dispatch(
                        &mut machine,
                        &state_tx,
                        &event_tx,
                        TransportEvent::Inbound(text.as_str().to_owned()),
                    )
                    .await;
                }
                Some(Ok(WsMessage::Close(_))) | None => {
                    dispatch(&mut machine, &state_tx, &event_tx, TransportEvent::Closed).await;
                    break;
                }
                // Binary, ping, pong: transport plumbing, not chat frames.
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "transport fault");
                    dispatch(&mut machine, &state_tx, &event_tx, TransportEvent::Errored).await;
                    break;
                }
            },
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
