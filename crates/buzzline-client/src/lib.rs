//! # buzzline-client
//!
//! Realtime session core for the BuzzLine chat client.
//!
//! Three pieces, composed by [`Session`]:
//!
//! - [`Connection`]: owns one live WebSocket and its state machine —
//!   connect, open, close, error. No automatic reconnect: `Closed` and
//!   `Errored` are terminal for the instance and a fresh connect is the
//!   retry path.
//! - [`Transcript`]: append-only ordered log of confirmed entries. The
//!   single source of truth for transcript order; an outbound send never
//!   appends anything until the backend echoes it back.
//! - [`Session`]: resolves the stored credential, opens the connection,
//!   pumps transport events into the transcript, and exposes send /
//!   status / projection to the frontend.

#![deny(unsafe_code)]

pub mod connection;
pub mod errors;
pub mod session;
pub mod transcript;

#[cfg(test)]
pub(crate) mod testutil;

pub use connection::{Connection, ControllerEvent, StateMachine, TransportEvent};
pub use errors::{ConnectionError, SessionError};
pub use session::Session;
pub use transcript::Transcript;
