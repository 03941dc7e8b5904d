//! # buzzline-core
//!
//! Shared vocabulary for the BuzzLine chat client.
//!
//! - **Messages**: [`Message`] enum with `System` and `Chat` variants
//! - **Wire frames**: [`ChatFrame`] matching the backend broadcast format
//! - **Connection state**: [`ConnectionState`] lifecycle enum
//! - **Session user**: [`SessionUser`] projection of the token claims
//! - **Rendering**: [`RenderedMessage`] / [`Side`] mine-or-theirs projection

#![deny(unsafe_code)]

pub mod messages;
pub mod state;
pub mod user;
pub mod wire;

pub use messages::{Message, RenderedMessage, Side};
pub use state::ConnectionState;
pub use user::SessionUser;
pub use wire::ChatFrame;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
