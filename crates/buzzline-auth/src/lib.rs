//! # buzzline-auth
//!
//! Session credential handling for the BuzzLine client.
//!
//! The credential is an opaque signed token issued by the external OAuth
//! backend. This crate:
//!
//! - **Persists** it under a single well-known key through an injected
//!   [`TokenStorage`] collaborator (file-backed, or in-memory for tests)
//! - **Decodes** its claim segment structurally into a [`SessionUser`]
//!   (no signature verification — that is the backend's job at handshake)
//! - **Validates** the `exp` claim so a dead token routes back to login
//!   instead of a doomed connect
//! - **Extracts** the `token` query parameter from the OAuth callback URL
//!
//! No network, no timers: every operation here is synchronous local state.

#![deny(unsafe_code)]

pub mod callback;
pub mod claims;
pub mod errors;
pub mod storage;
pub mod store;

pub use buzzline_core::SessionUser;
pub use callback::token_from_callback_url;
pub use claims::Claims;
pub use errors::AuthError;
pub use storage::{FileStorage, MemoryStorage, TokenStorage};
pub use store::{CredentialStore, TOKEN_KEY};

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
