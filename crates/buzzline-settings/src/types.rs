//! Settings schema and compiled defaults.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root settings document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Message-relay backend connection settings.
    pub backend: BackendSettings,
    /// Local durable storage settings.
    pub storage: StorageSettings,
}

/// Backend connection settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BackendSettings {
    /// Backend host, without a scheme (e.g. `chat.example.com` or
    /// `127.0.0.1:8080`).
    pub host: String,
    /// Use `wss` instead of `ws`. Deployed backends sit behind TLS; the
    /// localhost default does not.
    pub tls: bool,
    /// WebSocket endpoint path.
    pub path: String,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1:8080".to_string(),
            tls: false,
            path: "/ws".to_string(),
        }
    }
}

impl BackendSettings {
    /// Build the connection handshake URL with the credential embedded
    /// as a query parameter.
    ///
    /// The transport carries auth only at handshake time, so the token
    /// rides on the URL: `ws[s]://<host><path>?token=<credential>`.
    pub fn handshake_url(&self, token: &str) -> String {
        let scheme = if self.tls { "wss" } else { "ws" };
        format!(
            "{scheme}://{}{}?token={}",
            self.host,
            self.path,
            urlencoding::encode(token)
        )
    }
}

/// Local durable storage settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StorageSettings {
    /// Data directory. Empty means `~/.buzzline`.
    pub data_dir: String,
}

impl StorageSettings {
    /// Resolve the data directory, defaulting to `~/.buzzline`.
    pub fn resolved_data_dir(&self) -> PathBuf {
        if self.data_dir.is_empty() {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".buzzline")
        } else {
            PathBuf::from(&self.data_dir)
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
