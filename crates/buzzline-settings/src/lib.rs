//! # buzzline-settings
//!
//! Configuration management with layered sources for the BuzzLine client.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults** — [`Settings::default()`]
//! 2. **User file** — `~/.buzzline/settings.json` (deep-merged over defaults)
//! 3. **Environment variables** — `BUZZLINE_*` overrides (highest priority)

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::{BackendSettings, Settings, StorageSettings};

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn re_exports_work() {
        let settings = Settings::default();
        assert_eq!(settings.backend.path, "/ws");
    }

    #[test]
    fn deep_merge_re_exported() {
        let merged = deep_merge(
            serde_json::json!({"x": 1}),
            serde_json::json!({"y": 2}),
        );
        assert_eq!(merged["x"], 1);
        assert_eq!(merged["y"], 2);
    }
}
