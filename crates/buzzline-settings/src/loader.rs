//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`Settings::default()`]
//! 2. If `~/.buzzline/settings.json` exists, deep-merge user values over
//!    defaults
//! 3. Apply `BUZZLINE_*` environment variable overrides (highest priority)
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::Settings;

/// Resolve the path to the settings file (`~/.buzzline/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".buzzline").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<Settings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<Settings> {
    let defaults = serde_json::to_value(Settings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: Settings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment variable overrides to loaded settings.
pub fn apply_env_overrides(settings: &mut Settings) {
    apply_overrides_from(settings, |name| std::env::var(name).ok());
}

/// Apply overrides read through `lookup` (injectable for tests).
///
/// Booleans accept `true`/`1`/`yes`/`on` and `false`/`0`/`no`/`off`;
/// anything else is silently ignored, falling back to the file/default
/// value.
pub fn apply_overrides_from(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("BUZZLINE_HOST").filter(|v| !v.trim().is_empty()) {
        settings.backend.host = v.trim().to_string();
    }
    if let Some(v) = lookup("BUZZLINE_WS_PATH").filter(|v| !v.trim().is_empty()) {
        settings.backend.path = v.trim().to_string();
    }
    if let Some(v) = lookup("BUZZLINE_TLS").and_then(|v| parse_bool(&v)) {
        settings.backend.tls = v;
    }
    if let Some(v) = lookup("BUZZLINE_DATA_DIR").filter(|v| !v.trim().is_empty()) {
        settings.storage.data_dir = v.trim().to_string();
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings_from_path(&dir.path().join("settings.json")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn user_file_deep_merges_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{ "backend": { "host": "chat.example.com", "tls": true } }"#,
        )
        .unwrap();

        let settings = load_settings_from_path(&path).unwrap();
        assert_eq!(settings.backend.host, "chat.example.com");
        assert!(settings.backend.tls);
        // Untouched keys keep their defaults.
        assert_eq!(settings.backend.path, "/ws");
        assert_eq!(settings.storage.data_dir, "");
    }

    #[test]
    fn invalid_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(load_settings_from_path(&path).is_err());
    }

    #[test]
    fn null_values_preserve_target() {
        let merged = deep_merge(
            serde_json::json!({"backend": {"host": "a"}}),
            serde_json::json!({"backend": {"host": null}}),
        );
        assert_eq!(merged["backend"]["host"], "a");
    }

    #[test]
    fn env_overrides_win() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("BUZZLINE_HOST", "env.example.com"),
            ("BUZZLINE_TLS", "yes"),
            ("BUZZLINE_DATA_DIR", "/tmp/bz"),
        ]);
        let mut settings = Settings::default();
        apply_overrides_from(&mut settings, |name| {
            env.get(name).map(ToString::to_string)
        });
        assert_eq!(settings.backend.host, "env.example.com");
        assert!(settings.backend.tls);
        assert_eq!(settings.storage.data_dir, "/tmp/bz");
    }

    #[test]
    fn invalid_bool_override_is_ignored() {
        let mut settings = Settings::default();
        apply_overrides_from(&mut settings, |name| {
            (name == "BUZZLINE_TLS").then(|| "maybe".to_string())
        });
        assert!(!settings.backend.tls);
    }

    #[test]
    fn empty_override_is_ignored() {
        let mut settings = Settings::default();
        apply_overrides_from(&mut settings, |name| {
            (name == "BUZZLINE_HOST").then(|| "   ".to_string())
        });
        assert_eq!(settings.backend.host, "127.0.0.1:8080");
    }
}
