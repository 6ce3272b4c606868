//! Application configuration.
//!
//! The settings struct is constructed once at startup, shared as
//! `Arc<RwLock<AppSettings>>` and passed to every component that needs it.
//! There is no ambient global lookup.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::shared::errors::{CommandError, CommandResult};

/// Shared handle to the configuration constructed once at startup.
pub type SharedSettings = Arc<RwLock<AppSettings>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export, export_to = "../bindings/")]
pub struct AppSettings {
    /// Maximum number of history entries; pinned entries do not count.
    pub history_size: usize,
    /// Persist history to disk after every mutation.
    pub persist_history: bool,
    /// Clipboard poll interval in milliseconds.
    pub poll_interval_ms: u64,
    /// Also watch the middle-click (primary) selection.
    pub track_primary: bool,
    /// User toggle: stop recording clipboard changes.
    pub pause_capture: bool,
    /// Byte cap for captured HTML/RTF payloads; oversized payloads are dropped.
    pub max_rich_bytes: usize,
    /// Byte cap for captured PNG payloads.
    pub max_image_bytes: usize,
    /// Skip capture while a credential-entry window has focus.
    pub enable_secure_heuristics: bool,
    /// User-supplied window classes that are never captured from.
    pub skip_wm_classes: Vec<String>,
    /// Simulate Ctrl+V after activating an entry (X11 only).
    pub auto_paste: bool,
    /// Always activate entries as plain text, ignoring rich content.
    pub paste_as_plain_text: bool,
    /// Popup placement: "window" (centered) or "mouse".
    pub popup_position: String,
    /// Global shortcut that toggles the popup.
    pub shortcut: String,
    /// Most recently used emoji, newest first.
    pub emoji_recents: Vec<String>,
    /// Tenor API key for the GIF picker; empty disables GIF search.
    pub tenor_api_key: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            history_size: 25,
            persist_history: true,
            poll_interval_ms: 500,
            track_primary: false,
            pause_capture: false,
            max_rich_bytes: 262_144,
            max_image_bytes: 1_500_000,
            enable_secure_heuristics: true,
            skip_wm_classes: Vec::new(),
            auto_paste: false,
            paste_as_plain_text: false,
            popup_position: "window".to_string(),
            shortcut: "Super+V".to_string(),
            emoji_recents: Vec::new(),
            tenor_api_key: String::new(),
        }
    }
}

impl AppSettings {
    pub fn settings_path() -> CommandResult<PathBuf> {
        ProjectDirs::from("com", "clipboardpopup", "clipboard-popup")
            .map(|dirs| dirs.config_dir().join("settings.json"))
            .ok_or_else(|| {
                CommandError::SystemIO("Failed to determine config directory".to_string())
            })
    }

    /// Load settings from disk, falling back to defaults for a missing file.
    ///
    /// A file that exists but fails to parse is an error; the caller decides
    /// whether to fall back to defaults.
    pub fn load() -> CommandResult<Self> {
        let path = Self::settings_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)
            .map_err(|e| CommandError::SystemIO(format!("Failed to read settings file: {}", e)))?;
        serde_json::from_str(&content)
            .map_err(|e| CommandError::InvalidInput(format!("Failed to parse settings: {}", e)))
    }

    pub fn save(&self) -> CommandResult<()> {
        let path = Self::settings_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CommandError::SystemIO(format!("Failed to create config directory: {}", e))
            })?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)
            .map_err(|e| CommandError::SystemIO(format!("Failed to write settings file: {}", e)))
    }

    pub fn into_shared(self) -> SharedSettings {
        Arc::new(RwLock::new(self))
    }
}

/// Clone the current settings out of the shared handle.
pub fn snapshot(settings: &SharedSettings) -> AppSettings {
    match settings.read() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => {
            eprintln!("[Settings] RwLock poisoned, recovering...");
            poisoned.into_inner().clone()
        }
    }
}

/// Apply a mutation to the shared settings and return the updated copy.
pub fn update<F>(settings: &SharedSettings, mutate: F) -> AppSettings
where
    F: FnOnce(&mut AppSettings),
{
    let mut guard = match settings.write() {
        Ok(guard) => guard,
        Err(poisoned) => {
            eprintln!("[Settings] RwLock poisoned in update(), recovering...");
            poisoned.into_inner()
        }
    };
    mutate(&mut guard);
    guard.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let settings = AppSettings::default();
        assert!(settings.history_size >= 1);
        assert!(settings.persist_history);
        assert!(!settings.pause_capture);
        assert!(settings.poll_interval_ms >= 200);
    }

    #[test]
    fn unknown_and_missing_fields_are_tolerated() {
        // Forward compatibility relies on permissive per-field defaulting.
        let parsed: AppSettings =
            serde_json::from_str(r#"{"history_size": 7, "some_future_flag": true}"#).unwrap();
        assert_eq!(parsed.history_size, 7);
        assert_eq!(parsed.poll_interval_ms, AppSettings::default().poll_interval_ms);
    }

    #[test]
    fn update_mutates_shared_copy() {
        let shared = AppSettings::default().into_shared();
        let updated = update(&shared, |s| s.pause_capture = true);
        assert!(updated.pause_capture);
        assert!(snapshot(&shared).pause_capture);
    }
}
