//! Settings commands: read, save, and the capture pause toggle.

use tauri::{AppHandle, State};

use crate::shared::emit::emit_event;
use crate::shared::errors::CommandResult;
use crate::shared::events::AppEvent;
use crate::shared::settings::{snapshot, update, AppSettings, SharedSettings};

/// Current application settings
#[tauri::command]
pub fn get_settings(settings: State<SharedSettings>) -> AppSettings {
    snapshot(settings.inner())
}

/// Replace the settings, persist them and broadcast the update.
#[tauri::command]
pub fn save_settings(
    app: AppHandle,
    new_settings: AppSettings,
    settings: State<SharedSettings>,
) -> CommandResult<()> {
    let updated = update(settings.inner(), |s| *s = new_settings.clone());
    updated.save()?;
    emit_event(&app, AppEvent::SettingsUpdated(updated));
    Ok(())
}

/// Flip the capture pause flag. Returns true when capture is now paused.
#[tauri::command]
pub fn toggle_capture(app: AppHandle, settings: State<SharedSettings>) -> CommandResult<bool> {
    Ok(toggle_capture_inner(&app, settings.inner()))
}

/// True while capture is recording (not paused).
#[tauri::command]
pub fn capture_status(settings: State<SharedSettings>) -> bool {
    !snapshot(settings.inner()).pause_capture
}

/// Shared by the command above and the tray menu.
pub(crate) fn toggle_capture_inner(app: &AppHandle, settings: &SharedSettings) -> bool {
    let updated = update(settings, |s| s.pause_capture = !s.pause_capture);
    if let Err(e) = updated.save() {
        // The toggle still applies for this session.
        eprintln!("[Settings] Failed to persist pause state: {}", e);
    }
    emit_event(app, AppEvent::CapturePaused(updated.pause_capture));
    let notice = if updated.pause_capture {
        "Clipboard capture paused"
    } else {
        "Clipboard capture resumed"
    };
    emit_event(app, AppEvent::Notice(notice.to_string()));
    updated.pause_capture
}
