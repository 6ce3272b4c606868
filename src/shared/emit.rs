use tauri::{AppHandle, Emitter};

use super::events::AppEvent;

/// Emit an application event to all windows
pub fn emit_event(app: &AppHandle, event: AppEvent) {
    // Tauri's emit takes a string event name, so dispatch manually; the
    // AppEvent enum keeps the names and payloads in one place.
    match &event {
        AppEvent::HistoryChanged => {
            if let Err(e) = app.emit("history://changed", ()) {
                eprintln!("Failed to emit history change: {}", e);
            }
        }
        AppEvent::CapturePaused(paused) => {
            if let Err(e) = app.emit("capture://paused", paused) {
                eprintln!("Failed to emit capture state: {}", e);
            }
        }
        AppEvent::SettingsUpdated(settings) => {
            if let Err(e) = app.emit("settings://updated", settings) {
                eprintln!("Failed to emit settings update: {}", e);
            }
        }
        AppEvent::PopupChanged(view) => {
            if let Err(e) = app.emit("popup://view", view) {
                eprintln!("Failed to emit popup view: {}", e);
            }
        }
        AppEvent::Notice(message) => {
            if let Err(e) = app.emit("notice://show", message) {
                eprintln!("Failed to emit notice: {}", e);
            }
        }
    }
}
