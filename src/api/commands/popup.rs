//! Popup commands: the frontend drives the state machine through these and
//! renders whatever `PopupView` comes back.

use std::sync::{Mutex, MutexGuard};

use tauri::{AppHandle, Manager, State};

use crate::core::clipboard::ClipboardState;
use crate::core::popup::{self, PopupController, PopupKey, PopupOutcome};
use crate::shared::emit::emit_event;
use crate::shared::errors::CommandResult;
use crate::shared::events::AppEvent;
use crate::shared::settings::{snapshot, SharedSettings};
use crate::shared::types::{HistoryEntry, PopupView};
use crate::system::selection::SystemClipboard;

pub(crate) fn lock_popup(popup: &Mutex<PopupController>) -> MutexGuard<'_, PopupController> {
    match popup.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            eprintln!("[Popup] Mutex poisoned, recovering...");
            poisoned.into_inner()
        }
    }
}

/// Current popup state for rendering.
#[tauri::command]
pub fn popup_view(popup: State<Mutex<PopupController>>) -> PopupView {
    lock_popup(&popup).view()
}

/// Hide the popup (close button, click outside the popup bounds).
#[tauri::command]
pub fn popup_hide(app: AppHandle, popup: State<Mutex<PopupController>>) -> PopupView {
    let view = {
        let mut controller = lock_popup(&popup);
        controller.hide();
        controller.view()
    };
    crate::hide_popup_window(&app);
    view
}

/// Update the search query and return the re-filtered view.
#[tauri::command]
pub fn popup_set_query(query: String, popup: State<Mutex<PopupController>>) -> PopupView {
    let mut controller = lock_popup(&popup);
    controller.set_query(query);
    controller.view()
}

/// Feed one key press through the popup keyboard contract.
#[tauri::command]
pub async fn popup_key(
    app: AppHandle,
    key: String,
    shift: bool,
    ctrl: bool,
    popup: State<'_, Mutex<PopupController>>,
) -> CommandResult<PopupView> {
    let Some(key) = parse_key(&key, shift, ctrl) else {
        return Ok(lock_popup(&popup).view());
    };
    let outcome = lock_popup(&popup).handle_key(key);
    match outcome {
        PopupOutcome::Activate { entry, plain_text } => {
            perform_activation(&app, &entry, plain_text).await;
        }
        PopupOutcome::Hidden => crate::hide_popup_window(&app),
        PopupOutcome::Updated | PopupOutcome::Ignored => {}
    }
    Ok(lock_popup(&popup).view())
}

/// Map a DOM key name plus modifiers onto the popup keyboard contract.
fn parse_key(key: &str, shift: bool, ctrl: bool) -> Option<PopupKey> {
    match key {
        "ArrowUp" | "Up" => Some(PopupKey::Up),
        "ArrowDown" | "Down" => Some(PopupKey::Down),
        "Tab" if shift => Some(PopupKey::ShiftTab),
        "Tab" => Some(PopupKey::Tab),
        "Escape" => Some(PopupKey::Escape),
        "Enter" if shift => Some(PopupKey::ShiftEnter),
        "Enter" => Some(PopupKey::Enter),
        "Delete" => Some(PopupKey::Delete),
        "p" | "P" if ctrl => Some(PopupKey::TogglePin),
        _ => None,
    }
}

/// Write an entry to the clipboard, surface failures as a notice, close the
/// popup and optionally auto-paste.
pub(crate) async fn perform_activation(app: &AppHandle, entry: &HistoryEntry, plain_text: bool) {
    let settings = snapshot(app.state::<SharedSettings>().inner());
    let clip_state = app.state::<ClipboardState>();
    let clipboard = SystemClipboard::new(app.clone());

    match popup::write_entry_to_clipboard(
        entry,
        plain_text,
        &settings,
        &clipboard,
        clip_state.inner(),
    )
    .await
    {
        Ok(Some(notice)) => emit_event(app, AppEvent::Notice(notice)),
        Ok(None) => {}
        Err(e) => emit_event(
            app,
            AppEvent::Notice(format!("Failed to write to clipboard: {}", e)),
        ),
    }

    // The popup always closes after activation, even on failure.
    {
        let popup = app.state::<Mutex<PopupController>>();
        lock_popup(&popup).hide();
    }
    crate::hide_popup_window(app);

    if settings.auto_paste {
        if let Err(e) = crate::system::paste::auto_paste().await {
            emit_event(app, AppEvent::Notice(e.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_names_map_onto_the_keyboard_contract() {
        assert_eq!(parse_key("ArrowDown", false, false), Some(PopupKey::Down));
        assert_eq!(parse_key("Tab", true, false), Some(PopupKey::ShiftTab));
        assert_eq!(parse_key("Enter", false, false), Some(PopupKey::Enter));
        assert_eq!(parse_key("Enter", true, false), Some(PopupKey::ShiftEnter));
        assert_eq!(parse_key("p", false, true), Some(PopupKey::TogglePin));
        assert_eq!(parse_key("p", false, false), None);
        assert_eq!(parse_key("F5", false, false), None);
    }
}
