//! History commands: snapshots, mutations and entry activation.

use tauri::{AppHandle, State};

use crate::core::clipboard::HistoryStore;
use crate::shared::emit::emit_event;
use crate::shared::errors::{CommandError, CommandResult};
use crate::shared::events::AppEvent;
use crate::shared::types::HistoryEntry;

use super::popup::perform_activation;

/// Current history snapshot, pinned first, newest first within each group.
#[tauri::command]
pub fn get_history(history: State<HistoryStore>) -> Vec<HistoryEntry> {
    history.entries()
}

/// Write the entry at `index` back to the clipboard.
#[tauri::command]
pub async fn activate_entry(
    app: AppHandle,
    index: usize,
    plain_text: bool,
    history: State<'_, HistoryStore>,
) -> CommandResult<()> {
    let entry = history.entries().get(index).cloned().ok_or_else(|| {
        CommandError::InvalidInput(format!("No history entry at index {}", index))
    })?;
    perform_activation(&app, &entry, plain_text).await;
    Ok(())
}

#[tauri::command]
pub fn toggle_pin(app: AppHandle, index: usize, history: State<HistoryStore>) {
    history.toggle_pin(index);
    emit_event(&app, AppEvent::HistoryChanged);
}

#[tauri::command]
pub fn remove_entry(app: AppHandle, index: usize, history: State<HistoryStore>) {
    history.remove(index);
    emit_event(&app, AppEvent::HistoryChanged);
}

#[tauri::command]
pub fn clear_history(app: AppHandle, history: State<HistoryStore>) {
    history.clear();
    emit_event(&app, AppEvent::HistoryChanged);
}

#[tauri::command]
pub fn clear_unpinned(app: AppHandle, history: State<HistoryStore>) {
    history.clear_unpinned();
    emit_event(&app, AppEvent::HistoryChanged);
}

#[tauri::command]
pub fn unpin_all(app: AppHandle, history: State<HistoryStore>) {
    history.unpin_all();
    emit_event(&app, AppEvent::HistoryChanged);
}
