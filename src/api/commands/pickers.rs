//! Picker commands: character tables, emoji recents and GIF search.

use std::sync::atomic::Ordering;
use std::sync::Mutex;

use tauri::{AppHandle, Manager, State};

use crate::core::clipboard::{ClipboardState, HistoryStore};
use crate::core::pickers::{self, PickerMode};
use crate::core::popup::PopupController;
use crate::core::gif;
use crate::shared::emit::emit_event;
use crate::shared::errors::CommandResult;
use crate::shared::events::AppEvent;
use crate::shared::settings::{snapshot, update, SharedSettings};
use crate::shared::types::{EntrySource, GifResult, PickerCategory};
use crate::system::selection::{ClipboardSource, Selection, SystemClipboard};

use super::popup::lock_popup;

/// Category tabs for one picker mode; emoji gets a Recents tab up front.
#[tauri::command]
pub fn get_picker_categories(
    mode: PickerMode,
    settings: State<SharedSettings>,
) -> Vec<PickerCategory> {
    let mut categories = pickers::categories(mode);
    if mode == PickerMode::Emoji {
        let recents = snapshot(settings.inner()).emoji_recents;
        if !recents.is_empty() {
            categories.insert(
                0,
                PickerCategory {
                    id: "Recents".to_string(),
                    label: "Recents".to_string(),
                    items: recents,
                },
            );
        }
    }
    categories
}

#[tauri::command]
pub fn search_picker(mode: PickerMode, query: String) -> Vec<PickerCategory> {
    pickers::search(mode, &query)
}

/// Copy a picked character: it enters history like any capture and lands on
/// both selections, then the popup closes.
#[tauri::command]
pub async fn copy_picker_item(
    app: AppHandle,
    mode: PickerMode,
    item: String,
    history: State<'_, HistoryStore>,
    settings: State<'_, SharedSettings>,
) -> CommandResult<()> {
    let label = match mode {
        PickerMode::Emoji => "Emoji",
        PickerMode::Kaomoji => "Kaomoji",
        PickerMode::Symbols => "Symbols",
    };
    let source = EntrySource {
        app_name: Some(label.to_string()),
        app_id: Some(label.to_lowercase()),
        wm_class: Some(label.to_lowercase()),
    };
    history.add_text(&item, Some(source), None, None);
    emit_event(&app, AppEvent::HistoryChanged);

    if mode == PickerMode::Emoji {
        let updated = update(settings.inner(), |s| {
            pickers::record_recent(&mut s.emoji_recents, &item)
        });
        if let Err(e) = updated.save() {
            // Persistence failure is non-fatal; recents just reset next run.
            eprintln!("[Pickers] Failed to persist emoji recents: {}", e);
        }
    }

    write_and_close(&app, &item).await
}

#[tauri::command]
pub async fn search_gifs(
    query: String,
    settings: State<'_, SharedSettings>,
) -> CommandResult<Vec<GifResult>> {
    let api_key = snapshot(settings.inner()).tenor_api_key;
    gif::search_gifs(&api_key, &query).await
}

/// Copy a GIF result's URL; most applications accept a URL paste.
#[tauri::command]
pub async fn copy_gif_url(
    app: AppHandle,
    url: String,
    history: State<'_, HistoryStore>,
) -> CommandResult<()> {
    let source = EntrySource {
        app_name: Some("GIF".to_string()),
        app_id: Some("gif".to_string()),
        wm_class: Some("gif".to_string()),
    };
    history.add_text(&url, Some(source), None, None);
    emit_event(&app, AppEvent::HistoryChanged);
    emit_event(&app, AppEvent::Notice("GIF URL copied to clipboard".to_string()));
    write_and_close(&app, &url).await
}

async fn write_and_close(app: &AppHandle, text: &str) -> CommandResult<()> {
    let clip_state = app.state::<ClipboardState>();
    clip_state.ignore_next.store(true, Ordering::SeqCst);

    let clipboard = SystemClipboard::new(app.clone());
    clipboard.write_text(Selection::Clipboard, text).await?;
    let _ = clipboard.write_text(Selection::Primary, text).await;

    {
        let popup = app.state::<Mutex<PopupController>>();
        lock_popup(&popup).hide();
    }
    crate::hide_popup_window(app);
    Ok(())
}
