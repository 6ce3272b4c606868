//! Popup interaction state machine and activation logic.
//!
//! The controller owns everything the popup frontend cannot decide for
//! itself: which entries are visible under the current query, where keyboard
//! focus sits, and what an activation writes back to the clipboard. The
//! visual tree is the frontend's problem; this module only hands it
//! `PopupView` snapshots.

use std::sync::atomic::Ordering;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{Local, TimeZone};

use crate::core::clipboard::history::HistoryStore;
use crate::core::clipboard::state::ClipboardState;
use crate::shared::errors::{CommandError, CommandResult};
use crate::shared::settings::AppSettings;
use crate::shared::types::{EntryKind, HistoryEntry, PopupFocus, PopupItem, PopupView};
use crate::system::selection::{ClipboardSource, Selection};

/// Longest single-line preview shown in the list.
pub const MAX_PREVIEW_CHARS: usize = 160;

/// Keys the popup reacts to while visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupKey {
    Up,
    Down,
    Tab,
    ShiftTab,
    Escape,
    Enter,
    ShiftEnter,
    TogglePin,
    Delete,
}

/// What a key press asks the caller to do next.
#[derive(Debug, Clone, PartialEq)]
pub enum PopupOutcome {
    /// Nothing changed.
    Ignored,
    /// View state changed; re-render.
    Updated,
    /// The popup hid itself.
    Hidden,
    /// Write the entry back to the clipboard, then hide.
    Activate {
        entry: HistoryEntry,
        plain_text: bool,
    },
}

/// Focus/navigation state machine over the filtered history list.
pub struct PopupController {
    history: HistoryStore,
    visible: bool,
    query: String,
    /// Indices into the live history ordering, one per visible row.
    visible_entries: Vec<usize>,
    focus: PopupFocus,
}

impl PopupController {
    pub fn new(history: HistoryStore) -> Self {
        Self {
            history,
            visible: false,
            query: String::new(),
            visible_entries: Vec::new(),
            focus: PopupFocus::Search,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Transition to visible, recompute the list and focus the first item
    /// (or the search field when the list is empty).
    pub fn show(&mut self) {
        self.visible = true;
        self.recompute();
        self.focus = if self.visible_entries.is_empty() {
            PopupFocus::Search
        } else {
            PopupFocus::Item(0)
        };
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Returns true when the popup ended up visible.
    pub fn toggle(&mut self) -> bool {
        if self.visible {
            self.hide();
        } else {
            self.show();
        }
        self.visible
    }

    /// Update the search query; focus stays in the search field while typing.
    pub fn set_query(&mut self, query: String) {
        self.query = query;
        self.recompute();
        self.focus = PopupFocus::Search;
    }

    /// Recompute after an external history mutation, clamping item focus.
    pub fn refresh(&mut self) {
        self.recompute();
        self.focus = match self.focus {
            PopupFocus::Item(_) if self.visible_entries.is_empty() => PopupFocus::Search,
            PopupFocus::Item(pos) => PopupFocus::Item(pos.min(self.visible_entries.len() - 1)),
            PopupFocus::Search => PopupFocus::Search,
        };
    }

    fn recompute(&mut self) {
        let query = self.query.trim().to_lowercase();
        let entries = self.history.entries();
        self.visible_entries = entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| {
                if query.is_empty() {
                    // Empty query shows everything, images included.
                    true
                } else {
                    entry
                        .text()
                        .map(|text| text.to_lowercase().contains(&query))
                        .unwrap_or(false)
                }
            })
            .map(|(index, _)| index)
            .collect();
    }

    /// Drive the keyboard contract; no-op while hidden.
    pub fn handle_key(&mut self, key: PopupKey) -> PopupOutcome {
        if !self.visible {
            return PopupOutcome::Ignored;
        }
        match key {
            PopupKey::Escape => {
                self.hide();
                PopupOutcome::Hidden
            }
            PopupKey::Up => self.move_focus(-1),
            PopupKey::Down => self.move_focus(1),
            PopupKey::Tab => {
                self.focus = if self.visible_entries.is_empty() {
                    PopupFocus::Search
                } else {
                    PopupFocus::Item(0)
                };
                PopupOutcome::Updated
            }
            PopupKey::ShiftTab => {
                self.focus = PopupFocus::Search;
                PopupOutcome::Updated
            }
            PopupKey::Enter | PopupKey::ShiftEnter => match self.focused_entry() {
                Some(entry) => PopupOutcome::Activate {
                    entry,
                    plain_text: key == PopupKey::ShiftEnter,
                },
                None => PopupOutcome::Ignored,
            },
            PopupKey::TogglePin => match self.focused_store_index() {
                Some(index) => {
                    self.history.toggle_pin(index);
                    self.refresh();
                    PopupOutcome::Updated
                }
                None => PopupOutcome::Ignored,
            },
            PopupKey::Delete => match self.focused_store_index() {
                Some(index) => {
                    self.history.remove(index);
                    self.refresh();
                    PopupOutcome::Updated
                }
                None => PopupOutcome::Ignored,
            },
        }
    }

    fn move_focus(&mut self, delta: i64) -> PopupOutcome {
        let count = self.visible_entries.len();
        match self.focus {
            PopupFocus::Search if delta > 0 && count > 0 => {
                self.focus = PopupFocus::Item(0);
                PopupOutcome::Updated
            }
            PopupFocus::Search => PopupOutcome::Ignored,
            PopupFocus::Item(_) if count == 0 => {
                self.focus = PopupFocus::Search;
                PopupOutcome::Updated
            }
            PopupFocus::Item(pos) => {
                let next = (pos as i64 + delta).clamp(0, count as i64 - 1) as usize;
                self.focus = PopupFocus::Item(next);
                PopupOutcome::Updated
            }
        }
    }

    fn focused_store_index(&self) -> Option<usize> {
        let PopupFocus::Item(pos) = self.focus else {
            return None;
        };
        self.visible_entries.get(pos).copied()
    }

    fn focused_entry(&self) -> Option<HistoryEntry> {
        let index = self.focused_store_index()?;
        self.history.entries().get(index).cloned()
    }

    /// Snapshot for the frontend renderer.
    pub fn view(&self) -> PopupView {
        let entries = self.history.entries();
        let items = self
            .visible_entries
            .iter()
            .filter_map(|&index| {
                entries.get(index).map(|entry| PopupItem {
                    index,
                    kind: if entry.is_text() {
                        EntryKind::Text
                    } else {
                        EntryKind::Image
                    },
                    preview: format_preview(entry),
                    meta: format_meta(entry),
                    pinned: entry.pinned(),
                    image_data: match entry {
                        HistoryEntry::Image { data, .. } => Some(data.clone()),
                        HistoryEntry::Text { .. } => None,
                    },
                })
            })
            .collect();
        PopupView {
            visible: self.visible,
            query: self.query.clone(),
            items,
            focus: self.focus,
        }
    }
}

/// Single-line preview, truncated for display.
pub fn format_preview(entry: &HistoryEntry) -> String {
    match entry {
        HistoryEntry::Image { .. } => "Image".to_string(),
        HistoryEntry::Text { text, .. } => {
            if text.chars().count() > MAX_PREVIEW_CHARS {
                let mut preview: String = text.chars().take(MAX_PREVIEW_CHARS - 3).collect();
                preview.push_str("...");
                preview
            } else {
                text.clone()
            }
        }
    }
}

/// Secondary line: pin state, image dimensions, or source app and time.
pub fn format_meta(entry: &HistoryEntry) -> String {
    if entry.pinned() {
        return "Pinned".to_string();
    }
    match entry {
        HistoryEntry::Image { width, height, .. } if *width > 0 && *height > 0 => {
            format!("{}×{}", width, height)
        }
        HistoryEntry::Image { .. } => "Image".to_string(),
        HistoryEntry::Text { ts, source, .. } => {
            let when = Local
                .timestamp_millis_opt(*ts)
                .single()
                .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default();
            match source.as_ref().and_then(|s| s.app_name.as_deref()) {
                Some(app) => format!("{} • {}", app, when),
                None => when,
            }
        }
    }
}

/// Write an activated entry back to the clipboard.
///
/// Returns an optional user-visible notice. Only a failed plain-text write is
/// an error; rich-content failures fall back to plain text silently. The
/// ghost-copy flag is raised first so the capture loop does not re-record
/// the write-back.
pub async fn write_entry_to_clipboard(
    entry: &HistoryEntry,
    plain_requested: bool,
    settings: &AppSettings,
    clipboard: &dyn ClipboardSource,
    state: &ClipboardState,
) -> CommandResult<Option<String>> {
    let plain = plain_requested || settings.paste_as_plain_text;
    state.ignore_next.store(true, Ordering::SeqCst);

    match entry {
        HistoryEntry::Image { data, .. } => {
            // Plain-text mode cannot apply to an image; say so but still
            // deliver the image.
            let notice = plain.then(|| "Cannot paste an image as plain text.".to_string());
            let bytes = BASE64
                .decode(data)
                .map_err(|e| CommandError::ClipboardError(format!("Invalid image payload: {}", e)))?;
            clipboard
                .write_mime(Selection::Clipboard, "image/png", &bytes)
                .await?;
            let _ = clipboard
                .write_mime(Selection::Primary, "image/png", &bytes)
                .await;
            Ok(notice)
        }
        HistoryEntry::Text {
            text, html, rtf, ..
        } => {
            let rich = if plain {
                None
            } else {
                html.as_deref()
                    .map(|h| ("text/html", h))
                    .or_else(|| rtf.as_deref().map(|r| ("text/rtf", r)))
            };
            match rich {
                Some((mime, body)) => {
                    if let Err(e) = clipboard
                        .write_mime(Selection::Clipboard, mime, body.as_bytes())
                        .await
                    {
                        eprintln!(
                            "[Popup] Rich write failed ({}), falling back to plain text",
                            e
                        );
                        clipboard.write_text(Selection::Clipboard, text).await?;
                    }
                }
                None => clipboard.write_text(Selection::Clipboard, text).await?,
            }
            // Plain text always lands in the primary selection too, for
            // middle-click compatibility.
            let _ = clipboard.write_text(Selection::Primary, text).await;
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::types::EntrySource;
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn store_with(texts: &[&str]) -> HistoryStore {
        let settings = AppSettings {
            persist_history: false,
            ..AppSettings::default()
        }
        .into_shared();
        let store = HistoryStore::at_path(settings, None);
        for text in texts {
            store.add_text(text, None, None, None);
        }
        store
    }

    fn visible_controller(texts: &[&str]) -> PopupController {
        let mut controller = PopupController::new(store_with(texts));
        controller.show();
        controller
    }

    #[test]
    fn show_focuses_first_item_or_search() {
        let controller = visible_controller(&["a", "b"]);
        assert_eq!(controller.view().focus, PopupFocus::Item(0));

        let empty = visible_controller(&[]);
        assert_eq!(empty.view().focus, PopupFocus::Search);
    }

    #[test]
    fn arrow_navigation_is_clamped() {
        let mut controller = visible_controller(&["a", "b", "c"]);
        assert_eq!(controller.handle_key(PopupKey::Up), PopupOutcome::Updated);
        assert_eq!(controller.view().focus, PopupFocus::Item(0));

        controller.handle_key(PopupKey::Down);
        controller.handle_key(PopupKey::Down);
        controller.handle_key(PopupKey::Down);
        assert_eq!(controller.view().focus, PopupFocus::Item(2));
    }

    #[test]
    fn tab_cycles_between_search_and_list() {
        let mut controller = visible_controller(&["a"]);
        controller.handle_key(PopupKey::ShiftTab);
        assert_eq!(controller.view().focus, PopupFocus::Search);

        controller.handle_key(PopupKey::Tab);
        assert_eq!(controller.view().focus, PopupFocus::Item(0));

        // Down from the search field enters the list at the top.
        controller.handle_key(PopupKey::ShiftTab);
        controller.handle_key(PopupKey::Down);
        assert_eq!(controller.view().focus, PopupFocus::Item(0));
    }

    #[test]
    fn escape_hides_and_keys_are_ignored_while_hidden() {
        let mut controller = visible_controller(&["a"]);
        assert_eq!(controller.handle_key(PopupKey::Escape), PopupOutcome::Hidden);
        assert!(!controller.is_visible());
        assert_eq!(controller.handle_key(PopupKey::Down), PopupOutcome::Ignored);
    }

    #[test]
    fn query_filters_text_entries_only() {
        let store = store_with(&["alpha", "beta"]);
        store.add_image("AAAA".into(), 1, 1, None, Some("h".into()));
        let mut controller = PopupController::new(store);
        controller.show();
        // Empty query: image plus both texts.
        assert_eq!(controller.view().items.len(), 3);

        controller.set_query("ALPH".to_string());
        let view = controller.view();
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].preview, "alpha");
        assert_eq!(view.focus, PopupFocus::Search);

        controller.set_query(String::new());
        assert_eq!(controller.view().items.len(), 3);
    }

    #[test]
    fn enter_requests_activation_with_plain_modifier() {
        let mut controller = visible_controller(&["a", "b"]);
        match controller.handle_key(PopupKey::Enter) {
            PopupOutcome::Activate { entry, plain_text } => {
                assert_eq!(entry.text(), Some("b"));
                assert!(!plain_text);
            }
            other => panic!("expected activation, got {:?}", other),
        }
        match controller.handle_key(PopupKey::ShiftEnter) {
            PopupOutcome::Activate { plain_text, .. } => assert!(plain_text),
            other => panic!("expected activation, got {:?}", other),
        }
    }

    #[test]
    fn enter_in_search_field_is_ignored() {
        let mut controller = visible_controller(&["a"]);
        controller.handle_key(PopupKey::ShiftTab);
        assert_eq!(controller.handle_key(PopupKey::Enter), PopupOutcome::Ignored);
    }

    #[test]
    fn pin_key_toggles_focused_entry() {
        let mut controller = visible_controller(&["a", "b"]);
        controller.handle_key(PopupKey::TogglePin);
        let view = controller.view();
        assert!(view.items[0].pinned);
        assert_eq!(view.items[0].meta, "Pinned");
    }

    #[test]
    fn delete_key_removes_focused_entry_and_clamps_focus() {
        let mut controller = visible_controller(&["a"]);
        assert_eq!(controller.handle_key(PopupKey::Delete), PopupOutcome::Updated);
        let view = controller.view();
        assert!(view.items.is_empty());
        assert_eq!(view.focus, PopupFocus::Search);
    }

    #[test]
    fn preview_truncates_long_text() {
        let long = "x".repeat(200);
        let entry = HistoryEntry::new_text(long, None, None, None);
        let preview = format_preview(&entry);
        assert_eq!(preview.chars().count(), MAX_PREVIEW_CHARS);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn meta_shows_source_app_and_dimensions() {
        let entry = HistoryEntry::new_text(
            "hi".into(),
            None,
            None,
            Some(EntrySource {
                app_name: Some("Firefox".into()),
                app_id: None,
                wm_class: None,
            }),
        );
        assert!(format_meta(&entry).starts_with("Firefox • "));

        let image = HistoryEntry::new_image("AAAA".into(), "h".into(), 640, 480, None);
        assert_eq!(format_meta(&image), "640×480");
    }

    // --- activation ---

    #[derive(Default)]
    struct RecordingClipboard {
        /// (selection, mime-or-"text", payload)
        writes: Mutex<Vec<(Selection, String, Vec<u8>)>>,
        fail_rich: bool,
    }

    impl RecordingClipboard {
        fn writes(&self) -> Vec<(Selection, String, Vec<u8>)> {
            self.writes.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ClipboardSource for RecordingClipboard {
        async fn read_text(&self, _selection: Selection) -> CommandResult<Option<String>> {
            Ok(None)
        }

        async fn read_mime(
            &self,
            _selection: Selection,
            _mime: &str,
        ) -> CommandResult<Option<Vec<u8>>> {
            Ok(None)
        }

        async fn write_text(&self, selection: Selection, text: &str) -> CommandResult<()> {
            self.writes.lock().unwrap().push((
                selection,
                "text".to_string(),
                text.as_bytes().to_vec(),
            ));
            Ok(())
        }

        async fn write_mime(
            &self,
            selection: Selection,
            mime: &str,
            data: &[u8],
        ) -> CommandResult<()> {
            if self.fail_rich && mime.starts_with("text/") {
                return Err(CommandError::ClipboardError("no rich target".to_string()));
            }
            self.writes
                .lock()
                .unwrap()
                .push((selection, mime.to_string(), data.to_vec()));
            Ok(())
        }
    }

    fn plain_settings() -> AppSettings {
        AppSettings {
            persist_history: false,
            ..AppSettings::default()
        }
    }

    #[tokio::test]
    async fn rich_text_goes_to_clipboard_plain_to_primary() {
        let entry = HistoryEntry::new_text(
            "hello".into(),
            Some("<b>hello</b>".into()),
            None,
            None,
        );
        let clipboard = RecordingClipboard::default();
        let state = ClipboardState::new();

        let notice =
            write_entry_to_clipboard(&entry, false, &plain_settings(), &clipboard, &state)
                .await
                .unwrap();
        assert!(notice.is_none());
        assert!(state.ignore_next.load(Ordering::SeqCst));

        let writes = clipboard.writes();
        assert_eq!(writes.len(), 2);
        assert_eq!(
            (writes[0].0, writes[0].1.as_str()),
            (Selection::Clipboard, "text/html")
        );
        assert_eq!(
            (writes[1].0, writes[1].1.as_str()),
            (Selection::Primary, "text")
        );
    }

    #[tokio::test]
    async fn failed_rich_write_falls_back_to_plain_text() {
        let entry =
            HistoryEntry::new_text("hello".into(), None, Some(r"{\rtf1 hello}".into()), None);
        let clipboard = RecordingClipboard {
            fail_rich: true,
            ..RecordingClipboard::default()
        };
        let state = ClipboardState::new();

        write_entry_to_clipboard(&entry, false, &plain_settings(), &clipboard, &state)
            .await
            .unwrap();
        let writes = clipboard.writes();
        assert_eq!(writes[0].1, "text");
        assert_eq!(writes[0].2, b"hello");
    }

    #[tokio::test]
    async fn shift_or_setting_forces_plain_text() {
        let entry = HistoryEntry::new_text(
            "hello".into(),
            Some("<b>hello</b>".into()),
            None,
            None,
        );
        let clipboard = RecordingClipboard::default();
        let state = ClipboardState::new();

        let mut settings = plain_settings();
        settings.paste_as_plain_text = true;
        write_entry_to_clipboard(&entry, false, &settings, &clipboard, &state)
            .await
            .unwrap();
        assert!(clipboard.writes().iter().all(|(_, kind, _)| kind == "text"));
    }

    #[tokio::test]
    async fn image_in_plain_mode_notifies_but_still_writes() {
        let png = BASE64.encode(b"fake png bytes");
        let entry = HistoryEntry::new_image(png, "h".into(), 1, 1, None);
        let clipboard = RecordingClipboard::default();
        let state = ClipboardState::new();

        let notice = write_entry_to_clipboard(&entry, true, &plain_settings(), &clipboard, &state)
            .await
            .unwrap();
        assert_eq!(
            notice.as_deref(),
            Some("Cannot paste an image as plain text.")
        );
        assert!(clipboard
            .writes()
            .iter()
            .any(|(sel, mime, _)| *sel == Selection::Clipboard && mime == "image/png"));
    }
}
