//! Clipboard capture loop.
//!
//! The OS clipboard offers no change notifications, so a timer-driven poll
//! turns it into a stream of discrete "new content" events. Change detection
//! is an explicit fingerprint comparison per selection per tick: a stale or
//! duplicate completion re-checks the last-seen fingerprint and becomes a
//! harmless no-op, never a race. Every read or decode failure is swallowed
//! and retried naturally on the next tick.

use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use tauri::AppHandle;
use tokio::time::Duration;

use crate::core::clipboard::filter;
use crate::core::clipboard::history::HistoryStore;
use crate::core::clipboard::state::ClipboardState;
use crate::shared::emit::emit_event;
use crate::shared::events::AppEvent;
use crate::shared::settings::{self, AppSettings, SharedSettings};
use crate::shared::types::EntrySource;
use crate::system::selection::{ClipboardSource, Selection, SystemClipboard};
use crate::system::window::{self, WindowIdentity};

/// Polls the clipboard selections and forwards genuinely-new content to the
/// history store.
pub struct ClipboardMonitor {
    settings: SharedSettings,
    history: HistoryStore,
    state: ClipboardState,
    /// Last-seen `"{selection}:{text}"` fingerprint per selection.
    last_text: Arc<Mutex<HashMap<Selection, String>>>,
    /// Last-seen `"img:{md5}"` fingerprint.
    last_image: Arc<Mutex<Option<String>>>,
}

impl ClipboardMonitor {
    pub fn new(settings: SharedSettings, history: HistoryStore, state: ClipboardState) -> Self {
        Self {
            settings,
            history,
            state,
            last_text: Arc::new(Mutex::new(HashMap::new())),
            last_image: Arc::new(Mutex::new(None)),
        }
    }

    /// Get a clone sharing the same fingerprint state.
    pub fn clone_arc(&self) -> Self {
        Self {
            settings: Arc::clone(&self.settings),
            history: self.history.clone_arc(),
            state: self.state.clone(),
            last_text: Arc::clone(&self.last_text),
            last_image: Arc::clone(&self.last_image),
        }
    }

    /// Spawn the polling task on the async runtime.
    pub fn start(&self, app: AppHandle) {
        let monitor = self.clone_arc();
        tauri::async_runtime::spawn(async move {
            println!("[ClipboardMonitor] Started polling");
            let source = SystemClipboard::new(app.clone());
            loop {
                let settings = settings::snapshot(&monitor.settings);
                if settings.pause_capture {
                    tokio::time::sleep(Duration::from_millis(settings.poll_interval_ms)).await;
                    continue;
                }
                let focused = window::focused_window().await;
                if monitor.tick(&source, focused.as_ref()).await {
                    emit_event(&app, AppEvent::HistoryChanged);
                }
                tokio::time::sleep(Duration::from_millis(settings.poll_interval_ms)).await;
            }
        });
    }

    /// One poll cycle. Returns true when at least one entry was recorded.
    pub async fn tick(
        &self,
        source: &dyn ClipboardSource,
        focused: Option<&WindowIdentity>,
    ) -> bool {
        let settings = settings::snapshot(&self.settings);
        if settings.pause_capture || filter::should_skip_capture(&settings, focused) {
            return false;
        }

        let mut recorded = self
            .poll_text(source, Selection::Clipboard, &settings, focused)
            .await;
        if settings.track_primary {
            recorded |= self
                .poll_text(source, Selection::Primary, &settings, focused)
                .await;
        }
        recorded |= self.poll_image(source, &settings, focused).await;
        recorded
    }

    /// Poll one text selection.
    ///
    /// Both selections maintain fingerprints, but only the system clipboard
    /// is enriched and forwarded; the primary selection is tracked so a
    /// middle-click buffer change is noticed without being recorded twice.
    async fn poll_text(
        &self,
        source: &dyn ClipboardSource,
        selection: Selection,
        settings: &AppSettings,
        focused: Option<&WindowIdentity>,
    ) -> bool {
        let text = match source.read_text(selection).await {
            Ok(Some(text)) if !text.is_empty() => text,
            Ok(_) | Err(_) => return false,
        };

        let fingerprint = format!("{}:{}", selection, text);
        {
            let mut last = lock_recovering(&self.last_text);
            if last.get(&selection) == Some(&fingerprint) {
                return false;
            }
            last.insert(selection, fingerprint);
        }

        if selection != Selection::Clipboard {
            return false;
        }

        // A change we caused ourselves (activation write-back) is consumed
        // here and never recorded.
        if self.state.ignore_next.swap(false, Ordering::SeqCst) {
            println!("[ClipboardMonitor] Ignored ghost copy from activation");
            return false;
        }

        let html = read_rich(source, selection, "text/html", settings.max_rich_bytes).await;
        let rtf = read_rich(source, selection, "text/rtf", settings.max_rich_bytes).await;
        self.history
            .add_text(&text, focused.map(EntrySource::from), html, rtf)
    }

    /// Poll the system clipboard for a PNG payload.
    async fn poll_image(
        &self,
        source: &dyn ClipboardSource,
        settings: &AppSettings,
        focused: Option<&WindowIdentity>,
    ) -> bool {
        let bytes = match source.read_mime(Selection::Clipboard, "image/png").await {
            Ok(Some(bytes)) => bytes,
            Ok(None) | Err(_) => return false,
        };
        if bytes.is_empty() || bytes.len() > settings.max_image_bytes {
            return false;
        }

        let hash = format!("{:x}", md5::compute(&bytes));
        let fingerprint = format!("img:{}", hash);
        {
            let mut last = lock_recovering(&self.last_image);
            if last.as_ref() == Some(&fingerprint) {
                return false;
            }
            *last = Some(fingerprint);
        }

        if self.state.ignore_next.swap(false, Ordering::SeqCst) {
            println!("[ClipboardMonitor] Ignored ghost image from activation");
            return false;
        }

        // Decode only to learn the pixel dimensions; the stored payload stays
        // the original PNG bytes.
        let image = match tauri::image::Image::from_bytes(&bytes) {
            Ok(image) => image,
            Err(_) => return false,
        };
        let (width, height) = (image.width(), image.height());
        let data = BASE64.encode(&bytes);
        self.history
            .add_image(data, width, height, focused.map(EntrySource::from), Some(hash))
    }
}

/// Fetch a rich representation, dropping oversized payloads whole.
async fn read_rich(
    source: &dyn ClipboardSource,
    selection: Selection,
    mime: &str,
    cap: usize,
) -> Option<String> {
    let bytes = source.read_mime(selection, mime).await.ok().flatten()?;
    if bytes.is_empty() || bytes.len() > cap {
        return None;
    }
    String::from_utf8(bytes).ok()
}

fn lock_recovering<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            eprintln!("[ClipboardMonitor] Mutex poisoned, recovering...");
            poisoned.into_inner()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::errors::CommandResult;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    /// Canonical 1x1 transparent PNG.
    const PNG_1X1_B64: &str =
        "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8BQDwAEhQGAhKmMIQAAAABJRU5ErkJggg==";

    #[derive(Default)]
    struct MockClipboard {
        text: Mutex<HashMap<Selection, String>>,
        mime: Mutex<HashMap<(Selection, String), Vec<u8>>>,
        reads: AtomicUsize,
    }

    impl MockClipboard {
        fn set_text(&self, selection: Selection, text: &str) {
            self.text
                .lock()
                .unwrap()
                .insert(selection, text.to_string());
        }

        fn set_mime(&self, selection: Selection, mime: &str, bytes: Vec<u8>) {
            self.mime
                .lock()
                .unwrap()
                .insert((selection, mime.to_string()), bytes);
        }

        fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ClipboardSource for MockClipboard {
        async fn read_text(&self, selection: Selection) -> CommandResult<Option<String>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(self.text.lock().unwrap().get(&selection).cloned())
        }

        async fn read_mime(
            &self,
            selection: Selection,
            mime: &str,
        ) -> CommandResult<Option<Vec<u8>>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .mime
                .lock()
                .unwrap()
                .get(&(selection, mime.to_string()))
                .cloned())
        }

        async fn write_text(&self, selection: Selection, text: &str) -> CommandResult<()> {
            self.set_text(selection, text);
            Ok(())
        }

        async fn write_mime(
            &self,
            selection: Selection,
            mime: &str,
            data: &[u8],
        ) -> CommandResult<()> {
            self.set_mime(selection, mime, data.to_vec());
            Ok(())
        }
    }

    fn monitor_with(settings: AppSettings) -> ClipboardMonitor {
        let shared = settings.into_shared();
        let history = HistoryStore::at_path(Arc::clone(&shared), None);
        ClipboardMonitor::new(shared, history, ClipboardState::new())
    }

    fn base_settings() -> AppSettings {
        AppSettings {
            persist_history: false,
            ..AppSettings::default()
        }
    }

    fn history_of(monitor: &ClipboardMonitor) -> Vec<crate::shared::types::HistoryEntry> {
        monitor.history.entries()
    }

    #[tokio::test]
    async fn unchanged_text_is_captured_once() {
        let monitor = monitor_with(base_settings());
        let clipboard = MockClipboard::default();
        clipboard.set_text(Selection::Clipboard, "hello");

        assert!(monitor.tick(&clipboard, None).await);
        assert!(!monitor.tick(&clipboard, None).await);
        assert_eq!(history_of(&monitor).len(), 1);
    }

    #[tokio::test]
    async fn changed_text_is_captured_again() {
        let monitor = monitor_with(base_settings());
        let clipboard = MockClipboard::default();
        clipboard.set_text(Selection::Clipboard, "first");
        monitor.tick(&clipboard, None).await;
        clipboard.set_text(Selection::Clipboard, "second");
        monitor.tick(&clipboard, None).await;
        assert_eq!(history_of(&monitor).len(), 2);
    }

    #[tokio::test]
    async fn paused_capture_performs_no_reads() {
        let mut settings = base_settings();
        settings.pause_capture = true;
        let monitor = monitor_with(settings);
        let clipboard = MockClipboard::default();
        clipboard.set_text(Selection::Clipboard, "hello");

        assert!(!monitor.tick(&clipboard, None).await);
        assert_eq!(clipboard.reads(), 0);
    }

    #[tokio::test]
    async fn secure_context_performs_no_reads() {
        let monitor = monitor_with(base_settings());
        let clipboard = MockClipboard::default();
        clipboard.set_text(Selection::Clipboard, "hunter2");

        let focused = WindowIdentity {
            wm_class: Some("keepassxc".to_string()),
            ..WindowIdentity::default()
        };
        assert!(!monitor.tick(&clipboard, Some(&focused)).await);
        assert_eq!(clipboard.reads(), 0);
        assert!(history_of(&monitor).is_empty());
    }

    #[tokio::test]
    async fn primary_selection_is_fingerprinted_but_not_recorded() {
        let mut settings = base_settings();
        settings.track_primary = true;
        let monitor = monitor_with(settings);
        let clipboard = MockClipboard::default();
        clipboard.set_text(Selection::Primary, "middle click");

        assert!(!monitor.tick(&clipboard, None).await);
        assert!(history_of(&monitor).is_empty());

        // The same text on the system clipboard is still new content.
        clipboard.set_text(Selection::Clipboard, "middle click");
        assert!(monitor.tick(&clipboard, None).await);
        assert_eq!(history_of(&monitor).len(), 1);
    }

    #[tokio::test]
    async fn rich_content_within_cap_is_attached() {
        let monitor = monitor_with(base_settings());
        let clipboard = MockClipboard::default();
        clipboard.set_text(Selection::Clipboard, "styled");
        clipboard.set_mime(Selection::Clipboard, "text/html", b"<b>styled</b>".to_vec());

        monitor.tick(&clipboard, None).await;
        let entries = history_of(&monitor);
        assert!(matches!(&entries[0], crate::shared::types::HistoryEntry::Text { html, .. }
            if html.as_deref() == Some("<b>styled</b>")));
    }

    #[tokio::test]
    async fn oversized_rich_payload_is_dropped_but_text_kept() {
        let mut settings = base_settings();
        settings.max_rich_bytes = 4;
        let monitor = monitor_with(settings);
        let clipboard = MockClipboard::default();
        clipboard.set_text(Selection::Clipboard, "styled");
        clipboard.set_mime(Selection::Clipboard, "text/html", b"<b>styled</b>".to_vec());

        monitor.tick(&clipboard, None).await;
        let entries = history_of(&monitor);
        assert_eq!(entries.len(), 1);
        assert!(matches!(&entries[0], crate::shared::types::HistoryEntry::Text { html, .. }
            if html.is_none()));
    }

    #[tokio::test]
    async fn png_payload_is_captured_with_dimensions() {
        let monitor = monitor_with(base_settings());
        let clipboard = MockClipboard::default();
        let png = BASE64.decode(PNG_1X1_B64).unwrap();
        clipboard.set_mime(Selection::Clipboard, "image/png", png.clone());

        assert!(monitor.tick(&clipboard, None).await);
        // Unchanged image is not recaptured.
        assert!(!monitor.tick(&clipboard, None).await);

        let entries = history_of(&monitor);
        assert_eq!(entries.len(), 1);
        assert!(matches!(&entries[0], crate::shared::types::HistoryEntry::Image { width, height, hash, .. }
            if *width == 1 && *height == 1 && !hash.is_empty()));
    }

    #[tokio::test]
    async fn empty_and_oversized_images_are_ignored() {
        let mut settings = base_settings();
        settings.max_image_bytes = 16;
        let monitor = monitor_with(settings);
        let clipboard = MockClipboard::default();

        clipboard.set_mime(Selection::Clipboard, "image/png", Vec::new());
        assert!(!monitor.tick(&clipboard, None).await);

        let png = BASE64.decode(PNG_1X1_B64).unwrap();
        assert!(png.len() > 16);
        clipboard.set_mime(Selection::Clipboard, "image/png", png);
        assert!(!monitor.tick(&clipboard, None).await);
        assert!(history_of(&monitor).is_empty());
    }

    #[tokio::test]
    async fn ghost_copy_from_activation_is_not_recorded() {
        let monitor = monitor_with(base_settings());
        let clipboard = MockClipboard::default();
        clipboard.set_text(Selection::Clipboard, "written back");
        monitor.state.ignore_next.store(true, Ordering::SeqCst);

        assert!(!monitor.tick(&clipboard, None).await);
        assert!(history_of(&monitor).is_empty());
        assert!(!monitor.state.ignore_next.load(Ordering::SeqCst));

        // A later genuine change is captured normally.
        clipboard.set_text(Selection::Clipboard, "user copy");
        assert!(monitor.tick(&clipboard, None).await);
        assert_eq!(history_of(&monitor).len(), 1);
    }
}
