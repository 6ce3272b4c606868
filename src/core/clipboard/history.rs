//! Authoritative clipboard history: dedup, pinning, pruning, persistence.
//!
//! The store owns the in-memory entry collection and mirrors it to a JSON
//! document in the cache directory after every mutation. The file is a
//! single-writer resource accessed by whole-file replace; a failed write
//! costs durability, never correctness.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use directories::ProjectDirs;
use regex::Regex;

use crate::shared::settings::{self, SharedSettings};
use crate::shared::types::{EntrySource, HistoryEntry};

static WHITESPACE_RUN: OnceLock<Regex> = OnceLock::new();

fn whitespace_run() -> &'static Regex {
    WHITESPACE_RUN.get_or_init(|| Regex::new(r"\s+").expect("Invalid whitespace regex"))
}

/// Collapse internal whitespace runs to single spaces and trim the ends.
pub fn normalize_text(text: &str) -> String {
    whitespace_run().replace_all(text.trim(), " ").into_owned()
}

/// Clipboard history with JSON-file persistence.
pub struct HistoryStore {
    entries: Arc<Mutex<Vec<HistoryEntry>>>,
    settings: SharedSettings,
    /// Absent when no cache directory could be resolved; the store then
    /// behaves as in-memory only.
    path: Option<PathBuf>,
}

impl HistoryStore {
    /// Create a store at the default cache location, loading persisted
    /// history when persistence is enabled.
    pub fn new(settings: SharedSettings) -> Self {
        let path = ProjectDirs::from("com", "clipboardpopup", "clipboard-popup")
            .map(|dirs| dirs.cache_dir().join("history.json"));
        if path.is_none() {
            eprintln!("[HistoryStore] No cache directory available; history will not persist");
        }
        Self::at_path(settings, path)
    }

    /// Create a store persisting to an explicit path.
    pub fn at_path(settings: SharedSettings, path: Option<PathBuf>) -> Self {
        let store = Self {
            entries: Arc::new(Mutex::new(Vec::new())),
            settings,
            path,
        };
        let loaded = store.load_from_disk();
        if !loaded.is_empty() {
            println!("[HistoryStore] Loaded {} persisted entries", loaded.len());
            *store.lock_entries() = loaded;
        }
        store
    }

    /// Get a clone sharing the same underlying collection.
    pub fn clone_arc(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            settings: Arc::clone(&self.settings),
            path: self.path.clone(),
        }
    }

    fn lock_entries(&self) -> MutexGuard<'_, Vec<HistoryEntry>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                eprintln!("[HistoryStore] Mutex poisoned, recovering...");
                poisoned.into_inner()
            }
        }
    }

    /// Snapshot of the current entries, front = newest unpinned position.
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.lock_entries().clone()
    }

    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_entries().is_empty()
    }

    /// Record a text capture.
    ///
    /// Empty and whitespace-only text is rejected. A case-insensitive
    /// duplicate is collapsed: the earlier entry's exact text survives, but
    /// it re-enters at the front, unpinned, with a fresh timestamp. Pin
    /// state is deliberately not preserved across a duplicate recapture.
    pub fn add_text(
        &self,
        text: &str,
        source: Option<EntrySource>,
        html: Option<String>,
        rtf: Option<String>,
    ) -> bool {
        let normalized = normalize_text(text);
        if normalized.is_empty() {
            return false;
        }
        let key = normalized.to_lowercase();

        let mut entries = self.lock_entries();
        let mut kept_text = normalized;
        entries.retain(|entry| match entry {
            HistoryEntry::Text { text, .. } if text.to_lowercase() == key => {
                kept_text = text.clone();
                false
            }
            _ => true,
        });
        entries.insert(0, HistoryEntry::new_text(kept_text, html, rtf, source));
        self.prune(&mut entries);
        self.save_to_disk(&entries);
        true
    }

    /// Record an image capture.
    ///
    /// `data` is the base64 PNG payload; `hash` is its content digest when
    /// the caller computed one, else the raw payload doubles as the key.
    pub fn add_image(
        &self,
        data: String,
        width: u32,
        height: u32,
        source: Option<EntrySource>,
        hash: Option<String>,
    ) -> bool {
        if data.is_empty() {
            return false;
        }
        let key = hash.unwrap_or_else(|| data.clone());

        let mut entries = self.lock_entries();
        entries.retain(|entry| match entry {
            HistoryEntry::Image {
                hash: existing_hash,
                data: existing_data,
                ..
            } => existing_hash != &key && existing_data != &data,
            _ => true,
        });
        entries.insert(0, HistoryEntry::new_image(data, key, width, height, source));
        self.prune(&mut entries);
        self.save_to_disk(&entries);
        true
    }

    /// Flip the pin flag at `index`; out of range is a silent no-op.
    ///
    /// Does not touch the timestamp or the entry's position.
    pub fn toggle_pin(&self, index: usize) {
        let mut entries = self.lock_entries();
        if let Some(entry) = entries.get_mut(index) {
            let pinned = entry.pinned();
            entry.set_pinned(!pinned);
            self.save_to_disk(&entries);
        }
    }

    /// Remove the entry at `index`; out of range is a silent no-op.
    pub fn remove(&self, index: usize) {
        let mut entries = self.lock_entries();
        if index < entries.len() {
            entries.remove(index);
            self.save_to_disk(&entries);
        }
    }

    pub fn clear(&self) {
        let mut entries = self.lock_entries();
        entries.clear();
        self.save_to_disk(&entries);
    }

    pub fn clear_unpinned(&self) {
        let mut entries = self.lock_entries();
        entries.retain(|entry| entry.pinned());
        self.save_to_disk(&entries);
    }

    pub fn unpin_all(&self) {
        let mut entries = self.lock_entries();
        for entry in entries.iter_mut() {
            entry.set_pinned(false);
        }
        self.save_to_disk(&entries);
    }

    /// Enforce the size budget after an insert.
    ///
    /// Pinned entries are exempt and never evicted; unpinned entries beyond
    /// `limit - pinned_count` are dropped oldest-first. The result is
    /// pinned-then-unpinned, each group newest-first.
    fn prune(&self, entries: &mut Vec<HistoryEntry>) {
        let limit = settings::snapshot(&self.settings).history_size;
        let mut pinned = Vec::new();
        let mut unpinned = Vec::new();
        for entry in entries.drain(..) {
            if entry.pinned() {
                pinned.push(entry);
            } else {
                unpinned.push(entry);
            }
        }
        unpinned.truncate(limit.saturating_sub(pinned.len()));
        // Stable sort: entries stamped in the same millisecond keep their
        // insertion order.
        pinned.sort_by(|a, b| b.ts().cmp(&a.ts()));
        unpinned.sort_by(|a, b| b.ts().cmp(&a.ts()));
        entries.extend(pinned);
        entries.extend(unpinned);
    }

    fn save_to_disk(&self, entries: &[HistoryEntry]) {
        if !settings::snapshot(&self.settings).persist_history {
            return;
        }
        let Some(path) = &self.path else {
            return;
        };
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("[HistoryStore] Failed to create cache directory: {}", e);
                return;
            }
        }
        let json = match serde_json::to_string(entries) {
            Ok(json) => json,
            Err(e) => {
                eprintln!("[HistoryStore] Failed to serialize history: {}", e);
                return;
            }
        };
        if let Err(e) = std::fs::write(path, json) {
            eprintln!("[HistoryStore] Failed to save history: {}", e);
        }
    }

    /// Load persisted entries, tolerating every historical shape.
    ///
    /// A missing, unreadable or non-array file yields an empty history.
    /// Legacy entries stored as bare strings are upgraded in place to
    /// unpinned text entries stamped at load time.
    fn load_from_disk(&self) -> Vec<HistoryEntry> {
        if !settings::snapshot(&self.settings).persist_history {
            return Vec::new();
        }
        let Some(path) = &self.path else {
            return Vec::new();
        };
        let Ok(content) = std::fs::read_to_string(path) else {
            return Vec::new();
        };
        let Ok(values) = serde_json::from_str::<Vec<serde_json::Value>>(&content) else {
            return Vec::new();
        };
        values
            .into_iter()
            .filter_map(|value| match value {
                serde_json::Value::String(text) => {
                    Some(HistoryEntry::new_text(text, None, None, None))
                }
                other => serde_json::from_value::<HistoryEntry>(other).ok(),
            })
            .collect()
    }
}
