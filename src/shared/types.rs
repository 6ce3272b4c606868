use chrono::Utc;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Best-effort identity of the application a capture came from.
///
/// Resolved from the focused window at capture time; every field is optional
/// because not every window exposes all three.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../bindings/")]
pub struct EntrySource {
    #[serde(default)]
    pub app_name: Option<String>,
    #[serde(default)]
    pub app_id: Option<String>,
    #[serde(default)]
    pub wm_class: Option<String>,
}

/// A single history entry.
///
/// Serialized shape is the on-disk contract: internally tagged with
/// `type` ∈ {"text", "image"}, `ts` in epoch milliseconds. Absent fields
/// default so that older history files keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "lowercase")]
#[ts(export, export_to = "../bindings/")]
pub enum HistoryEntry {
    Text {
        text: String,
        #[serde(default)]
        html: Option<String>,
        #[serde(default)]
        rtf: Option<String>,
        #[serde(default)]
        pinned: bool,
        #[serde(default)]
        ts: i64,
        #[serde(default)]
        source: Option<EntrySource>,
    },
    Image {
        /// Base64-encoded PNG bytes.
        data: String,
        /// MD5 digest of the raw PNG bytes, hex-encoded.
        #[serde(default)]
        hash: String,
        #[serde(default)]
        width: u32,
        #[serde(default)]
        height: u32,
        #[serde(default)]
        pinned: bool,
        #[serde(default)]
        ts: i64,
        #[serde(default)]
        source: Option<EntrySource>,
    },
}

impl HistoryEntry {
    /// Create a new unpinned text entry stamped with the current time.
    pub fn new_text(
        text: String,
        html: Option<String>,
        rtf: Option<String>,
        source: Option<EntrySource>,
    ) -> Self {
        HistoryEntry::Text {
            text,
            html,
            rtf,
            pinned: false,
            ts: Utc::now().timestamp_millis(),
            source,
        }
    }

    /// Create a new unpinned image entry stamped with the current time.
    pub fn new_image(
        data: String,
        hash: String,
        width: u32,
        height: u32,
        source: Option<EntrySource>,
    ) -> Self {
        HistoryEntry::Image {
            data,
            hash,
            width,
            height,
            pinned: false,
            ts: Utc::now().timestamp_millis(),
            source,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, HistoryEntry::Text { .. })
    }

    pub fn pinned(&self) -> bool {
        match self {
            HistoryEntry::Text { pinned, .. } => *pinned,
            HistoryEntry::Image { pinned, .. } => *pinned,
        }
    }

    pub fn set_pinned(&mut self, value: bool) {
        match self {
            HistoryEntry::Text { pinned, .. } => *pinned = value,
            HistoryEntry::Image { pinned, .. } => *pinned = value,
        }
    }

    /// Timestamp in epoch milliseconds.
    pub fn ts(&self) -> i64 {
        match self {
            HistoryEntry::Text { ts, .. } => *ts,
            HistoryEntry::Image { ts, .. } => *ts,
        }
    }

    /// The plain-text value for text entries, `None` for images.
    pub fn text(&self) -> Option<&str> {
        match self {
            HistoryEntry::Text { text, .. } => Some(text),
            HistoryEntry::Image { .. } => None,
        }
    }
}

/// Kind discriminant handed to the popup frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "../bindings/")]
pub enum EntryKind {
    Text,
    Image,
}

/// One row of the rendered popup list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../bindings/")]
pub struct PopupItem {
    /// Index into the live history ordering; stable for one view.
    pub index: usize,
    pub kind: EntryKind,
    /// Single-line preview, truncated for display.
    pub preview: String,
    /// Secondary line: "Pinned", source app and time, or image dimensions.
    pub meta: String,
    pub pinned: bool,
    /// Base64 PNG payload for image rows, used to render the thumbnail.
    pub image_data: Option<String>,
}

/// Which element of the popup currently holds keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "target", content = "index", rename_all = "lowercase")]
#[ts(export, export_to = "../bindings/")]
pub enum PopupFocus {
    Search,
    Item(usize),
}

/// Full popup state snapshot sent to the frontend after every transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../bindings/")]
pub struct PopupView {
    pub visible: bool,
    pub query: String,
    pub items: Vec<PopupItem>,
    pub focus: PopupFocus,
}

/// One category tab of a character picker (emoji, kaomoji or symbols).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../bindings/")]
pub struct PickerCategory {
    pub id: String,
    pub label: String,
    pub items: Vec<String>,
}

/// A single GIF search result from the Tenor pass-through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../bindings/")]
pub struct GifResult {
    pub url: String,
    pub preview_url: String,
    pub description: Option<String>,
}
