use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::settings::AppSettings;
use super::types::PopupView;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(tag = "event", content = "payload")] // Tagged enum for easier frontend parsing
#[ts(export, export_to = "../bindings/")]
pub enum AppEvent {
    /// The history collection changed (capture, mutation or prune).
    #[serde(rename = "history://changed")]
    HistoryChanged,

    /// Capture was paused (true) or resumed (false).
    #[serde(rename = "capture://paused")]
    CapturePaused(bool),

    #[serde(rename = "settings://updated")]
    SettingsUpdated(AppSettings),

    /// New popup state to render.
    #[serde(rename = "popup://view")]
    PopupChanged(PopupView),

    /// One-line user-visible notification.
    #[serde(rename = "notice://show")]
    Notice(String),
}
