//! Focused-window identity lookup.
//!
//! Capture metadata and the secure-context heuristics both need to know which
//! window owns the keyboard right now. On X11 this is answered by `xdotool`
//! and `xprop`; Wayland compositors expose no portable query, so the lookup
//! degrades to `None` there. Absence of a window is never an error.

use std::process::Stdio;

use tokio::process::Command;

use crate::shared::types::EntrySource;
use crate::system::selection::is_wayland;

/// Identity of the currently focused window, all fields best-effort.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowIdentity {
    pub app_name: Option<String>,
    pub app_id: Option<String>,
    pub wm_class: Option<String>,
    pub title: Option<String>,
}

impl From<&WindowIdentity> for EntrySource {
    fn from(window: &WindowIdentity) -> Self {
        EntrySource {
            app_name: window.app_name.clone(),
            app_id: window.app_id.clone(),
            wm_class: window.wm_class.clone(),
        }
    }
}

/// Resolve the focused window, if any.
pub async fn focused_window() -> Option<WindowIdentity> {
    if is_wayland() {
        return None;
    }
    let window_id = run_tool("xdotool", &["getactivewindow"]).await?;
    let window_id = window_id.trim().to_string();
    if window_id.is_empty() {
        return None;
    }
    let props = run_tool("xprop", &["-id", &window_id, "WM_CLASS", "_NET_WM_NAME"]).await?;
    let identity = parse_xprop(&props);
    if identity == WindowIdentity::default() {
        None
    } else {
        Some(identity)
    }
}

async fn run_tool(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .await
        .ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout).ok()
}

/// Parse `xprop` output of the form:
///
/// ```text
/// WM_CLASS(STRING) = "navigator", "Firefox"
/// _NET_WM_NAME(UTF8_STRING) = "Mozilla Firefox"
/// ```
fn parse_xprop(output: &str) -> WindowIdentity {
    let mut identity = WindowIdentity::default();
    for line in output.lines() {
        if let Some(rest) = line.strip_prefix("WM_CLASS") {
            let mut values = quoted_values(rest);
            identity.app_id = values.next();
            if let Some(class) = values.next() {
                identity.app_name = Some(class.clone());
                identity.wm_class = Some(class);
            }
        } else if let Some(rest) = line.strip_prefix("_NET_WM_NAME") {
            identity.title = quoted_values(rest).next();
        }
    }
    identity
}

/// Iterate the double-quoted values on an xprop line.
fn quoted_values(line: &str) -> impl Iterator<Item = String> + '_ {
    line.split('"')
        .enumerate()
        .filter(|(i, _)| i % 2 == 1)
        .map(|(_, v)| v.to_string())
}
