//! Clipboard access, keyed by selection and MIME type.
//!
//! The OS exposes no change notifications, only pull-based reads, so the
//! capture loop polls through the `ClipboardSource` trait. The production
//! implementation reads plain text through the clipboard-manager plugin and
//! shells out to `wl-paste`/`xclip` for the primary selection and for named
//! MIME payloads, which neither plugin API covers.

use std::fmt;
use std::process::Stdio;

use async_trait::async_trait;
use tauri::AppHandle;
use tauri_plugin_clipboard_manager::ClipboardExt;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::shared::errors::{CommandError, CommandResult};

/// One of the two clipboard buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selection {
    /// The system clipboard (Ctrl+C / Ctrl+V).
    Clipboard,
    /// The middle-click paste buffer.
    Primary,
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::Clipboard => write!(f, "clipboard"),
            Selection::Primary => write!(f, "primary"),
        }
    }
}

/// Pull-based clipboard read/write capability.
///
/// Reads return `Ok(None)` when the selection is empty or does not offer the
/// requested representation; `Err` is reserved for broken plumbing (missing
/// helper binaries and the like). The capture loop treats both the same way.
#[async_trait]
pub trait ClipboardSource: Send + Sync {
    async fn read_text(&self, selection: Selection) -> CommandResult<Option<String>>;
    async fn read_mime(&self, selection: Selection, mime: &str) -> CommandResult<Option<Vec<u8>>>;
    async fn write_text(&self, selection: Selection, text: &str) -> CommandResult<()>;
    async fn write_mime(&self, selection: Selection, mime: &str, data: &[u8]) -> CommandResult<()>;
}

/// True when running under a Wayland compositor.
pub fn is_wayland() -> bool {
    std::env::var("WAYLAND_DISPLAY").is_ok()
}

/// Production clipboard backed by the clipboard-manager plugin plus
/// `wl-clipboard`/`xclip` for everything the plugin cannot express.
pub struct SystemClipboard {
    app: AppHandle,
}

impl SystemClipboard {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }
}

#[async_trait]
impl ClipboardSource for SystemClipboard {
    async fn read_text(&self, selection: Selection) -> CommandResult<Option<String>> {
        match selection {
            // An empty or non-text clipboard surfaces as an error from the
            // plugin; both mean "nothing to capture".
            Selection::Clipboard => match self.app.clipboard().read_text() {
                Ok(text) if !text.is_empty() => Ok(Some(text)),
                Ok(_) | Err(_) => Ok(None),
            },
            Selection::Primary => {
                let bytes = read_external(selection, None).await?;
                Ok(bytes.and_then(|b| String::from_utf8(b).ok()))
            }
        }
    }

    async fn read_mime(&self, selection: Selection, mime: &str) -> CommandResult<Option<Vec<u8>>> {
        read_external(selection, Some(mime)).await
    }

    async fn write_text(&self, selection: Selection, text: &str) -> CommandResult<()> {
        match selection {
            Selection::Clipboard => self
                .app
                .clipboard()
                .write_text(text.to_string())
                .map_err(|e| CommandError::ClipboardError(e.to_string())),
            Selection::Primary => write_external(selection, None, text.as_bytes()).await,
        }
    }

    async fn write_mime(&self, selection: Selection, mime: &str, data: &[u8]) -> CommandResult<()> {
        match (selection, mime) {
            (Selection::Clipboard, "text/html") => {
                let html = String::from_utf8(data.to_vec())
                    .map_err(|e| CommandError::ClipboardError(format!("Invalid HTML: {}", e)))?;
                self.app
                    .clipboard()
                    .write_html(html, None::<String>)
                    .map_err(|e| CommandError::ClipboardError(e.to_string()))
            }
            (Selection::Clipboard, "image/png") => {
                let image = tauri::image::Image::from_bytes(data)
                    .map_err(|e| CommandError::ClipboardError(format!("Invalid PNG: {}", e)))?;
                self.app
                    .clipboard()
                    .write_image(&image)
                    .map_err(|e| CommandError::ClipboardError(e.to_string()))
            }
            _ => write_external(selection, Some(mime), data).await,
        }
    }
}

/// Read a selection through `wl-paste` (Wayland) or `xclip` (X11).
async fn read_external(selection: Selection, mime: Option<&str>) -> CommandResult<Option<Vec<u8>>> {
    let mut cmd = if is_wayland() {
        let mut cmd = Command::new("wl-paste");
        cmd.arg("--no-newline");
        if selection == Selection::Primary {
            cmd.arg("--primary");
        }
        if let Some(mime) = mime {
            cmd.args(["--type", mime]);
        }
        cmd
    } else {
        let mut cmd = Command::new("xclip");
        cmd.args(["-selection", selection_name(selection), "-o"]);
        if let Some(mime) = mime {
            cmd.args(["-t", mime]);
        }
        cmd
    };

    let output = cmd
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| CommandError::SystemIO(format!("Failed to spawn clipboard helper: {}", e)))?;

    // A non-zero exit just means the selection has no such content.
    if !output.status.success() || output.stdout.is_empty() {
        return Ok(None);
    }
    Ok(Some(output.stdout))
}

/// Write a selection through `wl-copy` (Wayland) or `xclip` (X11).
async fn write_external(selection: Selection, mime: Option<&str>, data: &[u8]) -> CommandResult<()> {
    let mut cmd = if is_wayland() {
        let mut cmd = Command::new("wl-copy");
        if selection == Selection::Primary {
            cmd.arg("--primary");
        }
        if let Some(mime) = mime {
            cmd.args(["--type", mime]);
        }
        cmd
    } else {
        let mut cmd = Command::new("xclip");
        cmd.args(["-selection", selection_name(selection), "-i"]);
        if let Some(mime) = mime {
            cmd.args(["-t", mime]);
        }
        cmd
    };

    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| CommandError::SystemIO(format!("Failed to spawn clipboard helper: {}", e)))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(data)
            .await
            .map_err(|e| CommandError::ClipboardError(format!("Failed to write payload: {}", e)))?;
        // Dropping stdin closes the pipe so the helper can finish.
    }

    let status = child
        .wait()
        .await
        .map_err(|e| CommandError::SystemIO(e.to_string()))?;
    if !status.success() {
        return Err(CommandError::ClipboardError(format!(
            "Clipboard helper exited with {}",
            status
        )));
    }
    Ok(())
}

fn selection_name(selection: Selection) -> &'static str {
    match selection {
        Selection::Clipboard => "clipboard",
        Selection::Primary => "primary",
    }
}
