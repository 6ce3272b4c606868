//! Auto-paste after activation.
//!
//! Key injection is only feasible on X11 via `xdotool`; Wayland forbids it,
//! so the caller gets a notice-worthy error instead of a silent failure.

use std::process::Stdio;

use tokio::process::Command;

use crate::shared::errors::{CommandError, CommandResult};
use crate::system::selection::is_wayland;

/// Simulate Ctrl+V in the focused window.
pub async fn auto_paste() -> CommandResult<()> {
    if is_wayland() {
        return Err(CommandError::FeatureMissing(
            "Auto-paste is unavailable on Wayland for security reasons.".to_string(),
        ));
    }

    let status = Command::new("xdotool")
        .args(["key", "--clearmodifiers", "ctrl+v"])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;

    match status {
        Ok(status) if status.success() => Ok(()),
        Ok(status) => Err(CommandError::SystemIO(format!(
            "xdotool exited with {}",
            status
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(CommandError::FeatureMissing(
            "Install xdotool to enable auto-paste.".to_string(),
        )),
        Err(e) => Err(CommandError::SystemIO(e.to_string())),
    }
}
