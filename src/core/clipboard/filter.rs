//! Secure-context capture suppression.
//!
//! Heuristically decides whether the focused window looks like a
//! credential-entry surface (password manager, auth agent, lock screen) so
//! that capture skips the current poll cycle. Advisory, not a security
//! boundary: a malicious window title defeats it, and a window that matches
//! nothing is still captured.

use crate::shared::settings::AppSettings;
use crate::system::window::WindowIdentity;

/// Window classes of known password managers and credential agents.
const KNOWN_SECURE_CLASSES: &[&str] = &[
    "polkit-gnome-authentication-agent-1",
    "gnome-shell",
    "gdm-password",
    "org.gnome.seahorse.application",
    "gnome-keyring-ask",
    "1password",
    "1password-beta",
    "bitwarden",
    "keepass",
    "keepassxc",
    "kwalletd",
    "kwallet5",
    "lastpass",
];

/// Substrings that mark a window class or title as credential-related.
const SUSPICIOUS_TOKENS: &[&str] = &["auth", "password", "pin", "unlock", "login", "keyring"];

/// Should capture be suppressed for this poll cycle?
///
/// Returns false when the heuristics are disabled or no window has focus.
pub fn should_skip_capture(settings: &AppSettings, window: Option<&WindowIdentity>) -> bool {
    if !settings.enable_secure_heuristics {
        return false;
    }
    let Some(window) = window else {
        return false;
    };

    let wm_class = window.wm_class.as_deref().unwrap_or("").to_lowercase();
    let title = window.title.as_deref().unwrap_or("").to_lowercase();

    if settings
        .skip_wm_classes
        .iter()
        .any(|skip| skip.to_lowercase() == wm_class)
    {
        return true;
    }
    if KNOWN_SECURE_CLASSES.contains(&wm_class.as_str()) {
        return true;
    }
    SUSPICIOUS_TOKENS
        .iter()
        .any(|token| wm_class.contains(token) || title.contains(token))
}
