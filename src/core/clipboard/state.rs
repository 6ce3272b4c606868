use std::sync::{atomic::AtomicBool, Arc};

/// Thread-safe clipboard state
#[derive(Clone)]
pub struct ClipboardState {
    /// Flag to ignore the next clipboard change event.
    /// Set before activation writes back to the clipboard so the capture
    /// loop does not record our own write as a new entry.
    pub ignore_next: Arc<AtomicBool>,
}

impl ClipboardState {
    pub fn new() -> Self {
        Self {
            ignore_next: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl Default for ClipboardState {
    fn default() -> Self {
        Self::new()
    }
}
