pub mod filter;
pub mod history;
pub mod monitor;
pub mod state;

pub use history::HistoryStore;
pub use monitor::ClipboardMonitor;
pub use state::ClipboardState;
