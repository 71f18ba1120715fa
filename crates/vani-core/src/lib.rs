pub mod config;
pub mod config_diff;
pub mod error;
pub mod history;
pub mod types;

pub use config::AppConfig;
pub use config_diff::ConfigDiff;
pub use error::{ConfigError, PlaybackError, PollError};
pub use history::{History, HistoryEntry};
pub use types::{DashboardState, StatusSnapshot, UiCommand};
