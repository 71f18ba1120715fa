use serde::Deserialize;

use crate::history::HistoryEntry;

/// Latest decoded-output payload from the backend `/latest` endpoint.
///
/// Deserialized strictly: a body missing any field is treated as malformed
/// and the previous snapshot is kept, so the display never shows a
/// half-populated state.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatusSnapshot {
    pub sentence: String,
    pub prediction: String,
    pub confidence: f64,
    pub wave: Vec<f64>,
}

impl Default for StatusSnapshot {
    fn default() -> Self {
        Self {
            sentence: String::new(),
            prediction: String::new(),
            confidence: 0.0,
            wave: Vec::new(),
        }
    }
}

/// Aggregate dashboard state broadcast to the TUI via watch channel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    pub snapshot: StatusSnapshot,
    pub history: Vec<HistoryEntry>,
    /// True after a successful poll, false until then and after any failure.
    pub link_up: bool,
    pub polls: u64,
    pub last_error: Option<String>,
    pub playback_enabled: bool,
}

/// Commands sent from TUI → main via mpsc channel.
#[derive(Debug, Clone, PartialEq)]
pub enum UiCommand {
    SetPlaybackEnabled(bool),
    VoiceQuery,
    Quit,
}
