use async_trait::async_trait;
use vani_audio::AudioClip;
use vani_core::{PlaybackError, PollError, StatusSnapshot};

/// Where decoded snapshots come from. Implemented by the HTTP client;
/// faked in controller tests.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn latest(&self) -> Result<StatusSnapshot, PollError>;
}

/// Where synthesized speech clips come from (locate, fetch, decode).
#[async_trait]
pub trait SpeechSource: Send + Sync {
    async fn fetch_speech(&self) -> Result<AudioClip, PlaybackError>;
}

/// Where clips go. Implemented by the playback sink.
pub trait AudioOut: Send + Sync {
    fn play(&self, clip: AudioClip) -> Result<(), PlaybackError>;
    fn is_enabled(&self) -> bool;
}
