use async_trait::async_trait;
use vani_audio::{decode_wav, AudioClip, PlaybackSink};
use vani_client::DecoderClient;
use vani_core::{PlaybackError, PollError, StatusSnapshot};

use crate::traits::{AudioOut, SpeechSource, StatusSource};

#[async_trait]
impl StatusSource for DecoderClient {
    async fn latest(&self) -> Result<StatusSnapshot, PollError> {
        DecoderClient::latest(self).await
    }
}

#[async_trait]
impl SpeechSource for DecoderClient {
    async fn fetch_speech(&self) -> Result<AudioClip, PlaybackError> {
        let url = self.audio_url().await?;
        let bytes = self.fetch_clip(&url).await?;
        decode_wav(&bytes)
    }
}

impl AudioOut for PlaybackSink {
    fn play(&self, clip: AudioClip) -> Result<(), PlaybackError> {
        PlaybackSink::play(self, clip)
    }

    fn is_enabled(&self) -> bool {
        PlaybackSink::is_enabled(self)
    }
}
