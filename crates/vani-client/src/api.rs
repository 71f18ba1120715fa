use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use reqwest::{multipart, Client};
use serde::Deserialize;
use vani_core::{PlaybackError, PollError, StatusSnapshot};

#[derive(Debug, Deserialize)]
struct AudioLocation {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VoiceQueryReply {
    #[serde(default)]
    audio: Option<String>,
}

/// HTTP client for the decoder backend's three endpoints.
pub struct DecoderClient {
    http: Client,
    base_url: String,
}

impl DecoderClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, PollError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PollError::Http(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /latest` — the newest decoded snapshot.
    pub async fn latest(&self) -> Result<StatusSnapshot, PollError> {
        let resp = self
            .http
            .get(format!("{}/latest", self.base_url))
            .send()
            .await
            .map_err(|e| PollError::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PollError::Status(status.as_u16()));
        }

        resp.json::<StatusSnapshot>()
            .await
            .map_err(|e| PollError::Malformed(e.to_string()))
    }

    /// `GET /audio` — where the latest synthesized clip lives.
    pub async fn audio_url(&self) -> Result<String, PlaybackError> {
        let resp = self
            .http
            .get(format!("{}/audio", self.base_url))
            .send()
            .await
            .map_err(|e| PlaybackError::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PlaybackError::Status(status.as_u16()));
        }

        let location: AudioLocation = resp
            .json()
            .await
            .map_err(|e| PlaybackError::Http(e.to_string()))?;

        location.url.ok_or(PlaybackError::MissingField("url"))
    }

    /// Fetch clip bytes from `url`, with a cache-busting `t=` parameter so
    /// the backend's single rotating audio file is never served stale.
    pub async fn fetch_clip(&self, url: &str) -> Result<Vec<u8>, PlaybackError> {
        let busted = cache_bust(url, epoch_millis());
        let resp = self
            .http
            .get(&busted)
            .send()
            .await
            .map_err(|e| PlaybackError::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PlaybackError::Status(status.as_u16()));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| PlaybackError::Http(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    /// `POST /voice-query` — upload a recorded WAV question, get the
    /// synthesized answer back as decoded audio bytes.
    pub async fn voice_query(&self, wav_bytes: Vec<u8>) -> Result<Vec<u8>, PlaybackError> {
        let part = multipart::Part::bytes(wav_bytes)
            .file_name("query.wav")
            .mime_str("audio/wav")
            .map_err(|e| PlaybackError::Http(e.to_string()))?;
        let form = multipart::Form::new().part("file", part);

        let resp = self
            .http
            .post(format!("{}/voice-query", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| PlaybackError::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PlaybackError::Status(status.as_u16()));
        }

        let reply: VoiceQueryReply = resp
            .json()
            .await
            .map_err(|e| PlaybackError::Http(e.to_string()))?;
        let encoded = reply.audio.ok_or(PlaybackError::MissingField("audio"))?;

        BASE64_STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| PlaybackError::Decode(e.to_string()))
    }
}

fn epoch_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}

/// Append a `t=<millis>` query parameter, joining with `?` or `&` as needed.
fn cache_bust(url: &str, millis: u128) -> String {
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{}{}t={}", url, sep, millis)
}
