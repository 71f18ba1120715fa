use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("environment variable not found: {0}")]
    EnvVarNotFound(String),
}

/// Errors from the `/latest` poll path. Caught at the tick boundary,
/// logged, and swallowed — the previous snapshot stays on display.
#[derive(Debug, Error)]
pub enum PollError {
    #[error("request failed: {0}")]
    Http(String),

    #[error("unexpected status: {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Errors from the audio fetch/play path.
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("audio request failed: {0}")]
    Http(String),

    #[error("unexpected status: {0}")]
    Status(u16),

    #[error("response missing field: {0}")]
    MissingField(&'static str),

    #[error("failed to decode clip: {0}")]
    Decode(String),

    #[error("output device error: {0}")]
    Device(String),

    #[error("failed to build stream: {0}")]
    Stream(String),
}
