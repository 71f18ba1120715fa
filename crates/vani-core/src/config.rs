use crate::error::ConfigError;
use regex::Regex;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default)]
    pub wave: WaveConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct HistoryConfig {
    #[serde(default = "default_history_capacity")]
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_history_capacity(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PlaybackConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_device_name")]
    pub device_name: String,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            device_name: default_device_name(),
        }
    }
}

/// Geometry of the waveform panel: 200 points over a 760×180 box,
/// ±10 vertical scale.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct WaveConfig {
    #[serde(default = "default_wave_max_points")]
    pub max_points: usize,

    #[serde(default = "default_wave_width")]
    pub width: f64,

    #[serde(default = "default_wave_height")]
    pub height: f64,

    #[serde(default = "default_wave_scale")]
    pub scale: f64,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            max_points: default_wave_max_points(),
            width: default_wave_width(),
            height: default_wave_height(),
            scale: default_wave_scale(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_history_capacity() -> usize {
    20
}

fn default_true() -> bool {
    true
}

fn default_device_name() -> String {
    "default".to_string()
}

fn default_wave_max_points() -> usize {
    200
}

fn default_wave_width() -> f64 {
    760.0
}

fn default_wave_height() -> f64 {
    180.0
}

fn default_wave_scale() -> f64 {
    10.0
}

/// Interpolate `${VAR}` patterns with environment variable values.
fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let re = Regex::new(r"\$\{([^}]+)\}").unwrap();
    let mut result = input.to_string();
    let mut errors = Vec::new();

    for cap in re.captures_iter(input) {
        let var_name = &cap[1];
        match std::env::var(var_name) {
            Ok(val) => {
                result = result.replace(&cap[0], &val);
            }
            Err(_) => {
                errors.push(var_name.to_string());
            }
        }
    }

    if let Some(first_missing) = errors.into_iter().next() {
        return Err(ConfigError::EnvVarNotFound(first_missing));
    }

    Ok(result)
}

impl AppConfig {
    /// Load configuration from a TOML file, with environment variable interpolation.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let interpolated = interpolate_env_vars(&content)?;
        let config: AppConfig = toml::from_str(&interpolated)?;
        Ok(config)
    }

    /// Parse configuration from a TOML string (for testing).
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let interpolated = interpolate_env_vars(s)?;
        let config: AppConfig = toml::from_str(&interpolated)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_parse_valid_toml() {
        let toml_str = r#"
[general]
log_level = "debug"

[server]
base_url = "http://decoder.local:9000"
poll_interval_ms = 500

[history]
capacity = 50

[playback]
enabled = false
device_name = "speakers"

[wave]
max_points = 100
width = 400.0
height = 120.0
scale = 8.0
"#;
        let config = AppConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.server.base_url, "http://decoder.local:9000");
        assert_eq!(config.server.poll_interval_ms, 500);
        assert_eq!(config.history.capacity, 50);
        assert!(!config.playback.enabled);
        assert_eq!(config.playback.device_name, "speakers");
        assert_eq!(config.wave.max_points, 100);
        assert_eq!(config.wave.scale, 8.0);
    }

    #[test]
    fn test_config_default_values() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.server.base_url, "http://localhost:8000");
        assert_eq!(config.server.poll_interval_ms, 1000);
        assert_eq!(config.history.capacity, 20);
        assert!(config.playback.enabled);
        assert_eq!(config.playback.device_name, "default");
        assert_eq!(config.wave.max_points, 200);
        assert_eq!(config.wave.width, 760.0);
        assert_eq!(config.wave.height, 180.0);
        assert_eq!(config.wave.scale, 10.0);
    }

    #[test]
    fn test_config_partial_toml_keeps_other_defaults() {
        let toml_str = r#"
[server]
base_url = "http://127.0.0.1:8123"
"#;
        let config = AppConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.server.base_url, "http://127.0.0.1:8123");
        assert_eq!(config.server.poll_interval_ms, 1000);
        assert_eq!(config.history.capacity, 20);
    }

    #[test]
    fn test_config_env_var_interpolation() {
        std::env::set_var("VANI_TEST_URL", "http://interp.example:1234");
        let toml_str = r#"
[server]
base_url = "${VANI_TEST_URL}"
"#;
        let config = AppConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.server.base_url, "http://interp.example:1234");
        std::env::remove_var("VANI_TEST_URL");
    }

    #[test]
    fn test_config_missing_env_var_error() {
        let toml_str = r#"
[server]
base_url = "${DEFINITELY_DOES_NOT_EXIST_12345}"
"#;
        let result = AppConfig::from_toml_str(toml_str);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("DEFINITELY_DOES_NOT_EXIST_12345"));
    }

    #[test]
    fn test_config_invalid_toml_error() {
        let toml_str = "this is not valid toml [[[";
        assert!(AppConfig::from_toml_str(toml_str).is_err());
    }

    #[test]
    fn test_config_load_from_file() {
        let dir = std::env::temp_dir().join("vani_test_config");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("test.toml");
        std::fs::write(
            &path,
            r#"
[general]
log_level = "warn"

[history]
capacity = 5
"#,
        )
        .unwrap();

        let config = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(config.general.log_level, "warn");
        assert_eq!(config.history.capacity, 5);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_config_load_from_file_not_found() {
        let result = AppConfig::load_from_file(std::path::Path::new("/nonexistent/path.toml"));
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("failed to read config file"));
    }
}
