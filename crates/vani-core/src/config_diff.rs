use crate::config::AppConfig;

/// Describes runtime-safe changes between two configs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigDiff {
    pub playback_enabled_change: Option<bool>,
    pub log_level_change: Option<String>,
    pub non_reloadable: Vec<String>,
}

impl ConfigDiff {
    /// Compare two configs and return the diff.
    /// Reloadable: playback.enabled, general.log_level.
    /// Non-reloadable: base_url, poll interval, output device, history
    /// capacity, wave geometry — logged as warnings.
    pub fn diff(old: &AppConfig, new: &AppConfig) -> Self {
        let mut result = Self::default();

        if old.playback.enabled != new.playback.enabled {
            result.playback_enabled_change = Some(new.playback.enabled);
        }

        if old.general.log_level != new.general.log_level {
            result.log_level_change = Some(new.general.log_level.clone());
        }

        if old.server.base_url != new.server.base_url {
            result.non_reloadable.push(format!(
                "base_url changed ('{}' → '{}'), requires restart",
                old.server.base_url, new.server.base_url
            ));
        }
        if old.server.poll_interval_ms != new.server.poll_interval_ms {
            result.non_reloadable.push(format!(
                "poll_interval_ms changed ({} → {}), requires restart",
                old.server.poll_interval_ms, new.server.poll_interval_ms
            ));
        }
        if old.playback.device_name != new.playback.device_name {
            result.non_reloadable.push(format!(
                "playback device changed ('{}' → '{}'), requires restart",
                old.playback.device_name, new.playback.device_name
            ));
        }
        if old.history.capacity != new.history.capacity {
            result.non_reloadable.push(format!(
                "history capacity changed ({} → {}), requires restart",
                old.history.capacity, new.history.capacity
            ));
        }
        if old.wave != new.wave {
            result
                .non_reloadable
                .push("wave geometry changed, requires restart".to_string());
        }

        result
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
