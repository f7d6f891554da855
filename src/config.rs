//! Runtime configuration for the client

use std::str::FromStr;
use std::time::Duration;

use tracing::{warn, Level};

use crate::api::ApiConfig;

pub const SERVER_VAR: &str = "MEDIA_GRABBER_SERVER";
pub const CONFIRMATION_VAR: &str = "MEDIA_GRABBER_CONFIRMATION_SECS";
pub const AUDIO_MARKER_VAR: &str = "MEDIA_GRABBER_AUDIO_MARKER";
pub const TIMEOUT_VAR: &str = "MEDIA_GRABBER_TIMEOUT_SECS";
pub const LOG_VAR: &str = "MEDIA_GRABBER_LOG";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api: ApiConfig,
    /// How long the "download started" banner stays visible
    pub confirmation_timeout: Duration,
    /// Source-name substring that marks an audio-only platform
    pub audio_source_marker: String,
    pub log_level: Level,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            confirmation_timeout: Duration::from_secs(8),
            audio_source_marker: "soundcloud".to_string(),
            log_level: Level::INFO,
        }
    }
}

impl AppConfig {
    /// Load from the process environment, reading `.env` first if present
    pub fn from_env() -> Self {
        dotenv::dotenv().ok(); // Ignore error if .env not present
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(server) = lookup(SERVER_VAR).filter(|s| !s.trim().is_empty()) {
            config.api.base_url = server.trim().to_string();
        }
        if let Some(secs) = parse_var::<u64>(&lookup, CONFIRMATION_VAR) {
            config.confirmation_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var::<u64>(&lookup, TIMEOUT_VAR).filter(|s| *s > 0) {
            config.api.request_timeout = Duration::from_secs(secs);
        }
        if let Some(marker) = lookup(AUDIO_MARKER_VAR) {
            config.audio_source_marker = marker.trim().to_string();
        }
        if let Some(level) = parse_var::<Level>(&lookup, LOG_VAR) {
            config.log_level = level;
        }

        config
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring invalid value {:?} for {}", raw, key);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(|_| None);
        assert_eq!(config.api.base_url, "http://127.0.0.1:5000");
        assert_eq!(config.api.info_path, "api/info");
        assert_eq!(config.api.download_path, "api/download");
        assert_eq!(config.confirmation_timeout, Duration::from_secs(8));
        assert_eq!(config.audio_source_marker, "soundcloud");
        assert_eq!(config.log_level, Level::INFO);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (SERVER_VAR, " https://grab.example.com "),
            (CONFIRMATION_VAR, "3"),
            (TIMEOUT_VAR, "10"),
            (AUDIO_MARKER_VAR, "bandcamp"),
            (LOG_VAR, "debug"),
        ]));
        assert_eq!(config.api.base_url, "https://grab.example.com");
        assert_eq!(config.confirmation_timeout, Duration::from_secs(3));
        assert_eq!(config.api.request_timeout, Duration::from_secs(10));
        assert_eq!(config.audio_source_marker, "bandcamp");
        assert_eq!(config.log_level, Level::DEBUG);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (CONFIRMATION_VAR, "soon"),
            (TIMEOUT_VAR, "0"),
            (LOG_VAR, "loud"),
        ]));
        assert_eq!(config.confirmation_timeout, Duration::from_secs(8));
        assert_eq!(config.api.request_timeout, Duration::from_secs(30));
        assert_eq!(config.log_level, Level::INFO);
    }
}
