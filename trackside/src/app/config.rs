//! Application configuration for KioskApp.

use std::time::Duration;

use crate::api::DEFAULT_TIMEOUT;
use crate::config::{ConfigFile, DEFAULT_BASE_URL};
use crate::frame::CameraConfig;
use crate::scanner::ScannerConfig;
use crate::track::Track;

/// Top-level configuration passed to `KioskApp::start()`.
///
/// Combines settings from the config file with the track roster, which is
/// provisioned per event rather than stored in the file.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Backend base URL.
    pub base_url: String,
    /// HTTP timeout for scan submissions.
    pub timeout: Duration,
    /// Scan-loop settings.
    pub scanner: ScannerConfig,
    /// Camera capture preferences.
    pub camera: CameraConfig,
    /// Courses available at this station.
    pub tracks: Vec<Track>,
    /// Track to auto-select at startup.
    pub default_track_id: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            scanner: ScannerConfig::default(),
            camera: CameraConfig::default(),
            tracks: Vec::new(),
            default_track_id: None,
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a parsed config file plus the event's track roster.
    pub fn from_config_file(file: &ConfigFile, tracks: Vec<Track>) -> Self {
        Self {
            base_url: file.base_url.clone(),
            timeout: file.timeout,
            scanner: file.scanner.clone(),
            camera: file.camera.clone(),
            tracks,
            default_track_id: file.default_track_id.clone(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_scanner(mut self, scanner: ScannerConfig) -> Self {
        self.scanner = scanner;
        self
    }

    pub fn with_tracks(mut self, tracks: Vec<Track>) -> Self {
        self.tracks = tracks;
        self
    }

    pub fn with_default_track(mut self, id: impl Into<String>) -> Self {
        self.default_track_id = Some(id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_file_carries_settings() {
        let mut file = ConfigFile::default();
        file.base_url = "https://run.example.org".to_string();
        file.default_track_id = Some("track-1".to_string());

        let tracks = vec![Track::new("track-1", "5K Loop")];
        let config = AppConfig::from_config_file(&file, tracks);
        assert_eq!(config.base_url, "https://run.example.org");
        assert_eq!(config.default_track_id.as_deref(), Some("track-1"));
        assert_eq!(config.tracks.len(), 1);
    }

    #[test]
    fn test_builders() {
        let config = AppConfig::new()
            .with_base_url("https://timing.example.org")
            .with_default_track("track-2");
        assert_eq!(config.base_url, "https://timing.example.org");
        assert_eq!(config.default_track_id.as_deref(), Some("track-2"));
    }
}
