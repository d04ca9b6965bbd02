//! INI configuration file for the timing station.
//!
//! Settings live in `~/.trackside/config.ini`:
//!
//! ```ini
//! [server]
//! base_url = http://localhost:8080
//! timeout_secs = 10
//!
//! [scanner]
//! region_size = 300
//! cooldown_ms = 2000
//! attach_track = true
//! show_lap_metrics = true
//!
//! [camera]
//! facing = environment
//! width = 1280
//! height = 720
//!
//! [track]
//! default_id = track-1
//! ```
//!
//! Missing keys fall back to defaults; a missing file is not an error for
//! [`ConfigFile::load_or_default`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;
use thiserror::Error;
use tracing::debug;

use crate::api::DEFAULT_TIMEOUT;
use crate::frame::{CameraConfig, FacingMode};
use crate::scanner::ScannerConfig;

/// Default backend base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Errors from loading or saving the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: ini::Error,
    },

    #[error("failed to write config file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not determine home directory")]
    NoHomeDir,
}

/// Parsed configuration file contents.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Backend base URL.
    pub base_url: String,
    /// HTTP timeout for scan submissions.
    pub timeout: Duration,
    /// Scan-loop settings.
    pub scanner: ScannerConfig,
    /// Camera capture preferences.
    pub camera: CameraConfig,
    /// Track to auto-select at startup, if any.
    pub default_track_id: Option<String>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            scanner: ScannerConfig::default(),
            camera: CameraConfig::default(),
            default_track_id: None,
        }
    }
}

impl ConfigFile {
    /// The default config path, `~/.trackside/config.ini`.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::home_dir()
            .map(|home| home.join(".trackside").join("config.ini"))
            .ok_or(ConfigError::NoHomeDir)
    }

    /// Load from a path, falling back to defaults when the file is absent.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            debug!(path = %path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Load and parse a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(Self::from_ini(&ini))
    }

    fn from_ini(ini: &Ini) -> Self {
        let defaults = Self::default();

        let server = ini.section(Some("server"));
        let base_url = server
            .and_then(|s| s.get("base_url"))
            .map(str::to_string)
            .unwrap_or(defaults.base_url);
        let timeout = server
            .and_then(|s| s.get("timeout_secs"))
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        let scanner_section = ini.section(Some("scanner"));
        let mut scanner = defaults.scanner;
        if let Some(size) = scanner_section
            .and_then(|s| s.get("region_size"))
            .and_then(|v| v.parse().ok())
        {
            scanner = scanner.with_region_size(size);
        }
        if let Some(ms) = scanner_section
            .and_then(|s| s.get("cooldown_ms"))
            .and_then(|v| v.parse().ok())
        {
            scanner = scanner.with_cooldown(Duration::from_millis(ms));
        }
        if let Some(attach) = scanner_section
            .and_then(|s| s.get("attach_track"))
            .and_then(parse_bool)
        {
            scanner = scanner.with_attach_track(attach);
        }
        if let Some(show) = scanner_section
            .and_then(|s| s.get("show_lap_metrics"))
            .and_then(parse_bool)
        {
            scanner = scanner.with_show_lap_metrics(show);
        }

        let camera_section = ini.section(Some("camera"));
        let mut camera = defaults.camera;
        if let Some(facing) = camera_section.and_then(|s| s.get("facing")) {
            camera.facing = FacingMode::from_config_value(facing);
        }
        if let Some(width) = camera_section
            .and_then(|s| s.get("width"))
            .and_then(|v| v.parse().ok())
        {
            camera.ideal_width = width;
        }
        if let Some(height) = camera_section
            .and_then(|s| s.get("height"))
            .and_then(|v| v.parse().ok())
        {
            camera.ideal_height = height;
        }

        let default_track_id = ini
            .section(Some("track"))
            .and_then(|s| s.get("default_id"))
            .map(str::to_string);

        Self {
            base_url,
            timeout,
            scanner,
            camera,
            default_track_id,
        }
    }

    /// Write this configuration to a file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        let mut ini = Ini::new();
        ini.with_section(Some("server"))
            .set("base_url", &self.base_url)
            .set("timeout_secs", self.timeout.as_secs().to_string());
        ini.with_section(Some("scanner"))
            .set("region_size", self.scanner.region_size.to_string())
            .set(
                "cooldown_ms",
                (self.scanner.cooldown.as_millis() as u64).to_string(),
            )
            .set("attach_track", self.scanner.attach_track.to_string())
            .set(
                "show_lap_metrics",
                self.scanner.show_lap_metrics.to_string(),
            );
        ini.with_section(Some("camera"))
            .set("facing", self.camera.facing.as_str())
            .set("width", self.camera.ideal_width.to_string())
            .set("height", self.camera.ideal_height.to_string());
        if let Some(id) = &self.default_track_id {
            ini.with_section(Some("track")).set("default_id", id);
        }

        ini.write_to_file(path).map_err(write_err)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConfigFile::default();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.scanner.region_size, 300);
        assert!(config.default_track_id.is_none());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigFile::load_or_default(&dir.path().join("absent.ini")).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_load_full_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(
            &path,
            "[server]\n\
             base_url = https://run.example.org\n\
             timeout_secs = 5\n\
             [scanner]\n\
             region_size = 250\n\
             cooldown_ms = 1500\n\
             attach_track = false\n\
             show_lap_metrics = false\n\
             [camera]\n\
             facing = user\n\
             width = 1920\n\
             height = 1080\n\
             [track]\n\
             default_id = track-7\n",
        )
        .unwrap();

        let config = ConfigFile::load(&path).unwrap();
        assert_eq!(config.base_url, "https://run.example.org");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.scanner.region_size, 250);
        assert_eq!(config.scanner.cooldown, Duration::from_millis(1500));
        assert!(!config.scanner.attach_track);
        assert!(!config.scanner.show_lap_metrics);
        assert_eq!(config.camera.facing, FacingMode::User);
        assert_eq!(config.camera.ideal_width, 1920);
        assert_eq!(config.camera.ideal_height, 1080);
        assert_eq!(config.default_track_id.as_deref(), Some("track-7"));
    }

    #[test]
    fn test_partial_file_keeps_defaults_for_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[scanner]\nregion_size = 400\n").unwrap();

        let config = ConfigFile::load(&path).unwrap();
        assert_eq!(config.scanner.region_size, 400);
        assert_eq!(config.scanner.cooldown, Duration::from_millis(2000));
        assert_eq!(config.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_unparseable_values_fall_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(
            &path,
            "[scanner]\nregion_size = huge\nattach_track = maybe\n",
        )
        .unwrap();

        let config = ConfigFile::load(&path).unwrap();
        assert_eq!(config.scanner.region_size, 300);
        assert!(config.scanner.attach_track);
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.ini");

        let mut config = ConfigFile::default();
        config.base_url = "https://run.example.org".to_string();
        config.scanner = config.scanner.with_region_size(222);
        config.default_track_id = Some("track-3".to_string());

        config.save(&path).unwrap();
        let loaded = ConfigFile::load(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
