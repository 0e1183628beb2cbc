//! Configuration management
//!
//! Settings stored as JSON in /etc/octofan/config.json. A missing file means
//! defaults; a present but broken file is an error.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::constants::{device, paths, timing};
use crate::data::validation::{validate_config, validate_file_size};
use crate::error::{OctoError, Result};

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OctoConfig {
    #[serde(default)]
    pub device: DeviceSettings,

    #[serde(default)]
    pub daemon: DaemonSettings,
}

/// Settings for the device context and its frame source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSettings {
    /// hidraw node of the Octo, e.g. /dev/hidraw3
    #[serde(default)]
    pub hidraw_path: Option<PathBuf>,

    /// Age in milliseconds after which cached values read as stale
    #[serde(default = "default_freshness_window_ms")]
    pub freshness_window_ms: u64,

    /// Record size when replaying capture files
    #[serde(default = "default_report_len")]
    pub report_len: usize,
}

/// Settings for octofand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaemonSettings {
    /// How often the status document is rewritten
    #[serde(default = "default_publish_interval_ms")]
    pub publish_interval_ms: u64,

    /// Where the status document is written; `null` disables publishing
    #[serde(default = "default_status_file")]
    pub status_file: Option<PathBuf>,

    /// tracing filter used when OCTOFAN_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_freshness_window_ms() -> u64 {
    timing::millis(timing::DEFAULT_FRESHNESS_WINDOW)
}

fn default_report_len() -> usize {
    device::MIN_REPORT_LEN
}

fn default_publish_interval_ms() -> u64 {
    timing::millis(timing::DEFAULT_PUBLISH_INTERVAL)
}

fn default_status_file() -> Option<PathBuf> {
    Some(PathBuf::from(paths::STATUS_FILE))
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            hidraw_path: None,
            freshness_window_ms: default_freshness_window_ms(),
            report_len: default_report_len(),
        }
    }
}

impl Default for DaemonSettings {
    fn default() -> Self {
        Self {
            publish_interval_ms: default_publish_interval_ms(),
            status_file: default_status_file(),
            log_level: default_log_level(),
        }
    }
}

impl DeviceSettings {
    pub fn freshness_window(&self) -> Duration {
        Duration::from_millis(self.freshness_window_ms)
    }
}

impl DaemonSettings {
    pub fn publish_interval(&self) -> Duration {
        Duration::from_millis(self.publish_interval_ms)
    }
}

/// Default config file location
pub fn get_config_path() -> PathBuf {
    paths::config_file()
}

/// Load and validate the config at `path`; defaults if the file does not exist
pub fn load_config(path: &Path) -> Result<OctoConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "No config file, using defaults");
        return Ok(OctoConfig::default());
    }

    validate_file_size(path)?;

    let content = fs::read_to_string(path).map_err(|e| OctoError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config: OctoConfig = serde_json::from_str(&content)?;
    validate_config(&config)?;

    debug!(path = %path.display(), "Loaded config");
    Ok(config)
}

/// Validate and write the config atomically (temp file, then rename)
pub fn save_config(path: &Path, config: &OctoConfig) -> Result<()> {
    validate_config(config)?;

    let json = serde_json::to_string_pretty(config)?;
    write_atomic(path, json.as_bytes())
}

/// Write `bytes` to `path` via a sibling temp file, creating parent directories
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let write_err = |e| OctoError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let temp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&temp_path).map_err(write_err)?;
    file.write_all(bytes).map_err(write_err)?;
    file.sync_all().map_err(write_err)?;
    drop(file);

    fs::rename(&temp_path, path).map_err(write_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, OctoConfig::default());
        assert_eq!(config.device.freshness_window(), Duration::from_secs(2));
        assert_eq!(config.device.report_len, 226);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = OctoConfig::default();
        config.device.hidraw_path = Some(PathBuf::from("/dev/hidraw3"));
        config.daemon.publish_interval_ms = 500;
        config.daemon.status_file = None;
        save_config(&path, &config).unwrap();

        assert_eq!(load_config(&path).unwrap(), config);
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "device": { "hidraw_path": "/dev/hidraw1" } }"#).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.device.hidraw_path, Some(PathBuf::from("/dev/hidraw1")));
        assert_eq!(config.device.freshness_window_ms, 2000);
        assert_eq!(config.daemon, DaemonSettings::default());
    }

    #[test]
    fn test_broken_json_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_config(&path), Err(OctoError::JsonParse(_))));
    }

    #[test]
    fn test_zero_window_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "device": { "freshness_window_ms": 0 } }"#).unwrap();
        assert!(matches!(
            load_config(&path),
            Err(OctoError::InvalidConfig { field, .. }) if field == "device.freshness_window_ms"
        ));
    }
}
