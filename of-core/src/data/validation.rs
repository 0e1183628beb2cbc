//! Input validation for Octofan configuration
//!
//! Config files are small and trusted-ish, but a bad value here turns into
//! a daemon that reports everything stale or spins on the status file, so
//! reject it up front.

use std::path::Path;

use crate::constants::{device, limits};
use crate::data::OctoConfig;
use crate::error::{OctoError, Result};

/// Validate every field of a loaded config
pub fn validate_config(config: &OctoConfig) -> Result<()> {
    validate_freshness_window(config.device.freshness_window_ms)?;
    validate_report_len(config.device.report_len)?;
    validate_publish_interval(config.daemon.publish_interval_ms)?;

    if config.daemon.log_level.trim().is_empty() {
        return Err(OctoError::invalid_config("daemon.log_level", "must not be empty"));
    }

    if let Some(path) = &config.device.hidraw_path {
        if !path.is_absolute() {
            return Err(OctoError::invalid_config(
                "device.hidraw_path",
                format!("{} is not an absolute path", path.display()),
            ));
        }
    }

    Ok(())
}

pub fn validate_freshness_window(ms: u64) -> Result<()> {
    if ms == 0 {
        return Err(OctoError::invalid_config(
            "device.freshness_window_ms",
            "must be greater than zero",
        ));
    }
    Ok(())
}

/// Capture records must hold a whole status report and fit one read buffer
pub fn validate_report_len(len: usize) -> Result<()> {
    if !(device::MIN_REPORT_LEN..=device::MAX_REPORT_LEN).contains(&len) {
        return Err(OctoError::invalid_config(
            "device.report_len",
            format!(
                "{} is outside {}..={}",
                len,
                device::MIN_REPORT_LEN,
                device::MAX_REPORT_LEN
            ),
        ));
    }
    Ok(())
}

pub fn validate_publish_interval(ms: u64) -> Result<()> {
    if ms < limits::MIN_PUBLISH_INTERVAL_MS {
        return Err(OctoError::invalid_config(
            "daemon.publish_interval_ms",
            format!("must be at least {} ms", limits::MIN_PUBLISH_INTERVAL_MS),
        ));
    }
    Ok(())
}

/// Reject config files that are implausibly large before reading them
pub fn validate_file_size(path: &Path) -> Result<()> {
    let metadata = std::fs::metadata(path).map_err(|e| OctoError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    if metadata.len() > limits::MAX_CONFIG_SIZE {
        return Err(OctoError::config(format!(
            "config file exceeds maximum size of {} bytes",
            limits::MAX_CONFIG_SIZE
        )));
    }

    Ok(())
}
