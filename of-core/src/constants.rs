//! Constants and configuration values for Octofan
//!
//! Centralizes report ids, timing defaults, paths and unit scales.
//! Byte offsets are not here: they live in the field layout table.

use std::time::Duration;

/// System paths
pub mod paths {
    /// Configuration directory
    pub const CONFIG_DIR: &str = "/etc/octofan";

    /// Configuration file name inside `CONFIG_DIR`
    pub const CONFIG_FILE: &str = "config.json";

    /// Default location of the daemon's status document
    pub const STATUS_FILE: &str = "/run/octofan/status.json";

    /// Journald socket; present on systemd hosts
    pub const JOURNALD_SOCKET: &str = "/run/systemd/journal/socket";

    /// Default config file path
    pub fn config_file() -> std::path::PathBuf {
        std::path::Path::new(CONFIG_DIR).join(CONFIG_FILE)
    }
}

/// Device identification and report framing
pub mod device {
    /// Name the device registers under (hwmon `name`)
    pub const NAME: &str = "octo";

    /// USB vendor id of Aquacomputer
    pub const USB_VENDOR_ID: u16 = 0x0c70;

    /// USB product id of the Octo
    pub const USB_PRODUCT_ID: u16 = 0xf011;

    /// Report id of the periodic status report
    pub const STATUS_REPORT_ID: u8 = 0x01;

    /// Smallest status report that carries every declared field
    pub const MIN_REPORT_LEN: usize = 226;

    /// Upper bound for a single hidraw read
    pub const MAX_REPORT_LEN: usize = 1024;
}

/// Timing defaults
pub mod timing {
    use super::*;

    /// Maximum age of the cached snapshot before reads report stale.
    /// The device reports once per second; two seconds leaves one report of slack.
    pub const DEFAULT_FRESHNESS_WINDOW: Duration = Duration::from_millis(2000);

    /// How often the daemon republishes the status document
    pub const DEFAULT_PUBLISH_INTERVAL: Duration = Duration::from_millis(1000);

    /// Reader back-off after a failed hidraw read
    pub const READ_RETRY_DELAY: Duration = Duration::from_millis(500);

    /// Whole milliseconds, saturating at `u64::MAX`
    pub fn millis(d: Duration) -> u64 {
        u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Environment variables
pub mod env {
    /// Log filter override (tracing EnvFilter syntax)
    pub const LOG: &str = "OCTOFAN_LOG";
}

/// Sensor attribute visibility mode (read-only for everyone)
pub const VISIBILITY_READ_ONLY: u32 = 0o444;

/// Configuration limits
pub mod limits {
    /// Maximum config file size in bytes
    pub const MAX_CONFIG_SIZE: u64 = 64 * 1024;

    /// Shortest accepted publish interval in milliseconds
    pub const MIN_PUBLISH_INTERVAL_MS: u64 = 100;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millis_saturates() {
        assert_eq!(timing::millis(timing::DEFAULT_FRESHNESS_WINDOW), 2000);
        assert_eq!(timing::millis(Duration::from_micros(1999)), 1);
        assert_eq!(timing::millis(Duration::MAX), u64::MAX);
    }
}
