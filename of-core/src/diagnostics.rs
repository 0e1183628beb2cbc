//! Auxiliary read-only identifiers
//!
//! Serial number, firmware version and power-cycle count come with every
//! status report but are informational, so they are served regardless of the
//! freshness window.

use crate::cache::SensorCache;
use crate::data::DeviceInfo;
use crate::device::OctoDevice;

/// Names of the diagnostic entries, in display order
pub const ENTRIES: [&str; 3] = ["serial_number", "firmware_version", "power_cycles"];

/// Read-only view of the cached identifiers
#[derive(Clone, Copy)]
pub struct Diagnostics<'a> {
    cache: &'a SensorCache,
}

impl<'a> Diagnostics<'a> {
    pub fn new(cache: &'a SensorCache) -> Self {
        Self { cache }
    }

    fn info(&self) -> DeviceInfo {
        self.cache.info()
    }

    /// `%05u-%05u`
    pub fn serial_number(&self) -> String {
        self.info().serial_string()
    }

    pub fn firmware_version(&self) -> String {
        self.info().firmware_version.to_string()
    }

    pub fn power_cycles(&self) -> String {
        self.info().power_cycles.to_string()
    }

    /// Look up an entry by name
    pub fn entry(&self, name: &str) -> Option<String> {
        match name {
            "serial_number" => Some(self.serial_number()),
            "firmware_version" => Some(self.firmware_version()),
            "power_cycles" => Some(self.power_cycles()),
            _ => None,
        }
    }

    /// All entries as (name, value) pairs
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        ENTRIES
            .iter()
            .filter_map(|&name| self.entry(name).map(|value| (name, value)))
            .collect()
    }
}

impl OctoDevice {
    pub fn diagnostics(&self) -> Diagnostics<'_> {
        Diagnostics::new(self.cache())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::testing::ManualClock;
    use crate::data::Snapshot;
    use std::time::Duration;

    #[test]
    fn test_diagnostics_outlive_freshness() {
        let clock = ManualClock::new();
        let dev = OctoDevice::with_clock(Duration::from_secs(2), clock.clone()).unwrap();

        let mut snapshot = Snapshot::default();
        snapshot.info.serial_number = [7, 31337];
        snapshot.info.firmware_version = 1019;
        snapshot.info.power_cycles = 250;
        dev.cache().replace(snapshot);
        clock.advance(Duration::from_secs(30));

        let diag = dev.diagnostics();
        assert_eq!(diag.serial_number(), "00007-31337");
        assert_eq!(diag.firmware_version(), "1019");
        assert_eq!(diag.power_cycles(), "250");
        assert_eq!(diag.entry("uptime"), None);
    }

    #[test]
    fn test_entries_before_any_report() {
        let dev = OctoDevice::new(Duration::from_secs(2)).unwrap();
        let entries = dev.diagnostics().entries();
        assert_eq!(
            entries,
            vec![
                ("serial_number", "00000-00000".to_string()),
                ("firmware_version", "0".to_string()),
                ("power_cycles", "0".to_string()),
            ]
        );
    }
}
