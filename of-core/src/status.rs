//! Status document
//!
//! A JSON rendering of every channel plus the diagnostic identifiers, taken
//! from a single snapshot so all values belong to the same report. The
//! daemon publishes it; the CLI reads it back.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::constants::timing;
use crate::data::{write_atomic, SensorType, Unit};
use crate::device::OctoDevice;
use crate::error::{OctoError, Result};
use crate::layout;

/// One channel in the status document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelStatus {
    pub sensor: SensorType,
    pub index: usize,
    /// hwmon attribute name of the value, e.g. `temp1_input`
    pub attribute: String,
    pub label: String,
    pub unit: Unit,
    /// `None` when the cache is stale
    pub value: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDocument {
    pub device: String,
    /// Milliseconds since Unix epoch
    pub generated_at_ms: u64,
    pub fresh: bool,
    /// Age of the snapshot in milliseconds; `None` before the first report
    pub age_ms: Option<u64>,
    /// Window the writer judged freshness by
    #[serde(default = "default_freshness_window_ms")]
    pub freshness_window_ms: u64,
    pub serial_number: String,
    pub firmware_version: u16,
    pub power_cycles: u32,
    pub channels: Vec<ChannelStatus>,
}

fn default_freshness_window_ms() -> u64 {
    timing::millis(timing::DEFAULT_FRESHNESS_WINDOW)
}

impl StatusDocument {
    /// Capture the device's current state from a single cache view
    pub fn capture(device: &OctoDevice) -> Self {
        let cache = device.cache();
        let view = cache.view();
        let snapshot = &view.snapshot;
        let info = snapshot.info;

        let channels = SensorType::ALL
            .into_iter()
            .flat_map(SensorType::channels)
            .map(|channel| ChannelStatus {
                sensor: channel.sensor,
                index: channel.index,
                attribute: channel.attribute("input"),
                label: layout::label(channel.sensor, channel.index)
                    .unwrap_or_default()
                    .to_string(),
                unit: channel.unit(),
                value: if view.fresh {
                    snapshot.value(channel.sensor, channel.index)
                } else {
                    None
                },
            })
            .collect();

        Self {
            device: device.name().to_string(),
            generated_at_ms: now_millis(),
            fresh: view.fresh,
            age_ms: view.age.map(timing::millis),
            freshness_window_ms: timing::millis(cache.freshness_window()),
            serial_number: info.serial_string(),
            firmware_version: info.firmware_version,
            power_cycles: info.power_cycles,
            channels,
        }
    }

    /// Look up a channel by hwmon attribute name
    pub fn channel(&self, attribute: &str) -> Option<&ChannelStatus> {
        self.channels.iter().find(|c| c.attribute == attribute)
    }

    /// Age the document to `now_ms` (milliseconds since Unix epoch)
    ///
    /// The snapshot's age grows by the time since the document was written.
    /// Once that passes the freshness window the document is marked stale and
    /// its values are dropped, so a file left behind by a dead writer never
    /// reads as live. Returns whether the document is still fresh.
    pub fn expire_at(&mut self, now_ms: u64) -> bool {
        let elapsed = now_ms.saturating_sub(self.generated_at_ms);
        self.age_ms = self.age_ms.map(|age| age.saturating_add(elapsed));

        let within = matches!(self.age_ms, Some(age) if age <= self.freshness_window_ms);
        if self.fresh && !within {
            self.fresh = false;
            for channel in &mut self.channels {
                channel.value = None;
            }
        }
        self.fresh
    }

    /// `expire_at` against the system clock
    pub fn expire(&mut self) -> bool {
        self.expire_at(now_millis())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_json_compact(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Write atomically so readers never see a half-written document
    pub fn write_to(&self, path: &Path) -> Result<()> {
        write_atomic(path, self.to_json()?.as_bytes())
    }

    /// Read a document as written, without aging it
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| OctoError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Read a document and age it to now
    pub fn load_current(path: &Path) -> Result<Self> {
        let mut doc = Self::load(path)?;
        doc.expire();
        Ok(doc)
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(timing::millis)
        .unwrap_or(0)
}
