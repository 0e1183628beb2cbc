//! Per-device context
//!
//! One [`OctoDevice`] per attached controller. The frame source hands it raw
//! reports, readers query it; nothing is global.

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, trace, warn};

use crate::cache::{Clock, SensorCache, SystemClock};
use crate::constants::{device, timing};
use crate::data::DeviceSettings;
use crate::decoder::{decode, Decoded};
use crate::error::Result;
use crate::layout;

/// What happened to a frame handed to [`OctoDevice::handle_frame`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Status report decoded and installed
    Updated,
    /// Not a status report; cache untouched
    Ignored { report_id: u8 },
}

pub struct OctoDevice {
    name: String,
    cache: SensorCache,
}

impl OctoDevice {
    /// Create a device context. Fails if the field layout is inconsistent.
    pub fn new(freshness_window: Duration) -> Result<Self> {
        Self::with_clock(freshness_window, Arc::new(SystemClock))
    }

    pub fn with_clock(freshness_window: Duration, clock: Arc<dyn Clock>) -> Result<Self> {
        layout::validate(device::MIN_REPORT_LEN)?;
        info!(
            window_ms = timing::millis(freshness_window),
            "Octo device context ready"
        );
        Ok(Self {
            name: device::NAME.to_string(),
            cache: SensorCache::with_clock(freshness_window, clock),
        })
    }

    pub fn from_settings(settings: &DeviceSettings) -> Result<Self> {
        Self::new(settings.freshness_window())
    }

    /// Device name as registered with the sensor registry
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cache(&self) -> &SensorCache {
        &self.cache
    }

    /// Decode a raw report and, if it is a status report, install it
    ///
    /// Malformed frames leave the cache exactly as it was.
    pub fn handle_frame(&self, frame: &[u8]) -> Result<FrameOutcome> {
        match decode(frame) {
            Ok(Decoded::Report(snapshot)) => {
                self.cache.replace(snapshot);
                trace!(len = frame.len(), "Status report applied");
                Ok(FrameOutcome::Updated)
            }
            Ok(Decoded::Ignored { report_id }) => Ok(FrameOutcome::Ignored { report_id }),
            Err(e) => {
                warn!("Dropping frame: {}", e);
                Err(e)
            }
        }
    }
}
