//! Status report decoder
//!
//! Turns one raw HID input report into a complete [`Snapshot`]. The report id
//! is the first byte; reports with any other id are expected on the same
//! interface and are skipped, not rejected.

use tracing::{debug, trace};

use crate::constants::device::{MIN_REPORT_LEN, STATUS_REPORT_ID};
use crate::data::{DeviceInfo, SensorType, Snapshot};
use crate::error::{OctoError, Result};
use crate::layout::{self, FieldSpec};

/// Result of decoding one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// A status report, fully decoded
    Report(Snapshot),
    /// Some other report; nothing to apply
    Ignored { report_id: u8 },
}

/// Decode a raw report
///
/// The snapshot is built locally and only returned once every field has been
/// extracted, so a failure never yields a partially filled snapshot.
pub fn decode(frame: &[u8]) -> Result<Decoded> {
    let Some(&report_id) = frame.first() else {
        return Err(OctoError::MalformedFrame {
            len: 0,
            required: MIN_REPORT_LEN,
        });
    };

    if report_id != STATUS_REPORT_ID {
        debug!(report_id, len = frame.len(), "Ignoring non-status report");
        return Ok(Decoded::Ignored { report_id });
    }

    if frame.len() < MIN_REPORT_LEN {
        return Err(OctoError::MalformedFrame {
            len: frame.len(),
            required: MIN_REPORT_LEN,
        });
    }

    let mut snapshot = Snapshot {
        info: decode_info(frame)?,
        ..Snapshot::default()
    };

    for sensor in SensorType::ALL {
        for (index, channel) in layout::channels(sensor).iter().enumerate() {
            let value = channel.field.extract(frame)?;
            snapshot.set(sensor, index, value)?;
        }
    }

    trace!(
        firmware = snapshot.info.firmware_version,
        power_cycles = snapshot.info.power_cycles,
        "Decoded status report"
    );

    Ok(Decoded::Report(snapshot))
}

fn decode_info(frame: &[u8]) -> Result<DeviceInfo> {
    let info = &layout::INFO;
    Ok(DeviceInfo {
        serial_number: [
            read_u16(&info.serial_number[0], frame)?,
            read_u16(&info.serial_number[1], frame)?,
        ],
        firmware_version: read_u16(&info.firmware_version, frame)?,
        power_cycles: read_u32(&info.power_cycles, frame)?,
    })
}

fn read_u16(field: &FieldSpec, frame: &[u8]) -> Result<u16> {
    let value = field.extract(frame)?;
    u16::try_from(value).map_err(|_| {
        OctoError::InvalidLayout(format!("field at offset {} is not a u16", field.offset))
    })
}

fn read_u32(field: &FieldSpec, frame: &[u8]) -> Result<u32> {
    let value = field.extract(frame)?;
    u32::try_from(value).map_err(|_| {
        OctoError::InvalidLayout(format!("field at offset {} is not a u32", field.offset))
    })
}
