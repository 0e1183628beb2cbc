//! Field layout of the Octo status report
//!
//! Every value the decoder produces is described here: where it sits in the
//! report, how wide it is, how it is scaled, and what it is called. The decoder
//! has no offsets of its own.
//!
//! ```text
//! offset  0       report id (0x01)
//!         3, 5    serial number parts        u16
//!         13      firmware version           u16
//!         24      power cycles               u32
//!         61..67  temperatures               i16 x10 -> m°C
//!         117     VCC                        u16 x10 -> mV
//!         123     flow                       u16 /10 -> l/h
//!         127..   per-fan blocks of 13 bytes: voltage, current, power, speed
//! ```

use crate::constants::device::MIN_REPORT_LEN;
use crate::data::SensorType;
use crate::error::{OctoError, Result};

/// Byte order of a multi-byte field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    BigEndian,
    LittleEndian,
}

/// Width of a field in the report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    U16,
    U32,
}

impl Width {
    pub const fn bytes(self) -> usize {
        match self {
            Width::U16 => 2,
            Width::U32 => 4,
        }
    }
}

/// Conversion from the raw register value to the reported unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    Raw,
    Mul(i64),
    /// Integer division, truncating toward zero
    Div(i64),
}

impl Scale {
    pub const fn apply(self, raw: i64) -> i64 {
        match self {
            Scale::Raw => raw,
            Scale::Mul(factor) => raw * factor,
            Scale::Div(divisor) => raw / divisor,
        }
    }
}

/// Location and interpretation of one field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub offset: usize,
    pub width: Width,
    pub order: ByteOrder,
    pub scale: Scale,
    pub signed: bool,
}

impl FieldSpec {
    const fn be16(offset: usize, scale: Scale) -> Self {
        Self {
            offset,
            width: Width::U16,
            order: ByteOrder::BigEndian,
            scale,
            signed: false,
        }
    }

    const fn be16_signed(offset: usize, scale: Scale) -> Self {
        Self {
            offset,
            width: Width::U16,
            order: ByteOrder::BigEndian,
            scale,
            signed: true,
        }
    }

    const fn be32(offset: usize) -> Self {
        Self {
            offset,
            width: Width::U32,
            order: ByteOrder::BigEndian,
            scale: Scale::Raw,
            signed: false,
        }
    }

    /// One past the last byte of this field
    pub const fn end(&self) -> usize {
        self.offset + self.width.bytes()
    }

    /// Read the raw register value (sign-extended when signed), without scaling
    pub fn read_raw(&self, frame: &[u8]) -> Result<i64> {
        let bytes = frame
            .get(self.offset..self.end())
            .ok_or(OctoError::MalformedFrame {
                len: frame.len(),
                required: self.end(),
            })?;

        let value = match self.width {
            Width::U16 => {
                let pair = [bytes[0], bytes[1]];
                let raw = match self.order {
                    ByteOrder::BigEndian => u16::from_be_bytes(pair),
                    ByteOrder::LittleEndian => u16::from_le_bytes(pair),
                };
                if self.signed {
                    i64::from(raw as i16)
                } else {
                    i64::from(raw)
                }
            }
            Width::U32 => {
                let quad = [bytes[0], bytes[1], bytes[2], bytes[3]];
                let raw = match self.order {
                    ByteOrder::BigEndian => u32::from_be_bytes(quad),
                    ByteOrder::LittleEndian => u32::from_le_bytes(quad),
                };
                if self.signed {
                    i64::from(raw as i32)
                } else {
                    i64::from(raw)
                }
            }
        };
        Ok(value)
    }

    /// Read and scale the field
    pub fn extract(&self, frame: &[u8]) -> Result<i64> {
        Ok(self.scale.apply(self.read_raw(frame)?))
    }
}

/// Layout entry for one sensor channel
#[derive(Debug, Clone, Copy)]
pub struct ChannelLayout {
    pub field: FieldSpec,
    pub label: &'static str,
}

const fn temp(offset: usize, label: &'static str) -> ChannelLayout {
    ChannelLayout {
        field: FieldSpec::be16_signed(offset, Scale::Mul(10)),
        label,
    }
}

const fn scaled(offset: usize, scale: Scale, label: &'static str) -> ChannelLayout {
    ChannelLayout {
        field: FieldSpec::be16(offset, scale),
        label,
    }
}

static TEMPERATURES: [ChannelLayout; 4] = [
    temp(61, "Temp1"),
    temp(63, "Temp2"),
    temp(65, "Temp3"),
    temp(67, "Temp4"),
];

static SPEEDS: [ChannelLayout; 9] = [
    scaled(123, Scale::Div(10), "Flow speed [l/h]"),
    scaled(133, Scale::Raw, "Fan1 speed"),
    scaled(146, Scale::Raw, "Fan2 speed"),
    scaled(159, Scale::Raw, "Fan3 speed"),
    scaled(172, Scale::Raw, "Fan4 speed"),
    scaled(185, Scale::Raw, "Fan5 speed"),
    scaled(198, Scale::Raw, "Fan6 speed"),
    scaled(211, Scale::Raw, "Fan7 speed"),
    scaled(224, Scale::Raw, "Fan8 speed"),
];

// Centiwatt -> microwatt
static POWER: [ChannelLayout; 8] = [
    scaled(131, Scale::Mul(10_000), "Fan1 power"),
    scaled(144, Scale::Mul(10_000), "Fan2 power"),
    scaled(157, Scale::Mul(10_000), "Fan3 power"),
    scaled(170, Scale::Mul(10_000), "Fan4 power"),
    scaled(183, Scale::Mul(10_000), "Fan5 power"),
    scaled(196, Scale::Mul(10_000), "Fan6 power"),
    scaled(209, Scale::Mul(10_000), "Fan7 power"),
    scaled(222, Scale::Mul(10_000), "Fan8 power"),
];

static VOLTAGES: [ChannelLayout; 9] = [
    scaled(117, Scale::Mul(10), "VCC"),
    scaled(127, Scale::Mul(10), "Fan1 voltage"),
    scaled(140, Scale::Mul(10), "Fan2 voltage"),
    scaled(153, Scale::Mul(10), "Fan3 voltage"),
    scaled(166, Scale::Mul(10), "Fan4 voltage"),
    scaled(179, Scale::Mul(10), "Fan5 voltage"),
    scaled(192, Scale::Mul(10), "Fan6 voltage"),
    scaled(205, Scale::Mul(10), "Fan7 voltage"),
    scaled(218, Scale::Mul(10), "Fan8 voltage"),
];

static CURRENTS: [ChannelLayout; 8] = [
    scaled(129, Scale::Raw, "Fan1 current"),
    scaled(142, Scale::Raw, "Fan2 current"),
    scaled(155, Scale::Raw, "Fan3 current"),
    scaled(168, Scale::Raw, "Fan4 current"),
    scaled(181, Scale::Raw, "Fan5 current"),
    scaled(194, Scale::Raw, "Fan6 current"),
    scaled(207, Scale::Raw, "Fan7 current"),
    scaled(220, Scale::Raw, "Fan8 current"),
];

/// Fields that identify the device rather than measure anything
#[derive(Debug, Clone, Copy)]
pub struct InfoLayout {
    pub serial_number: [FieldSpec; 2],
    pub firmware_version: FieldSpec,
    pub power_cycles: FieldSpec,
}

pub static INFO: InfoLayout = InfoLayout {
    serial_number: [FieldSpec::be16(3, Scale::Raw), FieldSpec::be16(5, Scale::Raw)],
    firmware_version: FieldSpec::be16(13, Scale::Raw),
    power_cycles: FieldSpec::be32(24),
};

impl InfoLayout {
    fn fields(&self) -> [FieldSpec; 4] {
        [
            self.serial_number[0],
            self.serial_number[1],
            self.firmware_version,
            self.power_cycles,
        ]
    }
}

/// Layout entries for every channel of a sensor type
pub fn channels(sensor: SensorType) -> &'static [ChannelLayout] {
    match sensor {
        SensorType::Temperature => &TEMPERATURES,
        SensorType::Speed => &SPEEDS,
        SensorType::Power => &POWER,
        SensorType::Voltage => &VOLTAGES,
        SensorType::Current => &CURRENTS,
    }
}

pub fn field(sensor: SensorType, index: usize) -> Option<&'static FieldSpec> {
    channels(sensor).get(index).map(|c| &c.field)
}

pub fn label(sensor: SensorType, index: usize) -> Option<&'static str> {
    channels(sensor).get(index).map(|c| c.label)
}

fn all_fields() -> impl Iterator<Item = FieldSpec> {
    SensorType::ALL
        .into_iter()
        .flat_map(|sensor| channels(sensor).iter().map(|c| c.field))
        .chain(INFO.fields())
}

/// Shortest report that holds every declared field
pub fn required_len() -> usize {
    all_fields().map(|f| f.end()).max().unwrap_or(1)
}

/// Check the table against itself and against `min_len`
///
/// Every sensor type must have one entry per channel with a non-empty label,
/// no field may touch the report id byte or run past `min_len`, and no two
/// fields may overlap.
pub fn validate(min_len: usize) -> Result<()> {
    for sensor in SensorType::ALL {
        check_channels(sensor, channels(sensor))?;
    }
    let fields: Vec<FieldSpec> = all_fields().collect();
    check_fields(&fields, min_len)
}

/// One entry per channel, each with a non-empty label
fn check_channels(sensor: SensorType, entries: &[ChannelLayout]) -> Result<()> {
    if entries.len() != sensor.channel_count() {
        return Err(OctoError::InvalidLayout(format!(
            "{} has {} layout entries for {} channels",
            sensor,
            entries.len(),
            sensor.channel_count()
        )));
    }
    if let Some(pos) = entries.iter().position(|c| c.label.trim().is_empty()) {
        return Err(OctoError::InvalidLayout(format!(
            "{}{} has an empty label",
            sensor.hwmon_prefix(),
            pos + sensor.hwmon_base()
        )));
    }
    Ok(())
}

/// Fields stay clear of the report id, inside `min_len`, and apart
fn check_fields(fields: &[FieldSpec], min_len: usize) -> Result<()> {
    let mut spans: Vec<(usize, usize)> = fields.iter().map(|f| (f.offset, f.end())).collect();
    spans.sort_unstable();

    for &(start, end) in &spans {
        if start == 0 {
            return Err(OctoError::InvalidLayout(format!(
                "field at offset {} overlaps the report id",
                start
            )));
        }
        if end > min_len {
            return Err(OctoError::InvalidLayout(format!(
                "field at offset {} ends at {}, past the {}-byte report",
                start, end, min_len
            )));
        }
    }

    for pair in spans.windows(2) {
        if pair[1].0 < pair[0].1 {
            return Err(OctoError::InvalidLayout(format!(
                "fields at offsets {} and {} overlap",
                pair[0].0, pair[1].0
            )));
        }
    }

    Ok(())
}

/// Validate against the device's minimum report length
pub fn validate_default() -> Result<()> {
    validate(MIN_REPORT_LEN)
}
