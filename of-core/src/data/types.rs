//! Core data types for Octofan
//!
//! Sensor types, channel references and the decoded snapshot.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{OctoError, Result};

/// Sensor type groups reported by the Octo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorType {
    Temperature,
    Speed,
    Power,
    Voltage,
    Current,
}

impl SensorType {
    /// Every sensor type, in hwmon registration order
    pub const ALL: [SensorType; 5] = [
        SensorType::Temperature,
        SensorType::Speed,
        SensorType::Power,
        SensorType::Voltage,
        SensorType::Current,
    ];

    /// Number of channels the device reports for this type
    pub const fn channel_count(self) -> usize {
        match self {
            SensorType::Temperature => 4,
            SensorType::Speed => 9,
            SensorType::Power => 8,
            SensorType::Voltage => 9,
            SensorType::Current => 8,
        }
    }

    /// Unit of the scaled values. Speed channel 0 is flow, see [`Channel::unit`].
    pub const fn unit(self) -> Unit {
        match self {
            SensorType::Temperature => Unit::MilliCelsius,
            SensorType::Speed => Unit::Rpm,
            SensorType::Power => Unit::Microwatt,
            SensorType::Voltage => Unit::Millivolt,
            SensorType::Current => Unit::Milliamp,
        }
    }

    /// hwmon attribute prefix (`temp`, `fan`, `power`, `in`, `curr`)
    pub const fn hwmon_prefix(self) -> &'static str {
        match self {
            SensorType::Temperature => "temp",
            SensorType::Speed => "fan",
            SensorType::Power => "power",
            SensorType::Voltage => "in",
            SensorType::Current => "curr",
        }
    }

    /// Number hwmon gives the first channel: `in` counts from 0, everything else from 1
    pub const fn hwmon_base(self) -> usize {
        match self {
            SensorType::Voltage => 0,
            _ => 1,
        }
    }

    /// All channels of this type
    pub fn channels(self) -> impl Iterator<Item = Channel> {
        (0..self.channel_count()).map(move |index| Channel { sensor: self, index })
    }

    /// Fail with `ChannelOutOfRange` unless `index` addresses a channel of this type
    pub fn check_index(self, index: usize) -> Result<()> {
        if index < self.channel_count() {
            Ok(())
        } else {
            Err(OctoError::out_of_range(self.hwmon_prefix(), index, self.channel_count()))
        }
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hwmon_prefix())
    }
}

impl FromStr for SensorType {
    type Err = OctoError;

    /// Accepts hwmon prefixes and long names, case-insensitively
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "temp" | "temperature" => Ok(SensorType::Temperature),
            "fan" | "speed" => Ok(SensorType::Speed),
            "power" => Ok(SensorType::Power),
            "in" | "voltage" => Ok(SensorType::Voltage),
            "curr" | "current" => Ok(SensorType::Current),
            _ => Err(OctoError::UnsupportedSensor(s.to_string())),
        }
    }
}

/// Units of scaled sensor values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    MilliCelsius,
    Rpm,
    LitersPerHour,
    Microwatt,
    Millivolt,
    Milliamp,
}

impl Unit {
    /// Short symbol of the unit itself
    pub const fn symbol(self) -> &'static str {
        match self {
            Unit::MilliCelsius => "m°C",
            Unit::Rpm => "RPM",
            Unit::LitersPerHour => "l/h",
            Unit::Microwatt => "µW",
            Unit::Millivolt => "mV",
            Unit::Milliamp => "mA",
        }
    }
}

/// A single addressable sensor: type plus 0-based index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Channel {
    pub sensor: SensorType,
    pub index: usize,
}

impl Channel {
    /// Build a channel reference, rejecting indices past the type's channel count
    pub fn new(sensor: SensorType, index: usize) -> Result<Self> {
        sensor.check_index(index)?;
        Ok(Self { sensor, index })
    }

    /// Unit of this channel's value
    pub fn unit(&self) -> Unit {
        match (self.sensor, self.index) {
            (SensorType::Speed, 0) => Unit::LitersPerHour,
            (sensor, _) => sensor.unit(),
        }
    }

    /// Number used in hwmon attribute names for this channel
    pub fn hwmon_number(&self) -> usize {
        self.index + self.sensor.hwmon_base()
    }

    /// hwmon attribute name, e.g. `fan3_input` or `in0_label`
    pub fn attribute(&self, suffix: &str) -> String {
        format!("{}{}_{}", self.sensor.hwmon_prefix(), self.hwmon_number(), suffix)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.sensor.hwmon_prefix(), self.hwmon_number())
    }
}

/// Auxiliary identifiers carried by every status report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub serial_number: [u16; 2],
    pub firmware_version: u16,
    /// How many times the device was powered on
    pub power_cycles: u32,
}

impl DeviceInfo {
    /// Serial number as two zero-padded 5-digit groups, e.g. `01234-05678`
    pub fn serial_string(&self) -> String {
        format!("{:05}-{:05}", self.serial_number[0], self.serial_number[1])
    }
}

/// Decoded, scaled sensor values from one status report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Millidegree Celsius
    pub temperatures: [i32; 4],
    /// Index 0 is flow in l/h, 1..=8 are fan RPM
    pub speeds: [u32; 9],
    /// Microwatt
    pub power: [u32; 8],
    /// Millivolt; index 0 is VCC
    pub voltages: [u32; 9],
    /// Milliamp
    pub currents: [u32; 8],
    pub info: DeviceInfo,
}

impl Snapshot {
    /// Value of one channel, or `None` if the index is out of range
    pub fn value(&self, sensor: SensorType, index: usize) -> Option<i64> {
        match sensor {
            SensorType::Temperature => self.temperatures.get(index).map(|&v| i64::from(v)),
            SensorType::Speed => self.speeds.get(index).map(|&v| i64::from(v)),
            SensorType::Power => self.power.get(index).map(|&v| i64::from(v)),
            SensorType::Voltage => self.voltages.get(index).map(|&v| i64::from(v)),
            SensorType::Current => self.currents.get(index).map(|&v| i64::from(v)),
        }
    }

    /// Store a scaled value into its slot
    ///
    /// Fails if the index is out of range or the value does not fit the slot's
    /// integer type.
    pub fn set(&mut self, sensor: SensorType, index: usize, value: i64) -> Result<()> {
        sensor.check_index(index)?;
        match sensor {
            SensorType::Temperature => self.temperatures[index] = narrow(sensor, index, value)?,
            SensorType::Speed => self.speeds[index] = narrow(sensor, index, value)?,
            SensorType::Power => self.power[index] = narrow(sensor, index, value)?,
            SensorType::Voltage => self.voltages[index] = narrow(sensor, index, value)?,
            SensorType::Current => self.currents[index] = narrow(sensor, index, value)?,
        }
        Ok(())
    }
}

fn narrow<T: TryFrom<i64>>(sensor: SensorType, index: usize, value: i64) -> Result<T> {
    T::try_from(value).map_err(|_| {
        OctoError::InvalidLayout(format!(
            "value {} does not fit {}{} slot",
            value,
            sensor.hwmon_prefix(),
            index + sensor.hwmon_base()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_counts() {
        let counts: Vec<usize> = SensorType::ALL.iter().map(|s| s.channel_count()).collect();
        assert_eq!(counts, vec![4, 9, 8, 9, 8]);
    }

    #[test]
    fn test_sensor_type_from_str() {
        assert_eq!("temp".parse::<SensorType>().unwrap(), SensorType::Temperature);
        assert_eq!("Voltage".parse::<SensorType>().unwrap(), SensorType::Voltage);
        assert_eq!("curr".parse::<SensorType>().unwrap(), SensorType::Current);
        assert!(matches!(
            "pwm".parse::<SensorType>(),
            Err(OctoError::UnsupportedSensor(name)) if name == "pwm"
        ));
    }

    #[test]
    fn test_channel_attribute_numbering() {
        assert_eq!(Channel::new(SensorType::Temperature, 0).unwrap().attribute("input"), "temp1_input");
        assert_eq!(Channel::new(SensorType::Voltage, 0).unwrap().attribute("label"), "in0_label");
        assert_eq!(Channel::new(SensorType::Current, 7).unwrap().to_string(), "curr8");
    }

    #[test]
    fn test_channel_rejects_out_of_range() {
        assert!(Channel::new(SensorType::Temperature, 4).is_err());
        assert!(Channel::new(SensorType::Speed, 8).is_ok());
        assert!(Channel::new(SensorType::Speed, 9).is_err());
    }

    #[test]
    fn test_flow_channel_unit() {
        assert_eq!(Channel::new(SensorType::Speed, 0).unwrap().unit(), Unit::LitersPerHour);
        assert_eq!(Channel::new(SensorType::Speed, 1).unwrap().unit(), Unit::Rpm);
    }

    #[test]
    fn test_snapshot_set_and_value() {
        let mut snapshot = Snapshot::default();
        snapshot.set(SensorType::Temperature, 2, -150).unwrap();
        snapshot.set(SensorType::Power, 7, 1_500_000).unwrap();

        assert_eq!(snapshot.value(SensorType::Temperature, 2), Some(-150));
        assert_eq!(snapshot.value(SensorType::Power, 7), Some(1_500_000));
        assert_eq!(snapshot.value(SensorType::Power, 8), None);
    }

    #[test]
    fn test_snapshot_set_rejects_bad_values() {
        let mut snapshot = Snapshot::default();
        assert!(snapshot.set(SensorType::Speed, 1, -1).is_err());
        assert!(snapshot.set(SensorType::Current, 8, 1).is_err());
        assert_eq!(snapshot, Snapshot::default());
    }

    #[test]
    fn test_serial_string_padding() {
        let info = DeviceInfo {
            serial_number: [1234, 56],
            firmware_version: 1019,
            power_cycles: 42,
        };
        assert_eq!(info.serial_string(), "01234-00056");
    }
}
