//! Query dispatch for the sensor registry
//!
//! Stateless request/response over the device's cache and the layout table.
//! Values go through the freshness check; labels never do. Nothing here can
//! write to the device.

use crate::constants::VISIBILITY_READ_ONLY;
use crate::data::{Channel, SensorType};
use crate::device::OctoDevice;
use crate::error::{OctoError, Result};
use crate::layout;

/// Which file of a channel an attribute name refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Input,
    Label,
}

impl AttributeKind {
    pub const fn suffix(self) -> &'static str {
        match self {
            AttributeKind::Input => "input",
            AttributeKind::Label => "label",
        }
    }
}

/// Parse an hwmon attribute name such as `fan3_input` or `in0_label`
///
/// An unknown prefix is an unsupported sensor type; a channel number past
/// the type's count is out of range; anything else malformed is an unknown
/// attribute.
pub fn parse_attribute(name: &str) -> Result<(Channel, AttributeKind)> {
    let (head, suffix) = name.split_once('_').unwrap_or((name, ""));
    let digits_at = head.find(|c: char| c.is_ascii_digit()).unwrap_or(head.len());
    let (prefix, number) = head.split_at(digits_at);

    let sensor = SensorType::ALL
        .into_iter()
        .find(|s| s.hwmon_prefix() == prefix)
        .ok_or_else(|| OctoError::UnsupportedSensor(prefix.to_string()))?;

    let number: usize = number
        .parse()
        .map_err(|_| OctoError::UnknownAttribute(name.to_string()))?;
    let index = number
        .checked_sub(sensor.hwmon_base())
        .ok_or_else(|| OctoError::UnknownAttribute(name.to_string()))?;
    let channel = Channel::new(sensor, index)?;

    let kind = match suffix {
        "input" => AttributeKind::Input,
        "label" => AttributeKind::Label,
        _ => return Err(OctoError::UnknownAttribute(name.to_string())),
    };

    Ok((channel, kind))
}

impl OctoDevice {
    /// Current value of a channel in its scaled unit
    pub fn get_value(&self, sensor: SensorType, index: usize) -> Result<i64> {
        self.cache().read(sensor, index)
    }

    /// Static label of a channel
    pub fn get_label(&self, sensor: SensorType, index: usize) -> Result<&'static str> {
        sensor.check_index(index)?;
        layout::label(sensor, index).ok_or_else(|| {
            OctoError::out_of_range(sensor.hwmon_prefix(), index, sensor.channel_count())
        })
    }

    /// File mode the registry should expose a channel with
    pub fn visibility(&self, _channel: Channel) -> u32 {
        VISIBILITY_READ_ONLY
    }

    /// Read an attribute by hwmon name, formatted the way sysfs would show it
    pub fn read_attribute(&self, name: &str) -> Result<String> {
        let (channel, kind) = parse_attribute(name)?;
        match kind {
            AttributeKind::Input => Ok(self.get_value(channel.sensor, channel.index)?.to_string()),
            AttributeKind::Label => Ok(self.get_label(channel.sensor, channel.index)?.to_string()),
        }
    }

    /// Every attribute name this device exposes
    pub fn attributes(&self) -> Vec<String> {
        SensorType::ALL
            .into_iter()
            .flat_map(SensorType::channels)
            .flat_map(|channel| {
                [AttributeKind::Input, AttributeKind::Label]
                    .map(|kind| channel.attribute(kind.suffix()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::device::{MIN_REPORT_LEN, STATUS_REPORT_ID};
    use std::time::Duration;

    fn device_with_report() -> OctoDevice {
        let dev = OctoDevice::new(Duration::from_secs(2)).unwrap();
        let mut frame = vec![0u8; MIN_REPORT_LEN];
        frame[0] = STATUS_REPORT_ID;
        frame[117..119].copy_from_slice(&1210u16.to_be_bytes());
        frame[133..135].copy_from_slice(&3028u16.to_be_bytes());
        dev.handle_frame(&frame).unwrap();
        dev
    }

    #[test]
    fn test_parse_attribute() {
        let (channel, kind) = parse_attribute("fan2_input").unwrap();
        assert_eq!(channel, Channel::new(SensorType::Speed, 1).unwrap());
        assert_eq!(kind, AttributeKind::Input);

        let (channel, kind) = parse_attribute("in0_label").unwrap();
        assert_eq!(channel, Channel::new(SensorType::Voltage, 0).unwrap());
        assert_eq!(kind, AttributeKind::Label);
    }

    #[test]
    fn test_parse_attribute_errors() {
        assert!(matches!(parse_attribute("pwm1"), Err(OctoError::UnsupportedSensor(p)) if p == "pwm"));
        assert!(matches!(parse_attribute("temp5_input"), Err(OctoError::ChannelOutOfRange { .. })));
        assert!(matches!(parse_attribute("in9_input"), Err(OctoError::ChannelOutOfRange { .. })));
        assert!(matches!(parse_attribute("temp0_input"), Err(OctoError::UnknownAttribute(_))));
        assert!(matches!(parse_attribute("temp1_max"), Err(OctoError::UnknownAttribute(_))));
        assert!(matches!(parse_attribute("fan_input"), Err(OctoError::UnknownAttribute(_))));
    }

    #[test]
    fn test_read_attribute() {
        let dev = device_with_report();
        assert_eq!(dev.read_attribute("in0_input").unwrap(), "12100");
        assert_eq!(dev.read_attribute("in0_label").unwrap(), "VCC");
        assert_eq!(dev.read_attribute("fan2_input").unwrap(), "3028");
        assert_eq!(dev.read_attribute("curr8_label").unwrap(), "Fan8 current");
    }

    #[test]
    fn test_labels_do_not_need_fresh_data() {
        let dev = OctoDevice::new(Duration::from_secs(2)).unwrap();
        assert!(matches!(dev.get_value(SensorType::Speed, 0), Err(OctoError::Stale)));
        assert_eq!(dev.get_label(SensorType::Speed, 0).unwrap(), "Flow speed [l/h]");
        assert!(matches!(
            dev.get_label(SensorType::Temperature, 4),
            Err(OctoError::ChannelOutOfRange { index: 4, count: 4, .. })
        ));
    }

    #[test]
    fn test_attributes_cover_every_channel() {
        let dev = OctoDevice::new(Duration::from_secs(2)).unwrap();
        let attrs = dev.attributes();
        assert_eq!(attrs.len(), 2 * (4 + 9 + 8 + 9 + 8));
        assert!(attrs.contains(&"in0_input".to_string()));
        assert!(attrs.contains(&"curr8_label".to_string()));
        assert!(!attrs.contains(&"in9_input".to_string()));
    }

    #[test]
    fn test_every_channel_read_only() {
        let dev = OctoDevice::new(Duration::from_secs(2)).unwrap();
        for channel in SensorType::ALL.into_iter().flat_map(SensorType::channels) {
            assert_eq!(dev.visibility(channel), 0o444);
        }
    }
}
