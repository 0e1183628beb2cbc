/*
 * This file is part of Octofan.
 *
 * Copyright (C) 2025 Octofan contributors
 *
 * Octofan is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Octofan is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Octofan. If not, see <https://www.gnu.org/licenses/>.
 */

//! Plain-text rendering for the CLI

use std::fmt::Write;

use of_core::display::format_value_optional;
use of_core::layout::{self, FieldSpec, Scale, Width};
use of_core::{Channel, SensorType, StatusDocument};

use crate::capture::CaptureSummary;

fn describe_scale(scale: Scale) -> String {
    match scale {
        Scale::Raw => "raw".to_string(),
        Scale::Mul(f) => format!("x{}", f),
        Scale::Div(d) => format!("/{}", d),
    }
}

fn describe_width(field: &FieldSpec) -> String {
    let bits = match field.width {
        Width::U16 => 16,
        Width::U32 => 32,
    };
    format!("{}{}", if field.signed { "i" } else { "u" }, bits)
}

fn field_row(out: &mut String, name: &str, field: &FieldSpec, label: &str) {
    let _ = writeln!(
        out,
        "{:<14} {:>6} {:>5} {:>7}  {}",
        name,
        field.offset,
        describe_width(field),
        describe_scale(field.scale),
        label
    );
}

/// Table of every field in the status report
pub fn render_labels() -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<14} {:>6} {:>5} {:>7}  LABEL", "ATTRIBUTE", "OFFSET", "TYPE", "SCALE");

    for sensor in SensorType::ALL {
        for (index, entry) in layout::channels(sensor).iter().enumerate() {
            let attribute = match Channel::new(sensor, index) {
                Ok(channel) => channel.attribute("input"),
                Err(_) => continue,
            };
            field_row(&mut out, &attribute, &entry.field, entry.label);
        }
    }

    let info = &layout::INFO;
    field_row(&mut out, "serial[0]", &info.serial_number[0], "Serial number (high)");
    field_row(&mut out, "serial[1]", &info.serial_number[1], "Serial number (low)");
    field_row(&mut out, "firmware", &info.firmware_version, "Firmware version");
    field_row(&mut out, "power_cycles", &info.power_cycles, "Power cycles");
    out
}

/// Human-readable status document
pub fn render_status(doc: &StatusDocument) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Device:        {}", doc.device);
    let _ = writeln!(out, "Serial:        {}", doc.serial_number);
    let _ = writeln!(out, "Firmware:      {}", doc.firmware_version);
    let _ = writeln!(out, "Power cycles:  {}", doc.power_cycles);
    let state = match (doc.fresh, doc.age_ms) {
        (true, Some(age)) => format!("fresh ({} ms old)", age),
        (true, None) => "fresh".to_string(),
        (false, Some(age)) => format!("stale ({} ms old)", age),
        (false, None) => "no report received".to_string(),
    };
    let _ = writeln!(out, "State:         {}", state);
    let _ = writeln!(out);

    for channel in &doc.channels {
        let _ = writeln!(
            out,
            "{:<14} {:<16} {}",
            channel.attribute,
            channel.label,
            format_value_optional(channel.value, channel.unit)
        );
    }
    out
}

/// Summary header followed by the last decoded report
pub fn render_capture(summary: &CaptureSummary) -> String {
    let mut out = format!(
        "{} records: {} decoded, {} ignored, {} malformed\n",
        summary.records, summary.applied, summary.ignored, summary.malformed
    );
    if let Some(doc) = &summary.status {
        out.push('\n');
        out.push_str(&render_status(doc));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use of_core::OctoDevice;
    use std::time::Duration;

    #[test]
    fn test_labels_table() {
        let table = render_labels();
        // header, 38 channels, 4 info fields
        assert_eq!(table.lines().count(), 1 + 38 + 4);
        assert!(table.contains("temp1_input"));
        assert!(table.contains("in0_input"));
        assert!(table.contains("Fan8 current"));

        let flow = table.lines().find(|l| l.starts_with("fan1_input")).unwrap();
        assert!(flow.contains("123"));
        assert!(flow.contains("/10"));
        assert!(flow.contains("Flow speed [l/h]"));

        let temp = table.lines().find(|l| l.starts_with("temp1_input")).unwrap();
        assert!(temp.contains("i16"));
    }

    #[test]
    fn test_render_status_without_report() {
        let dev = OctoDevice::new(Duration::from_secs(2)).unwrap();
        let text = render_status(&StatusDocument::capture(&dev));

        assert!(text.contains("no report received"));
        assert!(text.contains("N/A"));
        assert!(text.contains("00000-00000"));
    }

    #[test]
    fn test_render_status_values() {
        let dev = OctoDevice::new(Duration::from_secs(2)).unwrap();
        let mut frame = vec![0u8; 226];
        frame[0] = 0x01;
        frame[61..63].copy_from_slice(&248u16.to_be_bytes());
        frame[117..119].copy_from_slice(&1210u16.to_be_bytes());
        dev.handle_frame(&frame).unwrap();

        let text = render_status(&StatusDocument::capture(&dev));
        assert!(text.contains("fresh"));
        assert!(text.contains("2.48 °C"));
        assert!(text.contains("12.10 V"));
    }
}
