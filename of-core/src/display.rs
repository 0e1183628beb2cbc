//! Display Formatting Helpers
//!
//! Turn scaled integer values into human-readable strings. Frontend-agnostic;
//! used by the CLI and by daemon log lines.

use crate::data::Unit;

/// Format a scaled value in its natural display unit
///
/// ```
/// use of_core::{display::format_value, Unit};
/// assert_eq!(format_value(2480, Unit::MilliCelsius), "2.48 °C");
/// assert_eq!(format_value(24800, Unit::MilliCelsius), "24.80 °C");
/// ```
pub fn format_value(value: i64, unit: Unit) -> String {
    match unit {
        Unit::MilliCelsius => format!("{:.2} °C", value as f64 / 1000.0),
        Unit::Rpm => format!("{} RPM", value),
        Unit::LitersPerHour => format!("{} l/h", value),
        Unit::Microwatt => format_power(value as f64 / 1_000_000.0),
        Unit::Millivolt => format!("{:.2} V", value as f64 / 1000.0),
        Unit::Milliamp => format!("{} mA", value),
    }
}

/// Format an optional value, `N/A` when missing
pub fn format_value_optional(value: Option<i64>, unit: Unit) -> String {
    match value {
        Some(v) => format_value(v, unit),
        None => "N/A".to_string(),
    }
}

/// Format power in watts
pub fn format_power(watts: f64) -> String {
    format!("{:.2} W", watts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(-350, Unit::MilliCelsius), "-0.35 °C");
        assert_eq!(format_value(3028, Unit::Rpm), "3028 RPM");
        assert_eq!(format_value(150, Unit::LitersPerHour), "150 l/h");
        assert_eq!(format_value(1_500_000, Unit::Microwatt), "1.50 W");
        assert_eq!(format_value(12_100, Unit::Millivolt), "12.10 V");
        assert_eq!(format_value(87, Unit::Milliamp), "87 mA");
    }

    #[test]
    fn test_format_value_optional() {
        assert_eq!(format_value_optional(None, Unit::Rpm), "N/A");
        assert_eq!(format_value_optional(Some(900), Unit::Rpm), "900 RPM");
    }
}
