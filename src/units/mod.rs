//! Unit conversion and display formatting.
//!
//! Temperatures are handled in Celsius everywhere inside the crate and only
//! converted when a value is shown. Rounding for display is half away from
//! zero on the value scaled by `10^precision`, so `format(2.5, Celsius, 0)`
//! is `"3°C"` and `format(-2.5, Celsius, 0)` is `"-3°C"`.

pub use crate::core::types::TemperatureUnit;
use crate::core::types::Temperature;

/// Largest precision accepted by settings validation
pub const MAX_PRECISION: u8 = 6;

/// Converts a Celsius reading into `unit`
pub fn convert(celsius: f64, unit: TemperatureUnit) -> f64 {
    Temperature::new(celsius).in_unit(unit)
}

pub fn unit_symbol(unit: TemperatureUnit) -> &'static str {
    unit.symbol()
}

/// Converts then formats with exactly `precision` decimals and the unit symbol
///
/// ```rust
/// use coretray_metrics::units::{format, TemperatureUnit};
///
/// assert_eq!(format(36.6, TemperatureUnit::Celsius, 1), "36.6°C");
/// assert_eq!(format(36.66, TemperatureUnit::Celsius, 0), "37°C");
/// ```
pub fn format(celsius: f64, unit: TemperatureUnit, precision: u8) -> String {
    format_value(convert(celsius, unit), precision, unit.symbol())
}

/// Formats a value that bypasses unit conversion (percentages, GB)
pub fn format_value(value: f64, precision: u8, suffix: &str) -> String {
    let digits = usize::from(precision.min(MAX_PRECISION));
    format!("{:.*}{}", digits, round_half_away(value, precision), suffix)
}

/// Rounds to `precision` decimals, ties away from zero
pub fn round_half_away(value: f64, precision: u8) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let scale = 10f64.powi(i32::from(precision.min(MAX_PRECISION)));
    let rounded = (value * scale).round() / scale;
    // -0.0 would print as "-0"
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}
