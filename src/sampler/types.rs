use crate::core::metrics::MetricSample;
use crate::core::types::TemperatureUnit;
use crate::sensor::MetricKey;
use crate::units;

/// Lifecycle state of a sampler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SamplerState {
    #[default]
    Stopped,
    Running,
}

/// Result of a single poll
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// A reading was recorded (canonical units)
    Sampled(f64),
    /// The sensor reported no value
    Absent,
    /// The refresh or read failed
    Failed,
}

/// Per-sampler counters for diagnostics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SamplerStats {
    pub ticks: u64,
    pub samples: u64,
    pub absent_reads: u64,
    pub failed_reads: u64,
    pub last_error: Option<String>,
}

/// What a display receives after every successful tick
///
/// `value` and `history` are canonical (Celsius for temperatures); use
/// [`DisplayUpdate::display_value`] and [`DisplayUpdate::display_history`]
/// for values in the configured unit.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayUpdate {
    pub key: MetricKey,
    pub value: f64,
    pub formatted: String,
    pub unit: Option<TemperatureUnit>,
    pub history: Vec<MetricSample>,
}

impl DisplayUpdate {
    pub fn display_value(&self) -> f64 {
        to_display(self.value, self.unit)
    }

    pub fn display_history(&self) -> Vec<MetricSample> {
        self.history.iter().map(|s| s.map(|v| to_display(v, self.unit))).collect()
    }
}

pub(crate) fn to_display(value: f64, unit: Option<TemperatureUnit>) -> f64 {
    match unit {
        Some(unit) => units::convert(value, unit),
        None => value,
    }
}

/// Formats a canonical value for display
pub(crate) fn format_for(key: MetricKey, value: f64, unit: Option<TemperatureUnit>, precision: u8) -> String {
    match unit {
        Some(unit) if key.is_temperature() => units::format(value, unit, precision),
        _ => units::format_value(value, precision, key.suffix()),
    }
}
