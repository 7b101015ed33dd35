//! # Core Types Module
//!
//! Fundamental value types shared by the sampling pipeline.
//!
//! ## Key Types
//!
//! * `TemperatureUnit` - Display unit selected by the user (Celsius, Fahrenheit, Kelvin)
//! * `Temperature` - A temperature stored canonically in Celsius with conversion methods
//! * `Percentage` - A percentage value between 0.0 and 100.0
//! * `ByteSize` - A size in bytes with KB/MB/GB conversions, used for the RAM metrics (binary GB)
//!
//! ## Example
//!
//! ```rust
//! use coretray_metrics::core::types::{Temperature, TemperatureUnit};
//!
//! let temp = Temperature::new(25.0);
//! assert_eq!(temp.in_unit(TemperatureUnit::Fahrenheit), 77.0);
//! ```

use serde::{Deserialize, Serialize};

/// Unit a temperature is presented in
///
/// Celsius is the canonical storage unit; the other variants only affect display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
    Kelvin,
}

impl TemperatureUnit {
    /// Returns the display symbol for this unit
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Celsius => "°C",
            Self::Fahrenheit => "°F",
            Self::Kelvin => "K",
        }
    }
}

impl std::fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Celsius => write!(f, "Celsius"),
            Self::Fahrenheit => write!(f, "Fahrenheit"),
            Self::Kelvin => write!(f, "Kelvin"),
        }
    }
}

/// Represents a temperature in Celsius with conversion methods
///
/// # Examples
///
/// ```rust
/// use coretray_metrics::core::types::Temperature;
///
/// let temp = Temperature::new(25.0);
/// assert_eq!(temp.as_celsius(), 25.0);
/// assert_eq!(temp.as_fahrenheit(), 77.0);
/// assert_eq!(temp.as_kelvin(), 298.15);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Temperature(pub f64);

impl Temperature {
    /// Creates a new Temperature from a value in Celsius
    pub fn new(celsius: f64) -> Self {
        Self(celsius)
    }

    /// Returns the temperature in Celsius
    pub fn as_celsius(&self) -> f64 {
        self.0
    }

    /// Returns the temperature in Fahrenheit
    pub fn as_fahrenheit(&self) -> f64 {
        (self.0 * 9.0 / 5.0) + 32.0
    }

    /// Returns the temperature in Kelvin
    pub fn as_kelvin(&self) -> f64 {
        self.0 + 273.15
    }

    /// Returns the temperature expressed in `unit`
    pub fn in_unit(&self, unit: TemperatureUnit) -> f64 {
        match unit {
            TemperatureUnit::Celsius => self.as_celsius(),
            TemperatureUnit::Fahrenheit => self.as_fahrenheit(),
            TemperatureUnit::Kelvin => self.as_kelvin(),
        }
    }
}

/// Represents a percentage value between 0.0 and 100.0
///
/// # Examples
///
/// ```rust
/// use coretray_metrics::core::types::Percentage;
///
/// let p = Percentage::new(75.0).unwrap();
/// assert_eq!(p.as_f64(), 75.0);
///
/// // Values outside 0-100 range return None
/// assert!(Percentage::new(150.0).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percentage(pub f64);

impl Percentage {
    /// Creates a new Percentage from a value between 0 and 100
    /// Returns None if the value is outside the valid range
    pub fn new(value: f64) -> Option<Self> {
        if (0.0..=100.0).contains(&value) {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Returns the percentage value as a float
    pub fn as_f64(&self) -> f64 {
        self.0
    }

    /// Create a new percentage value, clamping it to the range 0.0-100.0
    pub fn from_f64(value: f64) -> Self {
        Self(value.clamp(0.0, 100.0))
    }

    /// Share of `part` in `total`, clamped; None when `total` is not positive
    pub fn of(part: f64, total: f64) -> Option<Self> {
        if total > 0.0 {
            Some(Self::from_f64(part / total * 100.0))
        } else {
            None
        }
    }
}

/// Represents a size in bytes with convenient conversion methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteSize(pub u64);

impl ByteSize {
    pub fn new(bytes: u64) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> u64 {
        self.0
    }

    pub fn as_kb(&self) -> f64 {
        self.0 as f64 / 1024.0
    }

    pub fn as_mb(&self) -> f64 {
        self.as_kb() / 1024.0
    }

    pub fn as_gb(&self) -> f64 {
        self.as_mb() / 1024.0
    }
}
