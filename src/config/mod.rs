//! # Configuration
//!
//! `AppSettings` is the user-facing settings document (persisted as JSON by
//! the host). `SamplerConfig` is the per-metric snapshot a sampler runs with;
//! it is always replaced wholesale, never mutated field by field.
//!
//! `SettingsSource` publishes settings to subscribers over a `watch` channel.
//! Every `save` notifies, even when nothing changed, so consumers must diff.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::core::types::TemperatureUnit;
use crate::error::{Error, Result};
use crate::sensor::MetricKey;
use crate::units::MAX_PRECISION;

pub mod constants;

use constants::*;

/// Settings that drive the sampling pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppSettings {
    pub update_interval_ms: u64,
    pub auto_start_monitoring: bool,
    pub max_data_points: usize,
    pub temperature_unit: TemperatureUnit,
    pub decimal_precision: u8,
    pub enable_debug_logging: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            update_interval_ms: DEFAULT_UPDATE_INTERVAL_MS,
            auto_start_monitoring: true,
            max_data_points: DEFAULT_MAX_DATA_POINTS,
            temperature_unit: TemperatureUnit::Celsius,
            decimal_precision: DEFAULT_DECIMAL_PRECISION,
            enable_debug_logging: false,
        }
    }
}

impl AppSettings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Loads `path`, falling back to defaults when missing or unreadable
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::from_json_file(path) {
            Ok(settings) => settings,
            Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                warn!("Error loading settings from {}: {}", path.display(), e);
                Self::default()
            },
        }
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    pub fn sampler_config(&self) -> SamplerConfig {
        SamplerConfig {
            interval: Duration::from_millis(self.update_interval_ms),
            capacity: self.max_data_points,
            unit: Some(self.temperature_unit),
            precision: self.decimal_precision,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.sampler_config().validate()
    }
}

/// Snapshot of the settings relevant to one metric
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerConfig {
    pub interval: Duration,
    pub capacity: usize,
    /// `None` for metrics that are not temperatures
    pub unit: Option<TemperatureUnit>,
    pub precision: u8,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        AppSettings::default().sampler_config()
    }
}

impl SamplerConfig {
    /// Drops the temperature unit for metrics that bypass conversion
    pub fn for_metric(mut self, key: MetricKey) -> Self {
        if !key.is_temperature() {
            self.unit = None;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.interval < MIN_INTERVAL || self.interval > MAX_INTERVAL {
            return Err(Error::invalid_config(format!(
                "update interval must be between {}ms and {}ms, got {}ms",
                MIN_INTERVAL.as_millis(),
                MAX_INTERVAL.as_millis(),
                self.interval.as_millis()
            )));
        }
        if self.capacity == 0 {
            return Err(Error::invalid_config("max data points must be a positive integer"));
        }
        if self.precision > MAX_PRECISION {
            return Err(Error::invalid_config(format!(
                "decimal precision must be at most {}, got {}",
                MAX_PRECISION, self.precision
            )));
        }
        Ok(())
    }
}

/// Publishes the current settings and notifies subscribers on every save
#[derive(Debug)]
pub struct SettingsSource {
    tx: watch::Sender<AppSettings>,
}

impl Default for SettingsSource {
    fn default() -> Self {
        Self::new(AppSettings::default())
    }
}

impl SettingsSource {
    pub fn new(initial: AppSettings) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    pub fn current(&self) -> AppSettings {
        self.tx.borrow().clone()
    }

    /// Receiver that yields every subsequent save
    pub fn subscribe(&self) -> watch::Receiver<AppSettings> {
        self.tx.subscribe()
    }

    /// Validates and publishes `settings`
    ///
    /// Invalid settings are rejected and the previous value stays current.
    pub fn save(&self, settings: AppSettings) -> Result<()> {
        if let Err(e) = settings.validate() {
            warn!("Rejected settings: {}", e);
            return Err(e);
        }
        info!(
            interval_ms = settings.update_interval_ms,
            max_data_points = settings.max_data_points,
            unit = %settings.temperature_unit,
            precision = settings.decimal_precision,
            "Settings saved"
        );
        self.tx.send_replace(settings);
        Ok(())
    }

    pub fn reset_to_defaults(&self) -> Result<()> {
        self.save(AppSettings::default())
    }
}
