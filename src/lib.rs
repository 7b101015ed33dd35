//! CoreTray Metrics - periodic hardware sampling with bounded history
//!
//! This crate is the telemetry core of a CPU/GPU/RAM tray monitor. It polls a
//! sensor provider at a configurable interval, normalizes readings that may be
//! absent or fail, keeps a capacity-limited time series per metric and hands
//! current values plus history snapshots to a display.
//!
//! # Features
//!
//! - **Metric Sampler**: one tokio timer task per metric, stoppable and re-armable
//! - **Bounded History**: FIFO-evicting series guarded by a single lock
//! - **Unit Conversion**: Celsius storage, Celsius/Fahrenheit/Kelvin display
//! - **Live Reconfiguration**: field-by-field settings diffs applied atomically
//! - **Metric Manager**: coordinated start/stop/clear over CPU, GPU and RAM
//! - **sysinfo Backend**: a real sensor provider behind the `sysinfo-provider` feature
//!
//! # Examples
//!
//! ```rust,no_run
//! use coretray_metrics::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let provider = open_or_degraded(SysinfoProvider::new());
//!     let manager = MetricManager::new(provider, AppSettings::default())?;
//!
//!     let (sink, mut updates) = ChannelSink::channel();
//!     manager.set_sink(Arc::new(sink));
//!     manager.start_all()?;
//!
//!     if let Some(update) = updates.recv().await {
//!         println!("{}: {}", update.key, update.formatted);
//!     }
//!     manager.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! # Error Handling
//!
//! Sensor failures never stop monitoring. A provider that cannot be opened
//! degrades to one whose every read is absent; a failed tick is logged and
//! retried on the next period; invalid settings are rejected before they
//! reach a sampler:
//!
//! ```rust
//! use coretray_metrics::{config::AppSettings, Error};
//!
//! let err = AppSettings::from_json_str(r#"{"maxDataPoints": 0}"#).unwrap_err();
//! assert!(matches!(err, Error::InvalidConfig(_)));
//! ```
//!
//! # Thread Safety
//!
//! History and the current value share one lock per sampler, the provider is
//! shared behind its own lock, and all sampler lifecycle changes go through a
//! gate lock, so display consumers can read from any thread while ticks run.

#![doc(html_root_url = "https://docs.rs/coretray-metrics/0.1.0")]

pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod manager;
pub mod reconfigure;
pub mod sampler;
pub mod sensor;
pub mod units;

pub use error::{Error, Result};

/// Re-export common types for convenience
pub mod prelude {
    pub use crate::config::{AppSettings, SamplerConfig, SettingsSource};
    pub use crate::core::metrics::{MetricHistory, MetricSample};
    pub use crate::core::types::TemperatureUnit;
    pub use crate::error::{Error, Result};
    pub use crate::manager::MetricManager;
    pub use crate::reconfigure::{ConfigChange, ReconfigurationController};
    pub use crate::sampler::{ChannelSink, DisplaySink, DisplayUpdate, MetricMonitoring, MetricSampler, SamplerState};
    #[cfg(feature = "sysinfo-provider")]
    pub use crate::sensor::SysinfoProvider;
    pub use crate::sensor::{open_or_degraded, DeviceKind, MetricKey, SensorProvider, SharedProvider};
}
