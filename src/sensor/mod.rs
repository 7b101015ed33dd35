//! # Sensor Provider
//!
//! The boundary between the sampling pipeline and whatever library actually
//! talks to the hardware. A provider is refreshed as a whole and then asked
//! for individual metrics; a metric it cannot supply reads as `None`, which is
//! distinct from a legitimate zero.
//!
//! One provider instance is shared by every sampler through [`SharedProvider`],
//! which serializes `refresh` and reads behind a single lock so concurrent
//! samplers never mutate provider-internal caches at the same time.

use std::sync::Arc;

#[cfg(any(test, feature = "mock"))]
use mockall::automock;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::error::{Error, Result};

pub mod constants;
#[cfg(feature = "sysinfo-provider")]
pub mod sysinfo_provider;

#[cfg(feature = "sysinfo-provider")]
pub use sysinfo_provider::SysinfoProvider;

/// Hardware device a metric belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceKind {
    Cpu,
    Gpu,
    Memory,
}

impl DeviceKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Cpu => "CPU",
            Self::Gpu => "GPU",
            Self::Memory => "RAM",
        }
    }
}

impl std::fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Named hardware measurement a provider can be asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricKey {
    CpuTemperature,
    CpuUsage,
    GpuTemperature,
    GpuUsage,
    RamTotal,
    RamUsed,
    RamUsagePercent,
}

impl MetricKey {
    pub const ALL: [MetricKey; 7] = [
        MetricKey::CpuTemperature,
        MetricKey::CpuUsage,
        MetricKey::GpuTemperature,
        MetricKey::GpuUsage,
        MetricKey::RamTotal,
        MetricKey::RamUsed,
        MetricKey::RamUsagePercent,
    ];

    /// Temperatures are read in Celsius and subject to unit conversion
    pub fn is_temperature(&self) -> bool {
        matches!(self, Self::CpuTemperature | Self::GpuTemperature)
    }

    pub fn device(&self) -> DeviceKind {
        match self {
            Self::CpuTemperature | Self::CpuUsage => DeviceKind::Cpu,
            Self::GpuTemperature | Self::GpuUsage => DeviceKind::Gpu,
            Self::RamTotal | Self::RamUsed | Self::RamUsagePercent => DeviceKind::Memory,
        }
    }

    /// Suffix for metrics that bypass temperature conversion
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::CpuTemperature | Self::GpuTemperature => "",
            Self::CpuUsage | Self::GpuUsage | Self::RamUsagePercent => "%",
            Self::RamTotal | Self::RamUsed => " GB",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CpuTemperature => "cpuTemperature",
            Self::CpuUsage => "cpuUsage",
            Self::GpuTemperature => "gpuTemperature",
            Self::GpuUsage => "gpuUsage",
            Self::RamTotal => "ramTotal",
            Self::RamUsed => "ramUsed",
            Self::RamUsagePercent => "ramUsagePercent",
        }
    }
}

impl std::fmt::Display for MetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source of raw hardware readings
///
/// Implementations only need to be `Send`; all access goes through
/// [`SharedProvider`]'s lock.
#[cfg_attr(any(test, feature = "mock"), automock)]
pub trait SensorProvider: Send {
    /// Re-reads every sensor. Failure is non-fatal; the next tick tries again.
    fn refresh(&mut self) -> Result<()>;

    /// Latest value for `key`, `None` when the sensor is not present
    fn read_metric(&self, key: MetricKey) -> Result<Option<f64>>;

    /// Model name of `device`, if one was detected
    fn name(&self, device: DeviceKind) -> Option<String>;

    /// Releases underlying handles
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Stand-in for a provider that could not be constructed: every read is absent
#[derive(Debug, Default)]
pub struct DegradedProvider;

impl SensorProvider for DegradedProvider {
    fn refresh(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_metric(&self, _key: MetricKey) -> Result<Option<f64>> {
        Ok(None)
    }

    fn name(&self, _device: DeviceKind) -> Option<String> {
        None
    }
}

/// Surfaces a construction failure once and degrades instead of failing
///
/// Monitoring then stays permanently degraded (all reads absent) rather than
/// retrying construction on every tick.
pub fn open_or_degraded<P>(result: Result<P>) -> SharedProvider
where
    P: SensorProvider + 'static,
{
    match result {
        Ok(provider) => SharedProvider::new(provider),
        Err(e) => {
            error!("Failed to initialize hardware monitor: {}", e);
            SharedProvider::degraded()
        },
    }
}

struct ProviderSlot {
    provider: Box<dyn SensorProvider>,
    closed: bool,
    degraded: bool,
}

/// A provider shared across samplers with refresh and reads serialized
#[derive(Clone)]
pub struct SharedProvider {
    slot: Arc<Mutex<ProviderSlot>>,
}

impl std::fmt::Debug for SharedProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slot = self.slot.lock();
        f.debug_struct("SharedProvider")
            .field("closed", &slot.closed)
            .field("degraded", &slot.degraded)
            .finish()
    }
}

impl SharedProvider {
    pub fn new<P: SensorProvider + 'static>(provider: P) -> Self {
        Self::from_boxed(Box::new(provider), false)
    }

    pub fn degraded() -> Self {
        Self::from_boxed(Box::new(DegradedProvider), true)
    }

    fn from_boxed(provider: Box<dyn SensorProvider>, degraded: bool) -> Self {
        Self { slot: Arc::new(Mutex::new(ProviderSlot { provider, closed: false, degraded })) }
    }

    /// Refreshes the whole provider and reads `key` as one logical operation
    ///
    /// Returns `Ok(None)` once the provider has been closed.
    pub fn refresh_and_read(&self, key: MetricKey) -> Result<Option<f64>> {
        let mut slot = self.slot.lock();
        if slot.closed {
            return Ok(None);
        }
        slot.provider.refresh().map_err(|e| match e {
            Error::SensorRead(msg) => Error::sensor_read(format!("{} refresh: {}", key, msg)),
            other => other,
        })?;
        slot.provider.read_metric(key)
    }

    /// Device model name, falling back to "<Device> Not Found"
    pub fn name(&self, device: DeviceKind) -> String {
        let slot = self.slot.lock();
        let name = if slot.closed { None } else { slot.provider.name(device) };
        name.unwrap_or_else(|| format!("{} Not Found", device.label()))
    }

    pub fn is_degraded(&self) -> bool {
        self.slot.lock().degraded
    }

    pub fn is_closed(&self) -> bool {
        self.slot.lock().closed
    }

    /// Closes the provider once; later calls and reads are no-ops
    ///
    /// A provider that fails to close is logged, never propagated.
    pub fn close(&self) {
        let mut slot = self.slot.lock();
        if slot.closed {
            return;
        }
        slot.closed = true;
        match slot.provider.close() {
            Ok(()) => debug!("Sensor provider closed"),
            Err(e) => warn!("Error closing hardware monitor: {}", e),
        }
    }
}
