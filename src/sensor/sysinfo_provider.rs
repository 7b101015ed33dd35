use sysinfo::{Components, System};
use tracing::{debug, trace};

use super::constants::{select_cpu_temperature, select_gpu_temperature};
use super::{DeviceKind, MetricKey, SensorProvider};
use crate::core::types::{ByteSize, Percentage};
use crate::error::{Error, Result};

/// Sensor provider backed by the `sysinfo` crate
///
/// CPU load and memory come from the global system view, temperatures from
/// labelled hardware components. GPU load is not exposed by `sysinfo` and
/// always reads as absent.
pub struct SysinfoProvider {
    system: System,
    components: Components,
}

impl std::fmt::Debug for SysinfoProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SysinfoProvider")
            .field("cpus", &self.system.cpus().len())
            .field("components", &self.components.list().len())
            .finish()
    }
}

impl SysinfoProvider {
    /// Opens the provider and performs an initial refresh
    ///
    /// # Errors
    ///
    /// Returns `Error::ProviderInit` on platforms `sysinfo` does not support
    /// or when no CPU could be detected.
    pub fn new() -> Result<Self> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(Error::provider_init("platform is not supported by sysinfo"));
        }

        let mut system = System::new();
        system.refresh_cpu();
        system.refresh_memory();
        if system.cpus().is_empty() {
            return Err(Error::provider_init("no CPU detected"));
        }

        let components = Components::new_with_refreshed_list();
        let provider = Self { system, components };
        provider.log_available_sensors();
        Ok(provider)
    }

    fn temperatures(&self) -> impl Iterator<Item = (&str, f64)> + Clone {
        self.components
            .list()
            .iter()
            .map(|c| (c.label(), f64::from(c.temperature())))
            .filter(|(_, celsius)| celsius.is_finite())
    }

    fn log_available_sensors(&self) {
        debug!(
            cpu = self.name(DeviceKind::Cpu).as_deref().unwrap_or("unknown"),
            cores = self.system.cpus().len(),
            components = self.components.list().len(),
            "Available hardware"
        );
        for (label, celsius) in self.temperatures() {
            debug!(label, celsius, "Sensor");
        }
    }

    fn ram_total_gb(&self) -> Option<f64> {
        match self.system.total_memory() {
            0 => None,
            bytes => Some(ByteSize::new(bytes).as_gb()),
        }
    }
}

impl SensorProvider for SysinfoProvider {
    fn refresh(&mut self) -> Result<()> {
        self.system.refresh_cpu();
        self.system.refresh_memory();
        self.components.refresh();
        trace!("sysinfo refreshed");
        Ok(())
    }

    fn read_metric(&self, key: MetricKey) -> Result<Option<f64>> {
        let value = match key {
            MetricKey::CpuTemperature => select_cpu_temperature(self.temperatures()),
            MetricKey::CpuUsage => Some(f64::from(self.system.global_cpu_info().cpu_usage())),
            MetricKey::GpuTemperature => select_gpu_temperature(self.temperatures()),
            MetricKey::GpuUsage => None,
            MetricKey::RamTotal => self.ram_total_gb(),
            MetricKey::RamUsed => self.ram_total_gb().map(|_| ByteSize::new(self.system.used_memory()).as_gb()),
            MetricKey::RamUsagePercent => {
                Percentage::of(self.system.used_memory() as f64, self.system.total_memory() as f64)
                    .map(|p| p.as_f64())
            },
        };
        Ok(value)
    }

    fn name(&self, device: DeviceKind) -> Option<String> {
        match device {
            DeviceKind::Cpu => self
                .system
                .cpus()
                .first()
                .map(|cpu| cpu.brand().trim().to_string())
                .filter(|brand| !brand.is_empty()),
            DeviceKind::Gpu => None,
            DeviceKind::Memory => self.ram_total_gb().map(|gb| format!("{:.1} GB RAM", gb)),
        }
    }
}
