//! # Metric Manager
//!
//! Owns one [`MetricSampler`] per tracked metric over a single shared sensor
//! provider, and coordinates their lifecycle: start/stop/clear for all of
//! them at once, fan-out of every settings change, and deterministic
//! shutdown that stops every sampler before closing the provider.

use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use futures::future::join_all;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::{AppSettings, SettingsSource};
use crate::core::metrics::MetricSample;
use crate::error::{Error, Result};
use crate::reconfigure::{ConfigChange, Reconfiguration, ReconfigurationController};
use crate::sampler::{DisplaySink, MetricMonitoring, MetricSampler};
use crate::sensor::{DeviceKind, MetricKey, SharedProvider};

/// Metrics shown by the CPU, GPU and RAM pages
pub const DEFAULT_METRICS: [MetricKey; 5] = [
    MetricKey::CpuTemperature,
    MetricKey::GpuTemperature,
    MetricKey::RamUsagePercent,
    MetricKey::RamUsed,
    MetricKey::RamTotal,
];

/// Current value of one metric at a point in time
#[derive(Debug, Clone, PartialEq)]
pub struct MetricReading {
    pub key: MetricKey,
    pub current: Option<MetricSample>,
    pub formatted: String,
    pub history_len: usize,
}

pub struct MetricManager {
    provider: SharedProvider,
    samplers: BTreeMap<MetricKey, MetricSampler>,
    controller: Mutex<ReconfigurationController>,
    closing: watch::Sender<bool>,
}

impl std::fmt::Debug for MetricManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricManager")
            .field("provider", &self.provider)
            .field("metrics", &self.samplers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl MetricManager {
    /// Creates a manager for [`DEFAULT_METRICS`]
    pub fn new(provider: SharedProvider, settings: AppSettings) -> Result<Self> {
        Self::with_metrics(provider, settings, DEFAULT_METRICS)
    }

    /// Creates a manager sampling exactly `keys`; duplicates are ignored
    pub fn with_metrics(
        provider: SharedProvider,
        settings: AppSettings,
        keys: impl IntoIterator<Item = MetricKey>,
    ) -> Result<Self> {
        let controller = ReconfigurationController::new(settings)?;
        let config = controller.sampler_config();
        let mut samplers = BTreeMap::new();
        for key in keys {
            if samplers.contains_key(&key) {
                continue;
            }
            samplers.insert(key, MetricSampler::new(key, provider.clone(), config)?);
        }
        if samplers.is_empty() {
            return Err(Error::invalid_config("at least one metric must be sampled"));
        }
        for device in [DeviceKind::Cpu, DeviceKind::Gpu, DeviceKind::Memory] {
            if samplers.keys().any(|k| k.device() == device) {
                info!(device = %device, name = %provider.name(device), "Detected hardware");
            }
        }
        let (closing, _) = watch::channel(false);
        Ok(Self { provider, samplers, controller: Mutex::new(controller), closing })
    }

    pub fn settings(&self) -> AppSettings {
        self.controller.lock().current().clone()
    }

    pub fn metrics(&self) -> impl Iterator<Item = MetricKey> + '_ {
        self.samplers.keys().copied()
    }

    pub fn sampler(&self, key: MetricKey) -> Option<&MetricSampler> {
        self.samplers.get(&key)
    }

    /// Like [`MetricManager::sampler`] but reports a missing metric as an error
    pub fn require(&self, key: MetricKey) -> Result<&MetricSampler> {
        self.sampler(key)
            .ok_or_else(|| Error::not_available(format!("{} is not sampled by this manager", key)))
    }

    pub fn device_name(&self, device: DeviceKind) -> String {
        self.provider.name(device)
    }

    /// Attaches `sink` to every sampler
    pub fn set_sink(&self, sink: Arc<dyn DisplaySink>) {
        for sampler in self.samplers.values() {
            sampler.set_sink(Some(Arc::clone(&sink)));
        }
    }

    pub fn start_all(&self) -> Result<()> {
        for sampler in self.samplers.values() {
            sampler.start()?;
        }
        Ok(())
    }

    /// Starts all samplers when auto-start is enabled; returns whether it did
    pub fn start_if_enabled(&self) -> Result<bool> {
        if self.controller.lock().current().auto_start_monitoring {
            self.start_all()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub fn stop_all(&self) {
        for sampler in self.samplers.values() {
            sampler.stop();
        }
    }

    /// The manual "clear graphs" command
    pub fn clear_all_histories(&self) {
        for sampler in self.samplers.values() {
            sampler.clear_history();
        }
        info!("All graph data cleared");
    }

    /// Validates `settings` and applies what changed to every sampler
    ///
    /// Invalid settings are rejected before any sampler is touched and the
    /// previous settings stay in effect.
    pub fn apply_settings(&self, settings: AppSettings) -> Result<Reconfiguration> {
        let mut controller = self.controller.lock();
        let plan = controller.accept(settings)?;

        let mut applied = ConfigChange::default();
        for sampler in self.samplers.values() {
            let change = sampler.set_config(plan.config)?;
            applied.interval |= change.interval;
            applied.capacity |= change.capacity;
            applied.unit |= change.unit;
            applied.precision |= change.precision;
        }
        if plan.debug_logging_changed {
            info!(enabled = controller.current().enable_debug_logging, "Debug logging toggled");
        }
        drop(controller);

        if plan.auto_start_enabled {
            self.start_all()?;
        }
        debug!(change = ?applied, "Settings fanned out");
        Ok(plan)
    }

    /// Applies every settings save from `source` until the source is dropped
    ///
    /// The task holds only a weak reference and ends as soon as the manager is
    /// shut down or dropped.
    pub fn watch_settings(self: &Arc<Self>, source: &SettingsSource) -> JoinHandle<()> {
        let mut rx = source.subscribe();
        let mut closing = self.closing.subscribe();
        let manager: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    changed = rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    },
                    _ = closing.changed() => break,
                }
                let settings = rx.borrow_and_update().clone();
                let Some(strong) = manager.upgrade() else {
                    break;
                };
                if let Err(e) = strong.apply_settings(settings) {
                    warn!("Failed to apply settings: {}", e);
                }
            }
            debug!("Settings listener ended");
        })
    }

    /// Current value of every sampled metric
    pub fn snapshot(&self) -> Vec<MetricReading> {
        self.samplers
            .iter()
            .map(|(key, sampler)| MetricReading {
                key: *key,
                current: sampler.current(),
                formatted: sampler.formatted_current(),
                history_len: sampler.history().len(),
            })
            .collect()
    }

    /// Stops every sampler, waits for their tasks, then closes the provider
    pub async fn shutdown(&self) {
        self.closing.send_replace(true);
        join_all(self.samplers.values().map(|s| s.stop_and_join())).await;
        self.provider.close();
        info!("Hardware monitor shut down");
    }
}

impl Drop for MetricManager {
    fn drop(&mut self) {
        self.stop_all();
        self.provider.close();
    }
}

#[async_trait]
impl MetricMonitoring for MetricManager {
    fn start(&self) -> Result<()> {
        self.start_all()
    }

    fn stop(&self) {
        self.stop_all()
    }

    fn clear_history(&self) {
        self.clear_all_histories()
    }

    async fn shutdown(&self) {
        MetricManager::shutdown(self).await
    }
}
