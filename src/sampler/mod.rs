//! # Metric Sampler
//!
//! Drives periodic polling of one metric. Each tick refreshes the shared
//! provider, reads the metric, records the reading as the current value and
//! appends it to the bounded history, then notifies the display sink.
//!
//! ## Threading
//!
//! The timer runs as a tokio task; each tick's refresh and read run on the
//! blocking pool under a per-sampler tick lock, bounded by one period. The
//! gate lock holds the state and a generation number and is only taken
//! briefly, never across sensor I/O. `stop` bumps the generation, and a
//! worker only commits a reading while it holds the gate and its generation
//! is still current. Once `stop` returns no new sample lands, and a timer
//! replaced by `set_config` can never commit after its successor is armed.
//!
//! ## Failure handling
//!
//! An absent reading leaves the current value and history untouched. A failed
//! refresh or read is logged and counted; the fixed period is the retry
//! interval.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tokio::runtime::Handle;
use tokio::task::{self, JoinHandle};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use crate::config::SamplerConfig;
use crate::core::metrics::{MetricSample, SharedHistory};
use crate::error::{Error, Result};
use crate::reconfigure::ConfigChange;
use crate::sensor::{MetricKey, SharedProvider};

pub mod sink;
pub mod types;


pub use sink::{ChannelSink, DisplaySink};
pub use types::{DisplayUpdate, SamplerState, SamplerStats, TickOutcome};

/// Lifecycle operations shared by a single sampler and the manager
#[async_trait]
pub trait MetricMonitoring: Send + Sync {
    /// Begins periodic sampling; no-op when already running
    fn start(&self) -> Result<()>;

    /// Stops sampling; idempotent
    fn stop(&self);

    /// Empties the retained history
    fn clear_history(&self);

    /// Stops and waits until the polling task has fully ended
    async fn shutdown(&self);
}

#[derive(Default)]
struct Gate {
    state: SamplerState,
    generation: u64,
    worker: Option<JoinHandle<()>>,
    runtime: Option<Handle>,
}

impl Gate {
    fn is_current(&self, generation: u64) -> bool {
        self.generation == generation && self.state == SamplerState::Running
    }
}

struct SamplerInner {
    key: MetricKey,
    provider: SharedProvider,
    series: SharedHistory,
    config: RwLock<SamplerConfig>,
    sink: RwLock<Option<Arc<dyn DisplaySink>>>,
    stats: Mutex<SamplerStats>,
    gate: Mutex<Gate>,
    ticking: Mutex<()>,
}

/// Periodically samples one metric into a bounded history
pub struct MetricSampler {
    inner: Arc<SamplerInner>,
}

impl std::fmt::Debug for MetricSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricSampler")
            .field("key", &self.inner.key)
            .field("state", &self.state())
            .field("config", &self.config())
            .field("len", &self.inner.series.len())
            .finish()
    }
}

impl MetricSampler {
    /// Creates a stopped sampler for `key`
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` when `config` fails validation.
    pub fn new(key: MetricKey, provider: SharedProvider, config: SamplerConfig) -> Result<Self> {
        let config = config.for_metric(key);
        config.validate()?;
        let series = SharedHistory::new(config.capacity)?;
        Ok(Self {
            inner: Arc::new(SamplerInner {
                key,
                provider,
                series,
                config: RwLock::new(config),
                sink: RwLock::new(None),
                stats: Mutex::new(SamplerStats::default()),
                gate: Mutex::new(Gate::default()),
                ticking: Mutex::new(()),
            }),
        })
    }

    pub fn with_sink(self, sink: Arc<dyn DisplaySink>) -> Self {
        self.set_sink(Some(sink));
        self
    }

    pub fn set_sink(&self, sink: Option<Arc<dyn DisplaySink>>) {
        *self.inner.sink.write() = sink;
    }

    pub fn key(&self) -> MetricKey {
        self.inner.key
    }

    pub fn state(&self) -> SamplerState {
        self.inner.gate.lock().state
    }

    pub fn is_running(&self) -> bool {
        self.state() == SamplerState::Running
    }

    pub fn config(&self) -> SamplerConfig {
        *self.inner.config.read()
    }

    /// Starts the periodic timer; the first tick fires one period from now
    ///
    /// # Errors
    ///
    /// Returns `Error::Runtime` when called outside a tokio runtime.
    pub fn start(&self) -> Result<()> {
        let mut gate = self.inner.gate.lock();
        if gate.state == SamplerState::Running {
            return Ok(());
        }
        let runtime = Handle::try_current()
            .map_err(|e| Error::runtime(format!("cannot start {} sampler: {}", self.inner.key, e)))?;
        gate.runtime = Some(runtime);
        gate.state = SamplerState::Running;
        let period = self.inner.config.read().interval;
        self.inner.arm(&mut gate, period);
        info!(metric = %self.inner.key, interval_ms = period.as_millis() as u64, "Monitoring loop started");
        Ok(())
    }

    /// Stops the timer; once this returns no further tick begins
    pub fn stop(&self) {
        drop(self.halt());
    }

    fn halt(&self) -> Option<JoinHandle<()>> {
        let mut gate = self.inner.gate.lock();
        if gate.state == SamplerState::Stopped {
            return gate.worker.take();
        }
        gate.state = SamplerState::Stopped;
        gate.generation += 1;
        let worker = gate.worker.take();
        if let Some(worker) = &worker {
            worker.abort();
        }
        info!(metric = %self.inner.key, "Monitoring loop ended");
        worker
    }

    /// Stops and awaits the polling task
    pub async fn stop_and_join(&self) {
        if let Some(worker) = self.halt() {
            match worker.await {
                Ok(()) => {},
                Err(e) if e.is_cancelled() => {},
                Err(e) => warn!(metric = %self.inner.key, "Monitoring task ended abnormally: {}", e),
            }
        }
    }

    /// Replaces the configuration as one atomic step
    ///
    /// Capacity changes trim the history, unit and precision changes only
    /// affect formatting, and an interval change while running replaces the
    /// timer so the next tick lands one new period from now.
    pub fn set_config(&self, config: SamplerConfig) -> Result<ConfigChange> {
        let config = config.for_metric(self.inner.key);
        config.validate()?;

        let mut gate = self.inner.gate.lock();
        let old = *self.inner.config.read();
        let change = ConfigChange::between(&old, &config);
        if change.is_empty() {
            return Ok(change);
        }

        if change.capacity {
            self.inner.series.set_capacity(config.capacity)?;
        }
        *self.inner.config.write() = config;

        if change.interval && gate.state == SamplerState::Running {
            gate.generation += 1;
            if let Some(old_worker) = gate.worker.take() {
                old_worker.abort();
            }
            self.inner.arm(&mut gate, config.interval);
            info!(
                metric = %self.inner.key,
                interval_ms = config.interval.as_millis() as u64,
                "Restarting timer"
            );
        }
        debug!(metric = %self.inner.key, change = ?change, "Configuration applied");
        Ok(change)
    }

    /// Performs one poll immediately on the calling thread, regardless of state
    pub fn tick(&self) -> TickOutcome {
        let _ticking = self.inner.ticking.lock();
        let reading = self.inner.provider.refresh_and_read(self.inner.key);
        let _gate = self.inner.gate.lock();
        self.inner.commit(reading)
    }

    /// Empties the history; the current value and state are unchanged
    pub fn clear_history(&self) {
        self.inner.series.clear();
        debug!(metric = %self.inner.key, "History cleared");
    }

    /// Last successfully sampled value in canonical units
    pub fn current(&self) -> Option<MetricSample> {
        self.inner.series.current()
    }

    /// Last value in the configured display unit
    pub fn display_current(&self) -> Option<f64> {
        let unit = self.inner.config.read().unit;
        self.current().map(|s| types::to_display(s.value(), unit))
    }

    /// Current value formatted for display, "N/A" before the first sample
    pub fn formatted_current(&self) -> String {
        let config = *self.inner.config.read();
        match self.current() {
            Some(sample) => types::format_for(self.inner.key, sample.value(), config.unit, config.precision),
            None => NOT_AVAILABLE.to_string(),
        }
    }

    /// Retained samples in canonical units, oldest first
    pub fn history(&self) -> Vec<MetricSample> {
        self.inner.series.snapshot()
    }

    /// Retained samples converted to the configured display unit
    pub fn display_history(&self) -> Vec<MetricSample> {
        let unit = self.inner.config.read().unit;
        self.history().iter().map(|s| s.map(|v| types::to_display(v, unit))).collect()
    }

    pub fn stats(&self) -> SamplerStats {
        self.inner.stats.lock().clone()
    }
}

/// Shown for a metric that has never been read successfully
pub const NOT_AVAILABLE: &str = "N/A";

impl SamplerInner {
    /// Spawns a worker for the current generation; caller holds the gate
    fn arm(self: &Arc<Self>, gate: &mut Gate, period: std::time::Duration) {
        let generation = gate.generation;
        let start = Instant::now() + period;
        let inner = Arc::clone(self);
        gate.worker = gate.runtime.as_ref().map(|runtime| runtime.spawn(inner.run(generation, start, period)));
    }

    async fn run(self: Arc<Self>, generation: u64, start: Instant, period: std::time::Duration) {
        let mut ticker = time::interval_at(start, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let current = self.gate.lock().is_current(generation);
            if !current {
                break;
            }
            let inner = Arc::clone(&self);
            let poll = task::spawn_blocking(move || inner.poll(generation));
            match time::timeout(period, poll).await {
                Ok(Ok(_)) => {},
                Ok(Err(e)) => {
                    warn!(metric = %self.key, "Sensor task ended abnormally: {}", e);
                    self.stats.lock().last_error = Some(e.to_string());
                },
                Err(_) => {
                    warn!(
                        metric = %self.key,
                        timeout_ms = period.as_millis() as u64,
                        "Sensor read exceeded the polling interval"
                    );
                    self.stats.lock().last_error = Some("sensor read timed out".to_string());
                },
            }
        }
    }

    /// One timer tick on the blocking pool
    ///
    /// Skipped while an earlier read still holds the tick lock, so reads never
    /// overlap. The reading is only committed if `generation` is still current.
    fn poll(&self, generation: u64) -> Option<TickOutcome> {
        let Some(_ticking) = self.ticking.try_lock() else {
            debug!(metric = %self.key, "Previous sensor read still in progress, skipping tick");
            return None;
        };
        if !self.gate.lock().is_current(generation) {
            return None;
        }
        let reading = self.provider.refresh_and_read(self.key);
        let gate = self.gate.lock();
        if !gate.is_current(generation) {
            trace!(metric = %self.key, "Discarding reading from a stopped timer");
            return None;
        }
        Some(self.commit(reading))
    }

    /// Applies one reading; caller holds the gate
    fn commit(&self, reading: Result<Option<f64>>) -> TickOutcome {
        let config = *self.config.read();
        trace!(metric = %self.key, "tick");
        let outcome = match reading {
            Ok(Some(raw)) if raw.is_finite() => {
                let sample = MetricSample::new(raw);
                match self.sink.read().clone() {
                    Some(sink) => {
                        let update = DisplayUpdate {
                            key: self.key,
                            value: raw,
                            formatted: types::format_for(self.key, raw, config.unit, config.precision),
                            unit: config.unit,
                            history: self.series.record_and_snapshot(sample),
                        };
                        sink.publish(&update);
                    },
                    None => self.series.record(sample),
                }
                TickOutcome::Sampled(raw)
            },
            Ok(Some(raw)) => {
                debug!(metric = %self.key, raw, "Discarding non-finite reading");
                TickOutcome::Absent
            },
            Ok(None) => {
                debug!(metric = %self.key, "Sensor reading not available");
                TickOutcome::Absent
            },
            Err(e) => {
                warn!(metric = %self.key, "Sensor update failed: {}", e);
                self.stats.lock().last_error = Some(e.to_string());
                TickOutcome::Failed
            },
        };

        let mut stats = self.stats.lock();
        stats.ticks += 1;
        match outcome {
            TickOutcome::Sampled(_) => stats.samples += 1,
            TickOutcome::Absent => stats.absent_reads += 1,
            TickOutcome::Failed => stats.failed_reads += 1,
        }
        outcome
    }
}

impl Drop for MetricSampler {
    fn drop(&mut self) {
        self.stop();
    }
}

#[async_trait]
impl MetricMonitoring for MetricSampler {
    fn start(&self) -> Result<()> {
        MetricSampler::start(self)
    }

    fn stop(&self) {
        MetricSampler::stop(self)
    }

    fn clear_history(&self) {
        MetricSampler::clear_history(self)
    }

    async fn shutdown(&self) {
        self.stop_and_join().await
    }
}
