//! # Core Metrics Module
//!
//! Time-series primitives for the sampling pipeline.
//!
//! * `MetricSample` - one immutable, timestamped reading
//! * `MetricHistory` - a capacity-bounded, FIFO-evicting series of samples
//! * `SharedHistory` - the history plus the "current value" cell behind one lock,
//!   shared between the polling task and display consumers
//!
//! ## Example
//!
//! ```rust
//! use coretray_metrics::core::metrics::{MetricHistory, MetricSample};
//!
//! let mut history = MetricHistory::new(2).unwrap();
//! history.append(MetricSample::new(10.0));
//! history.append(MetricSample::new(20.0));
//! history.append(MetricSample::new(30.0));
//!
//! let values: Vec<f64> = history.snapshot().iter().map(|s| s.value()).collect();
//! assert_eq!(values, vec![20.0, 30.0]);
//! ```

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::Mutex;

use crate::error::{Error, Result};


/// A single metric measurement with a timestamp
///
/// Fields are private so a sample cannot change after it is recorded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSample {
    value: f64,
    timestamp: SystemTime,
}

impl MetricSample {
    /// Creates a new sample with the current time as timestamp
    pub fn new(value: f64) -> Self {
        Self { value, timestamp: SystemTime::now() }
    }

    /// Creates a new sample with a specific timestamp
    pub fn with_timestamp(value: f64, timestamp: SystemTime) -> Self {
        Self { value, timestamp }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    /// Same timestamp, value mapped through `f`
    pub fn map(&self, f: impl FnOnce(f64) -> f64) -> Self {
        Self { value: f(self.value), timestamp: self.timestamp }
    }
}

/// A bounded series of samples in insertion (chronological) order
///
/// `len() <= capacity()` holds after every operation. Appending past the
/// capacity evicts the oldest samples first.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricHistory {
    samples: VecDeque<MetricSample>,
    capacity: usize,
}

impl MetricHistory {
    /// Creates an empty history that retains at most `capacity` samples
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` when `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        check_capacity(capacity)?;
        Ok(Self { samples: VecDeque::with_capacity(capacity.min(1024)), capacity })
    }

    /// Inserts at the tail, evicting from the head until within capacity
    pub fn append(&mut self, sample: MetricSample) {
        self.samples.push_back(sample);
        self.evict_to(self.capacity);
    }

    /// Changes the retention count
    ///
    /// Shrinking below the current length drops the oldest samples right away.
    /// Growing never adds samples; it only allows more future growth.
    pub fn set_capacity(&mut self, capacity: usize) -> Result<()> {
        check_capacity(capacity)?;
        self.capacity = capacity;
        self.evict_to(capacity);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Copies the retained samples, oldest first
    pub fn snapshot(&self) -> Vec<MetricSample> {
        self.samples.iter().copied().collect()
    }

    pub fn latest(&self) -> Option<&MetricSample> {
        self.samples.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetricSample> {
        self.samples.iter()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    fn evict_to(&mut self, capacity: usize) {
        while self.samples.len() > capacity {
            self.samples.pop_front();
        }
    }
}

fn check_capacity(capacity: usize) -> Result<()> {
    if capacity == 0 {
        return Err(Error::invalid_config("history capacity must be a positive integer"));
    }
    Ok(())
}

#[derive(Debug)]
struct SeriesState {
    history: MetricHistory,
    current: Option<MetricSample>,
}

/// History and current value guarded by a single critical section
///
/// The sampler records from its polling task while displays read concurrently;
/// every operation here takes the same lock, so a reader never observes a
/// half-applied append or eviction.
#[derive(Debug, Clone)]
pub struct SharedHistory {
    inner: Arc<Mutex<SeriesState>>,
}

impl SharedHistory {
    pub fn new(capacity: usize) -> Result<Self> {
        let history = MetricHistory::new(capacity)?;
        Ok(Self { inner: Arc::new(Mutex::new(SeriesState { history, current: None })) })
    }

    /// Publishes `sample` as the current value and appends it to the history
    pub fn record(&self, sample: MetricSample) {
        let mut state = self.inner.lock();
        state.current = Some(sample);
        state.history.append(sample);
    }

    /// Records and returns the resulting snapshot under the same lock
    pub fn record_and_snapshot(&self, sample: MetricSample) -> Vec<MetricSample> {
        let mut state = self.inner.lock();
        state.current = Some(sample);
        state.history.append(sample);
        state.history.snapshot()
    }

    pub fn set_capacity(&self, capacity: usize) -> Result<()> {
        self.inner.lock().history.set_capacity(capacity)
    }

    /// Empties the history; the current value is kept
    pub fn clear(&self) {
        self.inner.lock().history.clear();
    }

    pub fn snapshot(&self) -> Vec<MetricSample> {
        self.inner.lock().history.snapshot()
    }

    pub fn current(&self) -> Option<MetricSample> {
        self.inner.lock().current
    }

    pub fn len(&self) -> usize {
        self.inner.lock().history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().history.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().history.capacity()
    }
}
