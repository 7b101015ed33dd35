//! # Reconfiguration
//!
//! Settings events carry the whole settings document, changed or not. The
//! controller keeps the last accepted document, validates the incoming one
//! and diffs it field by field so samplers only do the work a change needs:
//!
//! * interval changed - the sampler's timer is replaced
//! * capacity changed - the history is trimmed (never grown)
//! * unit / precision changed - only formatting changes; stored samples stay in Celsius

use tracing::{debug, warn};

use crate::config::{AppSettings, SamplerConfig};
use crate::error::Result;

/// Which fields differ between two sampler configurations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConfigChange {
    pub interval: bool,
    pub capacity: bool,
    pub unit: bool,
    pub precision: bool,
}

impl ConfigChange {
    pub fn between(old: &SamplerConfig, new: &SamplerConfig) -> Self {
        Self {
            interval: old.interval != new.interval,
            capacity: old.capacity != new.capacity,
            unit: old.unit != new.unit,
            precision: old.precision != new.precision,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.interval || self.capacity || self.unit || self.precision)
    }

    /// Only display formatting is affected
    pub fn is_display_only(&self) -> bool {
        !self.is_empty() && !self.interval && !self.capacity
    }
}

/// Outcome of accepting a new settings document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconfiguration {
    /// Configuration every sampler should now run with
    pub config: SamplerConfig,
    /// Diff against the previously accepted configuration
    pub change: ConfigChange,
    /// Auto-start went from off to on
    pub auto_start_enabled: bool,
    /// The debug-logging toggle flipped
    pub debug_logging_changed: bool,
}

/// Holds the last valid settings and turns new ones into minimal updates
#[derive(Debug, Clone)]
pub struct ReconfigurationController {
    current: AppSettings,
}

impl ReconfigurationController {
    pub fn new(initial: AppSettings) -> Result<Self> {
        initial.validate()?;
        Ok(Self { current: initial })
    }

    pub fn current(&self) -> &AppSettings {
        &self.current
    }

    pub fn sampler_config(&self) -> SamplerConfig {
        self.current.sampler_config()
    }

    /// Accepts `next` if valid and reports what changed
    ///
    /// On a validation error nothing is stored; the previous settings remain in effect.
    pub fn accept(&mut self, next: AppSettings) -> Result<Reconfiguration> {
        if let Err(e) = next.validate() {
            warn!("Ignoring invalid settings: {}", e);
            return Err(e);
        }

        let old = self.current.sampler_config();
        let config = next.sampler_config();
        let plan = Reconfiguration {
            config,
            change: ConfigChange::between(&old, &config),
            auto_start_enabled: next.auto_start_monitoring && !self.current.auto_start_monitoring,
            debug_logging_changed: next.enable_debug_logging != self.current.enable_debug_logging,
        };
        debug!(change = ?plan.change, "Settings accepted");
        self.current = next;
        Ok(plan)
    }
}
