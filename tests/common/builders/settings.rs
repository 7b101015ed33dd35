use coretray_metrics::config::AppSettings;
use coretray_metrics::core::types::TemperatureUnit;

/// Builder for creating AppSettings test instances
pub struct TestSettingsBuilder {
    settings: AppSettings,
}

impl TestSettingsBuilder {
    pub fn new() -> Self {
        Self { settings: AppSettings::default() }
    }

    pub fn with_interval_ms(mut self, ms: u64) -> Self {
        self.settings.update_interval_ms = ms;
        self
    }

    pub fn with_max_data_points(mut self, points: usize) -> Self {
        self.settings.max_data_points = points;
        self
    }

    pub fn with_unit(mut self, unit: TemperatureUnit) -> Self {
        self.settings.temperature_unit = unit;
        self
    }

    pub fn with_precision(mut self, precision: u8) -> Self {
        self.settings.decimal_precision = precision;
        self
    }

    pub fn with_auto_start(mut self, enabled: bool) -> Self {
        self.settings.auto_start_monitoring = enabled;
        self
    }

    pub fn build(self) -> AppSettings {
        self.settings
    }
}

impl Default for TestSettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
