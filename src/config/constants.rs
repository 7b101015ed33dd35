use std::time::Duration;

pub const DEFAULT_UPDATE_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_MAX_DATA_POINTS: usize = 250;
pub const DEFAULT_DECIMAL_PRECISION: u8 = 1;

pub const MIN_INTERVAL: Duration = Duration::from_millis(1);
pub const MAX_INTERVAL: Duration = Duration::from_secs(3600);
