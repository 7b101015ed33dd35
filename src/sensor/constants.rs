//! Sensor label matching rules.
//!
//! Hardware libraries expose temperatures as labelled components. The CPU
//! reading prefers the hottest-core / package sensors and falls back to any
//! CPU-looking label; the GPU reading takes the first GPU-looking label.

/// Preferred CPU temperature labels, in priority order
pub const CPU_PREFERRED_LABELS: &[&str] = &["core max", "cpu package", "package id", "tctl/tdie", "tctl", "tdie"];

/// Any of these marks a label as belonging to the CPU
pub const CPU_FALLBACK_LABELS: &[&str] = &["cpu", "core", "k10temp", "coretemp", "package"];

/// Any of these marks a label as belonging to the GPU
pub const GPU_LABELS: &[&str] = &["gpu", "amdgpu", "nvidia", "radeon", "nouveau", "edge"];

/// Picks the CPU temperature from `(label, celsius)` pairs
pub fn select_cpu_temperature<'a, I>(readings: I) -> Option<f64>
where
    I: IntoIterator<Item = (&'a str, f64)> + Clone,
{
    for preferred in CPU_PREFERRED_LABELS {
        let hit = readings
            .clone()
            .into_iter()
            .find(|(label, _)| label.to_lowercase().contains(preferred));
        if let Some((_, value)) = hit {
            return Some(value);
        }
    }
    readings
        .into_iter()
        .find(|(label, _)| {
            let label = label.to_lowercase();
            !is_gpu_label(&label) && CPU_FALLBACK_LABELS.iter().any(|p| label.contains(p))
        })
        .map(|(_, value)| value)
}

/// Picks the GPU temperature from `(label, celsius)` pairs
pub fn select_gpu_temperature<'a, I>(readings: I) -> Option<f64>
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    readings
        .into_iter()
        .find(|(label, _)| is_gpu_label(&label.to_lowercase()))
        .map(|(_, value)| value)
}

fn is_gpu_label(lowercase: &str) -> bool {
    GPU_LABELS.iter().any(|p| lowercase.contains(p))
}
