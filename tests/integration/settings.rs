use crate::common::{TestProviderBuilder, TestSettingsBuilder};
use coretray_metrics::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::time;

fn provider() -> SharedProvider {
    let (provider, _handle) = TestProviderBuilder::new()
        .with_steady(MetricKey::CpuTemperature, 100.0)
        .with_steady(MetricKey::GpuTemperature, 50.0)
        .with_steady(MetricKey::RamUsagePercent, 25.0)
        .with_steady(MetricKey::RamUsed, 4.0)
        .with_steady(MetricKey::RamTotal, 16.0)
        .build();
    SharedProvider::new(provider)
}

#[tokio::test(start_paused = true)]
async fn test_saved_interval_rearms_running_samplers() {
    let initial = TestSettingsBuilder::new().with_interval_ms(1000).build();
    let manager = Arc::new(MetricManager::new(provider(), initial.clone()).unwrap());
    let source = SettingsSource::new(initial.clone());
    let _listener = manager.watch_settings(&source);
    manager.start_all().unwrap();

    time::sleep(Duration::from_millis(500)).await;
    source.save(AppSettings { update_interval_ms: 200, ..initial }).unwrap();

    // Re-armed at t=500: ticks land at 700 and 900, the old 1000ms timer never fires
    time::sleep(Duration::from_millis(550)).await;
    assert!(manager.snapshot().iter().all(|r| r.history_len == 2));
    manager.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_saved_unit_changes_only_formatting() {
    let manager = Arc::new(MetricManager::new(provider(), AppSettings::default()).unwrap());
    let source = SettingsSource::default();
    let _listener = manager.watch_settings(&source);
    manager.start_all().unwrap();
    time::sleep(Duration::from_millis(2500)).await;

    source
        .save(TestSettingsBuilder::new().with_unit(TemperatureUnit::Fahrenheit).with_precision(0).build())
        .unwrap();
    time::sleep(Duration::from_millis(10)).await;

    let cpu = manager.require(MetricKey::CpuTemperature).unwrap();
    assert_eq!(cpu.formatted_current(), "212°F");
    assert_eq!(cpu.history().len(), 2);
    assert!(cpu.history().iter().all(|s| s.value() == 100.0));
    assert!(cpu.display_history().iter().all(|s| s.value() == 212.0));
    let ram = manager.require(MetricKey::RamUsagePercent).unwrap();
    assert_eq!(ram.formatted_current(), "25%");
    manager.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_rejected_save_keeps_samplers_running() {
    let manager = Arc::new(MetricManager::new(provider(), AppSettings::default()).unwrap());
    let source = SettingsSource::default();
    let _listener = manager.watch_settings(&source);
    manager.start_all().unwrap();

    let bad = TestSettingsBuilder::new().with_max_data_points(0).build();
    assert!(matches!(source.save(bad), Err(Error::InvalidConfig(_))));
    time::sleep(Duration::from_millis(1500)).await;

    assert_eq!(manager.settings(), AppSettings::default());
    assert!(manager.snapshot().iter().all(|r| r.history_len == 1));
    manager.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_settings_file_round_trip_drives_manager() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    TestSettingsBuilder::new()
        .with_interval_ms(250)
        .with_max_data_points(2)
        .with_auto_start(true)
        .with_unit(TemperatureUnit::Kelvin)
        .with_precision(0)
        .build()
        .save_to_file(&path)
        .unwrap();

    let settings = AppSettings::load_or_default(&path);
    let manager = MetricManager::new(provider(), settings).unwrap();
    assert!(manager.start_if_enabled().unwrap());
    time::sleep(Duration::from_millis(1100)).await;

    let cpu = manager.require(MetricKey::CpuTemperature).unwrap();
    assert_eq!(cpu.history().len(), 2);
    assert_eq!(cpu.formatted_current(), "373K");
    manager.shutdown().await;
}

#[test]
fn test_missing_settings_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let settings = AppSettings::load_or_default(dir.path().join("absent.json"));
    assert_eq!(settings, AppSettings::default());
}
