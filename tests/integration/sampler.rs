use crate::common::{Step, TestProviderBuilder};
use coretray_metrics::prelude::*;
use coretray_metrics::sampler::{TickOutcome, NOT_AVAILABLE};
use std::time::Duration;
use tokio::time;

fn settings(interval_ms: u64, capacity: usize) -> AppSettings {
    crate::common::TestSettingsBuilder::new().with_interval_ms(interval_ms).with_max_data_points(capacity).build()
}

fn values(sampler: &MetricSampler) -> Vec<f64> {
    sampler.history().iter().map(|s| s.value()).collect()
}

#[tokio::test(start_paused = true)]
async fn test_history_keeps_newest_three_of_four() {
    let (provider, _handle) =
        TestProviderBuilder::new().with_readings(MetricKey::CpuTemperature, &[10.0, 20.0, 30.0, 40.0]).build();
    let manager =
        MetricManager::with_metrics(SharedProvider::new(provider), settings(1000, 3), [MetricKey::CpuTemperature])
            .unwrap();
    manager.start_all().unwrap();
    time::sleep(Duration::from_millis(4500)).await;

    let cpu = manager.require(MetricKey::CpuTemperature).unwrap();
    assert_eq!(values(cpu), vec![20.0, 30.0, 40.0]);
    assert_eq!(cpu.current().map(|s| s.value()), Some(40.0));
    manager.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_absent_and_failed_reads_leave_series_untouched() {
    let (provider, _handle) = TestProviderBuilder::new()
        .with_steps(MetricKey::CpuTemperature, &[Step::Value(50.0), Step::Fail, Step::Absent, Step::Value(60.0)])
        .build();
    let manager =
        MetricManager::with_metrics(SharedProvider::new(provider), settings(100, 10), [MetricKey::CpuTemperature])
            .unwrap();
    manager.start_all().unwrap();

    time::sleep(Duration::from_millis(350)).await;
    let cpu = manager.require(MetricKey::CpuTemperature).unwrap();
    assert_eq!(values(cpu), vec![50.0]);
    assert_eq!(cpu.formatted_current(), "50.0°C");

    time::sleep(Duration::from_millis(100)).await;
    assert_eq!(values(cpu), vec![50.0, 60.0]);
    let stats = cpu.stats();
    assert_eq!((stats.samples, stats.failed_reads, stats.absent_reads), (2, 1, 1));
    assert!(cpu.is_running());
    manager.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_every_tick_refreshes_the_shared_provider() {
    let (provider, handle) = TestProviderBuilder::new()
        .with_steady(MetricKey::CpuTemperature, 45.0)
        .with_steady(MetricKey::GpuTemperature, 55.0)
        .with_steady(MetricKey::RamUsagePercent, 30.0)
        .with_steady(MetricKey::RamUsed, 4.8)
        .with_steady(MetricKey::RamTotal, 16.0)
        .build();
    let manager = MetricManager::new(SharedProvider::new(provider), settings(100, 10)).unwrap();
    manager.start_all().unwrap();
    time::sleep(Duration::from_millis(350)).await;

    assert_eq!(handle.refreshes(), 15);
    assert_eq!(handle.reads(), 15);
    manager.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_degraded_provider_keeps_monitoring_alive() {
    let provider = open_or_degraded::<crate::common::TestProvider>(Err(Error::ProviderInit("no sensors".into())));
    assert!(provider.is_degraded());

    let manager = MetricManager::new(provider, settings(100, 10)).unwrap();
    assert_eq!(manager.device_name(DeviceKind::Cpu), "CPU Not Found");
    assert_eq!(manager.device_name(DeviceKind::Memory), "RAM Not Found");

    manager.start_all().unwrap();
    time::sleep(Duration::from_millis(550)).await;
    for reading in manager.snapshot() {
        assert_eq!(reading.formatted, NOT_AVAILABLE);
        assert_eq!(reading.history_len, 0);
    }
    let cpu = manager.require(MetricKey::CpuTemperature).unwrap();
    assert!(cpu.is_running());
    assert_eq!(cpu.stats().absent_reads, 5);
    manager.shutdown().await;
}

#[tokio::test]
async fn test_manual_ticks_after_close_read_absent() {
    let (provider, handle) = TestProviderBuilder::new().with_steady(MetricKey::RamUsagePercent, 12.0).build();
    let manager =
        MetricManager::with_metrics(SharedProvider::new(provider), settings(1000, 10), [MetricKey::RamUsagePercent])
            .unwrap();
    let ram = manager.require(MetricKey::RamUsagePercent).unwrap();
    assert_eq!(ram.tick(), TickOutcome::Sampled(12.0));

    manager.shutdown().await;
    assert_eq!(ram.tick(), TickOutcome::Absent);
    assert_eq!(handle.refreshes(), 1);
    assert_eq!(ram.formatted_current(), "12.0%");
}
