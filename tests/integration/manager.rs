use crate::common::{TestProviderBuilder, TestSettingsBuilder};
use coretray_metrics::prelude::*;
use coretray_metrics::sampler::sink::MockDisplaySink;
use coretray_metrics::sensor::MockSensorProvider;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time;

fn steady_provider() -> (SharedProvider, crate::common::ProviderHandle) {
    let (provider, handle) = TestProviderBuilder::new()
        .with_steady(MetricKey::CpuTemperature, 45.25)
        .with_steady(MetricKey::GpuTemperature, 61.0)
        .with_steady(MetricKey::RamUsagePercent, 42.26)
        .with_steady(MetricKey::RamUsed, 6.76)
        .with_steady(MetricKey::RamTotal, 16.0)
        .with_name(DeviceKind::Cpu, "Test CPU")
        .build();
    (SharedProvider::new(provider), handle)
}

#[tokio::test(start_paused = true)]
async fn test_display_receives_every_metric() {
    let (provider, _handle) = steady_provider();
    let manager = MetricManager::new(provider, TestSettingsBuilder::new().with_interval_ms(100).build()).unwrap();
    let (sink, mut updates) = ChannelSink::channel();
    manager.set_sink(Arc::new(sink));
    manager.start_all().unwrap();

    let mut seen: HashMap<MetricKey, Vec<DisplayUpdate>> = HashMap::new();
    for _ in 0..10 {
        let update = updates.recv().await.unwrap();
        seen.entry(update.key).or_default().push(update);
    }
    assert_eq!(seen.len(), 5);
    assert!(seen.values().all(|u| u.len() == 2));

    let cpu = &seen[&MetricKey::CpuTemperature];
    assert_eq!(cpu[1].formatted, "45.3°C");
    assert_eq!(cpu[1].history.len(), 2);
    assert_eq!(seen[&MetricKey::RamUsagePercent][0].formatted, "42.3%");
    assert_eq!(seen[&MetricKey::RamUsed][0].formatted, "6.8 GB");
    assert_eq!(seen[&MetricKey::RamTotal][0].formatted, "16.0 GB");
    manager.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_clear_graphs_restarts_history() {
    let (provider, _handle) = steady_provider();
    let manager = MetricManager::with_metrics(
        provider,
        TestSettingsBuilder::new().with_interval_ms(100).build(),
        [MetricKey::GpuTemperature],
    )
    .unwrap();
    let (sink, mut updates) = ChannelSink::channel();
    manager.set_sink(Arc::new(sink));
    manager.start_all().unwrap();

    for expected in 1..=3 {
        assert_eq!(updates.recv().await.unwrap().history.len(), expected);
    }
    manager.clear_all_histories();
    let gpu = manager.require(MetricKey::GpuTemperature).unwrap();
    assert!(gpu.history().is_empty());
    assert!(gpu.is_running());
    assert_eq!(gpu.formatted_current(), "61.0°C");

    assert_eq!(updates.recv().await.unwrap().history.len(), 1);
    manager.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_stop_all_then_restart() {
    let (provider, _handle) = steady_provider();
    let manager = MetricManager::new(provider, TestSettingsBuilder::new().with_interval_ms(100).build()).unwrap();
    manager.start_all().unwrap();
    time::sleep(Duration::from_millis(250)).await;
    manager.stop_all();
    time::sleep(Duration::from_millis(1000)).await;
    assert!(manager.snapshot().iter().all(|r| r.history_len == 2));

    manager.start_all().unwrap();
    time::sleep(Duration::from_millis(150)).await;
    assert!(manager.snapshot().iter().all(|r| r.history_len == 3));
    manager.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_tolerates_failing_close() {
    let (provider, handle) = TestProviderBuilder::new()
        .with_steady(MetricKey::CpuTemperature, 40.0)
        .with_failing_close()
        .build();
    let manager = MetricManager::new(SharedProvider::new(provider), TestSettingsBuilder::new().build()).unwrap();
    manager.start_all().unwrap();
    time::sleep(Duration::from_millis(1500)).await;

    manager.shutdown().await;
    assert!(manager.metrics().all(|k| !manager.sampler(k).unwrap().is_running()));
    drop(manager);
    assert_eq!(handle.closes(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_manager_closes_provider() {
    let (provider, handle) = steady_provider();
    {
        let manager = MetricManager::new(provider, TestSettingsBuilder::new().build()).unwrap();
        assert_eq!(manager.device_name(DeviceKind::Cpu), "Test CPU");
        assert_eq!(manager.device_name(DeviceKind::Gpu), "GPU Not Found");
        manager.start_all().unwrap();
    }
    time::sleep(Duration::from_millis(3000)).await;
    assert_eq!(handle.closes(), 1);
    assert_eq!(handle.refreshes(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_mock_sink_sees_each_successful_tick() {
    let mut provider = MockSensorProvider::new();
    provider.expect_refresh().times(3).returning(|| Ok(()));
    provider
        .expect_read_metric()
        .withf(|key| *key == MetricKey::CpuTemperature)
        .times(3)
        .returning(|_| Ok(Some(45.5)));
    provider.expect_name().returning(|_| None);
    provider.expect_close().times(1).returning(|| Ok(()));

    let mut sink = MockDisplaySink::new();
    sink.expect_publish()
        .withf(|update| update.key == MetricKey::CpuTemperature && update.formatted == "45.5°C")
        .times(3)
        .return_const(());

    let manager = MetricManager::with_metrics(
        SharedProvider::new(provider),
        TestSettingsBuilder::new().with_interval_ms(100).build(),
        [MetricKey::CpuTemperature],
    )
    .unwrap();
    manager.set_sink(Arc::new(sink));
    manager.start_all().unwrap();
    time::sleep(Duration::from_millis(350)).await;

    manager.shutdown().await;
    assert_eq!(manager.require(MetricKey::CpuTemperature).unwrap().history().len(), 3);
}
