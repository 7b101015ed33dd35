//! Prints live CPU, GPU and RAM readings from the sysinfo provider
//!
//! Run with `cargo run --example console_monitor`; set `RUST_LOG=debug` for
//! sampler diagnostics.

use coretray_metrics::prelude::*;
use coretray_metrics::logging;
use std::sync::Arc;

const UPDATES: usize = 12;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = AppSettings { update_interval_ms: 500, ..AppSettings::default() };
    logging::init(settings.enable_debug_logging);

    let provider = open_or_degraded(SysinfoProvider::new());
    let manager = MetricManager::new(provider, settings)?;
    for device in [DeviceKind::Cpu, DeviceKind::Gpu, DeviceKind::Memory] {
        println!("{:>4}: {}", device.to_string(), manager.device_name(device));
    }

    let (sink, mut updates) = ChannelSink::channel();
    manager.set_sink(Arc::new(sink));
    manager.start_all()?;

    for _ in 0..UPDATES {
        let Some(update) = updates.recv().await else {
            break;
        };
        println!("{:<16} {:>10}  ({} samples)", update.key.to_string(), update.formatted, update.history.len());
    }

    for reading in manager.snapshot() {
        println!("final {}: {}", reading.key, reading.formatted);
    }
    manager.shutdown().await;
    Ok(())
}
