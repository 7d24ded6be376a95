//! Mock Hub Example
//!
//! Demonstrates a complete blueprint-driven hub fed by the deterministic
//! mock source. Runs without any remote endpoint.
//!
//! Run with: cargo run --bin mock_hub [config_path]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use adapters::{build_sink, build_source};
use config_loader::ConfigLoader;
use contracts::{Measurement, MeasurementListener};
use hub::VehicleHub;
use tracing::{info, warn};

/// Listener that logs every speed update it is notified about.
struct SpeedLogger {
    seen: AtomicU64,
}

impl MeasurementListener for SpeedLogger {
    fn on_measurement(&self, measurement: &Measurement) {
        let n = self.seen.fetch_add(1, Ordering::Relaxed) + 1;
        if let Some(speed) = measurement.as_f64() {
            info!(
                n,
                speed = format!("{:.1} {}", speed, measurement.descriptor().unit()),
                "Speed update"
            );
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    info!("Starting Mock Hub Demo");

    // ==== Stage 1: Use default config or load from file ====
    let blueprint = if let Some(path) = std::env::args().nth(1) {
        info!(path = %path, "Loading blueprint config");
        ConfigLoader::load_from_path(std::path::Path::new(&path))?
    } else {
        // Create a minimal test blueprint
        create_test_blueprint()
    };

    // ==== Stage 2: Build the hub over the configured signal catalog ====
    let registry = blueprint.build_registry();
    info!(signals = registry.len(), "Signal registry built");
    let hub = VehicleHub::named(blueprint.hub.name.clone(), registry);

    // ==== Stage 3: Attach sinks from config ====
    for sink_config in &blueprint.sinks {
        let sink = build_sink(sink_config)?;
        hub.add_sink(sink);
        info!(sink = %sink_config.name, "Sink attached");
    }

    // ==== Stage 4: Register a measurement listener ====
    let speed_logger = Arc::new(SpeedLogger {
        seen: AtomicU64::new(0),
    });
    hub.add_listener("vehicle_speed", speed_logger.clone())?;

    // ==== Stage 5: Attach sources and run ====
    for source_config in &blueprint.sources {
        let source = build_source(source_config)?;
        hub.add_source(source);
    }

    let target_records = 200u64;
    let deadline = Instant::now() + Duration::from_secs(30);
    info!(target_records, "Running hub");

    loop {
        thread::sleep(Duration::from_millis(200));

        let stats = hub.stats();
        if stats.records_dispatched >= target_records {
            info!(
                records = stats.records_dispatched,
                speed_updates = speed_logger.seen.load(Ordering::Relaxed),
                "Target reached"
            );
            break;
        }
        if Instant::now() >= deadline {
            warn!(records = stats.records_dispatched, "Demo timed out");
            break;
        }
    }

    // ==== Stage 6: Cleanup ====
    info!("Shutting down...");

    // Typed cache queries keep answering until the process exits
    if let Ok(speed) = hub.latest("vehicle_speed") {
        info!(
            last_speed = format!("{:.1}", speed.as_f64().unwrap_or(0.0)),
            "Last cached speed"
        );
    }
    for summary in hub.sink_summaries() {
        info!(sink = %summary, "Sink summary");
    }

    hub.stop();

    let stats = hub.stats();
    info!(
        records = stats.records_dispatched,
        rejected = stats.records_rejected,
        "Mock Hub Demo finished"
    );

    Ok(())
}

fn create_test_blueprint() -> contracts::HubBlueprint {
    use contracts::*;

    HubBlueprint {
        version: ConfigVersion::V1,
        hub: HubSettings {
            name: "demo-hub".to_string(),
            standard_signals: true,
            signals: vec![],
        },
        sources: vec![SourceConfig {
            id: "scripted_feed".to_string(),
            kind: SourceKind::Mock,
            params: HashMap::from([("frequency_hz".to_string(), "50".to_string())]),
        }],
        sinks: vec![SinkConfig {
            name: "console".to_string(),
            kind: SinkKind::Log,
            params: HashMap::from([("interval".to_string(), "25".to_string())]),
        }],
    }
}
