//! Loopback Hub Example
//!
//! Demonstrates the remote binding lifecycle against the in-process
//! loopback endpoint: a blocked waiter, streamed records, typed queries,
//! outbound commands and the stale-cache behavior after a disconnect.
//!
//! Run with: cargo run --bin loopback_hub

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use adapters::LoopbackEndpoint;
use contracts::{Measurement, MeasurementListener, VehicleRecord};
use hub::VehicleHub;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

struct FuelWatcher {
    updates: AtomicU64,
}

impl MeasurementListener for FuelWatcher {
    fn on_measurement(&self, measurement: &Measurement) {
        self.updates.fetch_add(1, Ordering::Relaxed);
        if let Some(level) = measurement.as_f64() {
            info!(level = format!("{:.1}%", level), "Fuel update");
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting Loopback Hub Demo");

    // ==== Stage 1: Build the hub and register a listener ====
    let hub = VehicleHub::new();
    let watcher = Arc::new(FuelWatcher {
        updates: AtomicU64::new(0),
    });
    hub.add_listener("fuel_level", watcher.clone())?;

    // ==== Stage 2: Block a waiter until the endpoint binds ====
    let waiter_hub = Arc::clone(&hub);
    let waiter = thread::spawn(move || {
        info!("Waiting for a remote endpoint...");
        waiter_hub.wait_until_bound();
        info!("Remote endpoint bound, waiter released");
    });

    thread::sleep(Duration::from_millis(300));

    // ==== Stage 3: Bind the loopback endpoint ====
    let endpoint = Arc::new(LoopbackEndpoint::new());
    hub.on_remote_connected(endpoint.clone());
    waiter.join().expect("waiter thread panicked");

    // ==== Stage 4: Simulate upstream traffic ====
    let feeder_endpoint = Arc::clone(&endpoint);
    let feeder = thread::spawn(move || {
        for i in 0..20u64 {
            feeder_endpoint.inject(VehicleRecord::new("vehicle_speed", 50.0 + i as f64).stamped());
            feeder_endpoint
                .inject(VehicleRecord::new("fuel_level", 80.0 - i as f64 * 0.5).stamped());
            thread::sleep(Duration::from_millis(20));
        }
    });
    feeder.join().expect("feeder thread panicked");

    // ==== Stage 5: Typed queries, commands and the admin surface ====
    let speed = hub.get("vehicle_speed")?;
    info!(
        speed = format!("{:.1} {}", speed.as_f64().unwrap_or(0.0), speed.descriptor().unit()),
        "Queried current speed"
    );

    hub.set(&VehicleRecord::new("high_beam_status", true))?;
    info!(commands = endpoint.commands().len(), "Command delivered");

    hub.initialize_default_sources()?;
    info!(messages = hub.message_count()?, "Endpoint message count");
    for summary in hub.source_summaries() {
        info!(source = %summary, "Source summary");
    }

    // ==== Stage 6: Disconnect and shutdown ====
    info!("Disconnecting remote endpoint...");
    hub.on_remote_disconnected();

    // Injection no longer reaches the hub, but the cache stays readable
    endpoint.inject(VehicleRecord::new("fuel_level", 0.0).stamped());
    let stale = hub.latest("fuel_level")?;
    info!(
        level = format!("{:.1}%", stale.as_f64().unwrap_or(0.0)),
        "Stale cached fuel level"
    );

    hub.stop();

    let stats = hub.stats();
    info!(
        records = stats.records_dispatched,
        fuel_updates = watcher.updates.load(Ordering::Relaxed),
        commands = stats.commands_sent,
        binding = ?stats.binding,
        "Loopback Hub Demo finished"
    );

    Ok(())
}
