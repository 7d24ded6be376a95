//! Mock source implementation
//!
//! Implements `RecordSource`, generating plausible vehicle telemetry at a
//! fixed rate. Used for development and demos without a vehicle interface.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, trace};

use contracts::{RecordCallback, RecordSource, VehicleRecord};

/// Mock source configuration
#[derive(Debug, Clone)]
pub struct MockSourceConfig {
    /// Emit rate (records per second)
    pub frequency_hz: f64,
}

impl Default for MockSourceConfig {
    fn default() -> Self {
        Self { frequency_hz: 10.0 }
    }
}

/// Mock source
///
/// Cycles through a handful of standard signals with deterministic values,
/// emitted from a background thread at the configured rate. Values follow
/// simple ramps so downstream displays visibly change.
pub struct MockSource {
    name: String,
    config: MockSourceConfig,
    callback: Mutex<Option<RecordCallback>>,
    running: Arc<AtomicBool>,
}

impl MockSource {
    /// Create a new mock source
    pub fn new(name: impl Into<String>, config: MockSourceConfig) -> Self {
        Self {
            name: name.into(),
            config,
            callback: Mutex::new(None),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create a mock source with default configuration
    pub fn with_defaults(name: impl Into<String>) -> Self {
        Self::new(name, MockSourceConfig::default())
    }

    /// Create from params map (for factory)
    ///
    /// Recognized params: `frequency_hz` (optional).
    pub fn from_params(name: impl Into<String>, params: &HashMap<String, String>) -> Self {
        let config = MockSourceConfig {
            frequency_hz: params
                .get("frequency_hz")
                .and_then(|s| s.parse().ok())
                .unwrap_or(10.0),
        };
        Self::new(name, config)
    }

    /// Generate the record for one tick
    fn generate_record(tick: u64) -> VehicleRecord {
        let record = match tick % 6 {
            0 => VehicleRecord::new("vehicle_speed", 30.0 + (tick % 80) as f64),
            1 => VehicleRecord::new("engine_speed", 900.0 + 35.0 * (tick % 100) as f64),
            2 => VehicleRecord::new("fuel_level", 100.0 - (tick % 1000) as f64 / 10.0),
            3 => VehicleRecord::new("steering_wheel_angle", (tick % 120) as f64 - 60.0),
            4 => VehicleRecord::new("brake_pedal_status", tick % 2 == 0),
            _ => VehicleRecord::new("ignition_status", "run"),
        };
        record.stamped()
    }
}

impl RecordSource for MockSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_callback(&self, callback: RecordCallback) {
        *self.callback.lock() = Some(callback);
    }

    fn start(&self) {
        // Idempotent: if already emitting, don't start again
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        let callback = self.callback.lock().clone();
        let Some(callback) = callback else {
            debug!(source = %self.name, "No delivery callback set, not starting");
            self.running.store(false, Ordering::SeqCst);
            return;
        };

        let name = self.name.clone();
        let running = Arc::clone(&self.running);
        let interval = Duration::from_secs_f64(1.0 / self.config.frequency_hz.max(0.1));

        thread::spawn(move || {
            let mut tick: u64 = 0;

            debug!(source = %name, interval_ms = interval.as_millis() as u64, "Mock source started");

            while running.load(Ordering::Relaxed) {
                tick += 1;
                let record = MockSource::generate_record(tick);

                trace!(source = %name, record = %record.name, tick, "Mock record emitted");
                callback(record);

                thread::sleep(interval);
            }

            debug!(source = %name, "Mock source stopped");
        });
    }

    fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}
