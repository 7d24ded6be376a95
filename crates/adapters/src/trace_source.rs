//! Trace playback source
//!
//! Reads a JSON-lines trace file and replays its records with the original
//! inter-record pacing, so downstream consumers see realistic traffic.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use contracts::{HubError, RecordCallback, RecordSource, VehicleRecord};

/// Playback configuration
#[derive(Debug, Clone)]
pub struct TraceSourceConfig {
    /// Playback speed multiplier (1.0 = recorded speed)
    pub speed_multiplier: f64,

    /// Restart from the top after the last record
    pub loop_playback: bool,
}

impl Default for TraceSourceConfig {
    fn default() -> Self {
        Self {
            speed_multiplier: 1.0,
            loop_playback: false,
        }
    }
}

/// Source that replays a recorded trace file.
///
/// The whole file is parsed at load time; malformed lines are skipped with
/// a log rather than surfacing mid-playback. Records are replayed in
/// timestamp order.
pub struct TraceSource {
    name: String,
    path: PathBuf,
    records: Vec<VehicleRecord>,
    config: TraceSourceConfig,
    callback: Mutex<Option<RecordCallback>>,
    running: Arc<AtomicBool>,
    thread_handle: Mutex<Option<JoinHandle<()>>>,
}

impl TraceSource {
    /// Load a trace file.
    pub fn load(
        name: impl Into<String>,
        path: &Path,
        config: TraceSourceConfig,
    ) -> std::io::Result<Self> {
        let name = name.into();
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let mut records = Vec::new();
        let mut skipped: u64 = 0;
        for (number, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str::<VehicleRecord>(&line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    skipped += 1;
                    warn!(
                        source = %name,
                        line = number + 1,
                        error = %e,
                        "Skipping malformed trace line"
                    );
                }
            }
        }

        // Stable sort: records without timestamps keep file order at the top
        records.sort_by(|a, b| {
            a.timestamp
                .unwrap_or(0.0)
                .total_cmp(&b.timestamp.unwrap_or(0.0))
        });

        info!(
            source = %name,
            path = %path.display(),
            records = records.len(),
            skipped,
            "Loaded trace file"
        );

        Ok(Self {
            name,
            path: path.to_path_buf(),
            records,
            config,
            callback: Mutex::new(None),
            running: Arc::new(AtomicBool::new(false)),
            thread_handle: Mutex::new(None),
        })
    }

    /// Create from params map (for factory)
    ///
    /// Recognized params: `path` (required), `speed` and `loop` (optional).
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, HubError> {
        let path = params
            .get("path")
            .map(PathBuf::from)
            .ok_or_else(|| HubError::construction("trace", "missing 'path' parameter"))?;

        let config = TraceSourceConfig {
            speed_multiplier: params
                .get("speed")
                .and_then(|s| s.parse().ok())
                .unwrap_or(1.0),
            loop_playback: params
                .get("loop")
                .and_then(|s| s.parse().ok())
                .unwrap_or(false),
        };

        Self::load(name, &path, config)
            .map_err(|e| HubError::construction("trace", e.to_string()))
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }
}

impl std::fmt::Debug for TraceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraceSource")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("records", &self.records.len())
            .finish_non_exhaustive()
    }
}

impl RecordSource for TraceSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_callback(&self, callback: RecordCallback) {
        *self.callback.lock() = Some(callback);
    }

    fn start(&self) {
        // Idempotent: if already playing, don't start again
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        let callback = self.callback.lock().clone();
        let Some(callback) = callback else {
            warn!(source = %self.name, "No delivery callback set, not starting");
            self.running.store(false, Ordering::SeqCst);
            return;
        };

        let running = Arc::clone(&self.running);
        let name = self.name.clone();
        let records = self.records.clone();
        let speed = self.config.speed_multiplier.max(0.1);
        let loop_playback = self.config.loop_playback;

        let handle = thread::spawn(move || {
            debug!(source = %name, "Playback thread started");

            loop {
                if records.is_empty() {
                    warn!(source = %name, "No records to replay");
                    break;
                }

                let start_time = Instant::now();
                let first_timestamp = records[0].timestamp.unwrap_or(0.0);

                for record in &records {
                    if !running.load(Ordering::Relaxed) {
                        debug!(source = %name, "Playback stopped");
                        return;
                    }

                    let offset = record.timestamp.unwrap_or(first_timestamp) - first_timestamp;
                    let target_elapsed = Duration::from_secs_f64((offset / speed).max(0.0));
                    let actual_elapsed = start_time.elapsed();

                    if target_elapsed > actual_elapsed {
                        thread::sleep(target_elapsed - actual_elapsed);
                    }

                    callback(record.clone());
                }

                if !loop_playback {
                    info!(source = %name, "Playback completed");
                    break;
                }

                debug!(source = %name, "Looping playback");
            }

            running.store(false, Ordering::SeqCst);
        });

        *self.thread_handle.lock() = Some(handle);
    }

    fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);

        // Wait for the playback thread to exit
        if let Some(handle) = self.thread_handle.lock().take() {
            let _ = handle.join();
        }
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    fn summary(&self) -> String {
        format!(
            "{} [file: {}, records: {}, running: {}]",
            self.name,
            self.path.display(),
            self.records.len(),
            self.is_running()
        )
    }
}
