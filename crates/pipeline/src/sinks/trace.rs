//! TraceSink - appends records to a JSON-lines trace file

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::{debug, error};

use contracts::{HubError, RecordSink, VehicleRecord};

/// Configuration for TraceSink
#[derive(Debug, Clone)]
pub struct TraceSinkConfig {
    /// Output trace file
    pub path: PathBuf,
    /// Flush after this many records
    pub flush_interval: u64,
}

impl TraceSinkConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, String> {
        let path = params
            .get("path")
            .map(PathBuf::from)
            .ok_or_else(|| "missing 'path' parameter".to_string())?;

        let flush_interval = params
            .get("flush_interval")
            .and_then(|s| s.parse().ok())
            .unwrap_or(64);

        Ok(Self {
            path,
            flush_interval,
        })
    }
}

/// Sink that records traffic as one JSON record per line.
///
/// Records without a timestamp are stamped with the arrival wall clock, so
/// the file replays with realistic pacing.
#[derive(Debug)]
pub struct TraceSink {
    name: String,
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
    flush_interval: u64,
    records_written: AtomicU64,
}

impl TraceSink {
    /// Create a new TraceSink, truncating any existing file at the path.
    pub fn new(name: impl Into<String>, config: TraceSinkConfig) -> std::io::Result<Self> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(&config.path)?;

        Ok(Self {
            name: name.into(),
            path: config.path,
            writer: Mutex::new(BufWriter::new(file)),
            flush_interval: config.flush_interval.max(1),
            records_written: AtomicU64::new(0),
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, HubError> {
        let config =
            TraceSinkConfig::from_params(params).map_err(|e| HubError::construction("trace", e))?;
        Self::new(name, config).map_err(|e| HubError::construction("trace", e.to_string()))
    }

    pub fn records_written(&self) -> u64 {
        self.records_written.load(Ordering::Relaxed)
    }
}

impl RecordSink for TraceSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn receive(&self, record: &VehicleRecord) -> Result<(), HubError> {
        let line = serde_json::to_string(&record.clone().stamped())
            .map_err(|e| HubError::sink_write(&self.name, e.to_string()))?;

        let mut writer = self.writer.lock();
        writeln!(writer, "{line}").map_err(|e| {
            error!(sink = %self.name, error = %e, "Trace write failed");
            HubError::sink_write(&self.name, e.to_string())
        })?;

        let written = self.records_written.fetch_add(1, Ordering::Relaxed) + 1;
        if written % self.flush_interval == 0 {
            writer
                .flush()
                .map_err(|e| HubError::sink_write(&self.name, e.to_string()))?;
        }
        Ok(())
    }

    fn stop(&self) {
        if let Err(e) = self.writer.lock().flush() {
            error!(sink = %self.name, error = %e, "Trace flush failed");
        }
        debug!(
            sink = %self.name,
            records = self.records_written(),
            "TraceSink closed"
        );
    }

    fn summary(&self) -> String {
        format!(
            "{} [file: {}, records: {}]",
            self.name,
            self.path.display(),
            self.records_written()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufRead;
    use tempfile::tempdir;

    #[test]
    fn writes_one_json_line_per_record() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("drive.json");
        let config = TraceSinkConfig {
            path: path.clone(),
            flush_interval: 64,
        };

        let sink = TraceSink::new("trace", config).unwrap();
        sink.receive(&VehicleRecord::new("vehicle_speed", 30.0).at(10.0))
            .unwrap();
        sink.receive(&VehicleRecord::new("fuel_level", 90.0).at(11.0))
            .unwrap();
        sink.stop();

        let file = File::open(&path).unwrap();
        let lines: Vec<String> = std::io::BufReader::new(file)
            .lines()
            .map(|l| l.unwrap())
            .collect();
        assert_eq!(lines.len(), 2);

        let first: VehicleRecord = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(first.name, "vehicle_speed");
        assert_eq!(first.timestamp, Some(10.0));
    }

    #[test]
    fn stamps_unstamped_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stamped.json");
        let config = TraceSinkConfig {
            path: path.clone(),
            flush_interval: 1,
        };

        let sink = TraceSink::new("trace", config).unwrap();
        sink.receive(&VehicleRecord::new("engine_speed", 900.0))
            .unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let record: VehicleRecord = serde_json::from_str(contents.trim()).unwrap();
        assert!(record.timestamp.unwrap() > 0.0);
    }

    #[test]
    fn from_params_requires_path() {
        let err = TraceSink::from_params("trace", &HashMap::new()).unwrap_err();
        assert!(matches!(err, HubError::Construction { .. }));
    }
}
