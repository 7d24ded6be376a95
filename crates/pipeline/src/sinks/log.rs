//! LogSink - logs record traffic via tracing

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, info};

use contracts::{HubError, RecordSink, VehicleRecord};

/// Sink that logs each record at debug level and a running count at info.
pub struct LogSink {
    name: String,
    interval: u64,
    records_seen: AtomicU64,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_interval(name, 100)
    }

    /// Create a LogSink that reports a summary every `interval` records
    pub fn with_interval(name: impl Into<String>, interval: u64) -> Self {
        Self {
            name: name.into(),
            interval: interval.max(1),
            records_seen: AtomicU64::new(0),
        }
    }

    /// Create from params map (for factory)
    pub fn from_params(name: impl Into<String>, params: &HashMap<String, String>) -> Self {
        let interval = params
            .get("interval")
            .and_then(|s| s.parse().ok())
            .unwrap_or(100);
        Self::with_interval(name, interval)
    }

    pub fn records_seen(&self) -> u64 {
        self.records_seen.load(Ordering::Relaxed)
    }
}

impl RecordSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn receive(&self, record: &VehicleRecord) -> Result<(), HubError> {
        debug!(
            sink = %self.name,
            record = %record.name,
            value = ?record.value,
            "Record received"
        );

        let seen = self.records_seen.fetch_add(1, Ordering::Relaxed) + 1;
        if seen % self.interval == 0 {
            info!(sink = %self.name, records = seen, "Traffic summary");
        }
        Ok(())
    }

    fn stop(&self) {
        info!(
            sink = %self.name,
            records = self.records_seen(),
            "LogSink closed"
        );
    }

    fn summary(&self) -> String {
        format!("{} [records: {}]", self.name, self.records_seen())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_records() {
        let sink = LogSink::new("log");
        for i in 0..5 {
            sink.receive(&VehicleRecord::new("vehicle_speed", i as f64))
                .unwrap();
        }
        assert_eq!(sink.records_seen(), 5);
    }

    #[test]
    fn from_params_reads_interval() {
        let mut params = HashMap::new();
        params.insert("interval".to_string(), "10".to_string());
        let sink = LogSink::from_params("log", &params);
        assert_eq!(sink.interval, 10);

        let sink = LogSink::from_params("log", &HashMap::new());
        assert_eq!(sink.interval, 100);
    }

    #[test]
    fn name_is_reported() {
        let sink = LogSink::new("my_logger");
        assert_eq!(sink.name(), "my_logger");
        assert_eq!(sink.summary(), "my_logger [records: 0]");
    }
}
