//! RecordSink trait - Pipeline output interface
//!
//! Defines the abstract interface for sinks.

use crate::{HubError, VehicleRecord};

/// Record consumer trait
///
/// The pipeline calls `receive` once per dispatched record for every sink
/// registered at dispatch time. Implementations must not block beyond a
/// single underlying I/O call and must tolerate `receive` and `stop` being
/// called from different threads.
pub trait RecordSink: Send + Sync {
    /// Sink name (used for logging/metrics/summaries)
    fn name(&self) -> &str;

    /// Consume one record
    ///
    /// # Errors
    /// Returns a write error with context; the pipeline logs it and keeps
    /// delivering to the remaining sinks.
    fn receive(&self, record: &VehicleRecord) -> Result<(), HubError>;

    /// Release resources; further `receive` calls may be ignored
    fn stop(&self) {}

    /// Human-readable one-line status for display surfaces
    fn summary(&self) -> String {
        self.name().to_string()
    }
}

impl std::fmt::Debug for dyn RecordSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RecordSink({})", self.name())
    }
}
