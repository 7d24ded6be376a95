//! RecordSource trait - Record producer abstraction
//!
//! Defines a unified interface for record producers, decoupling the pipeline
//! from concrete transports. Trace playback, deterministic mocks and the
//! remote-connection proxy all implement the same contract.

use std::sync::Arc;

use crate::VehicleRecord;

/// Record delivery callback type
///
/// When a source produces a record, it sends it through this callback.
/// Uses `Arc` to allow callback sharing across multiple contexts.
pub type RecordCallback = Arc<dyn Fn(VehicleRecord) + Send + Sync>;

/// Record producer trait
///
/// A source must be given its delivery target with `set_callback` before
/// `start`; records produced while no callback is set are dropped. Both
/// `start` and `stop` are idempotent, and `stop` prevents any further
/// delivery.
///
/// # Example
///
/// ```ignore
/// let source: Arc<dyn RecordSource> = build_source();
/// source.set_callback(Arc::new(|record| {
///     println!("received {}", record.name);
/// }));
/// source.start();
/// // ... run ...
/// source.stop();
/// ```
pub trait RecordSource: Send + Sync {
    /// Source name (used for logging/summaries)
    fn name(&self) -> &str;

    /// Register the single delivery target
    ///
    /// Replaces any previously registered callback. Must be called before
    /// `start` for records to be delivered anywhere.
    fn set_callback(&self, callback: RecordCallback);

    /// Begin producing records
    ///
    /// Idempotent: calling `start` on a running source is a no-op.
    fn start(&self);

    /// Stop producing records
    ///
    /// Idempotent, and safe to call concurrently with an in-flight delivery.
    fn stop(&self);

    /// Whether the source is currently producing
    fn is_running(&self) -> bool;

    /// Human-readable one-line status for display surfaces
    fn summary(&self) -> String {
        format!("{} [running: {}]", self.name(), self.is_running())
    }
}

impl std::fmt::Debug for dyn RecordSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RecordSource({})", self.name())
    }
}
