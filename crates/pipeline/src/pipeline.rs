//! DataPipeline - snapshot fan-out to sinks

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use contracts::{RecordCallback, RecordSink, RecordSource, SnapshotVec, VehicleRecord};

/// Fan-out hub for raw records.
///
/// Holds the live sink set and the single canonical inbound source. Sink
/// mutation uses copy-on-write, so `dispatch` iterates a point-in-time
/// snapshot without holding a lock: removing a sink mid-fan-out affects only
/// future dispatches, and sink callbacks are never invoked under a lock.
pub struct DataPipeline {
    sinks: SnapshotVec<Arc<dyn RecordSink>>,
    source: RwLock<Option<Arc<dyn RecordSource>>>,
    records_dispatched: AtomicU64,
    delivery_failures: AtomicU64,
    stopped: AtomicBool,
    weak_self: Weak<DataPipeline>,
}

/// Point-in-time pipeline counters (for reporting)
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineStats {
    pub records_dispatched: u64,
    pub delivery_failures: u64,
    pub active_sinks: usize,
}

impl DataPipeline {
    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|weak| Self {
            sinks: SnapshotVec::new(),
            source: RwLock::new(None),
            records_dispatched: AtomicU64::new(0),
            delivery_failures: AtomicU64::new(0),
            stopped: AtomicBool::new(false),
            weak_self: weak.clone(),
        })
    }

    /// Append a sink to the live set.
    ///
    /// Records dispatched before the add are not replayed. Adding the same
    /// `Arc` twice is a no-op; returns whether the sink was added.
    pub fn add_sink(&self, sink: Arc<dyn RecordSink>) -> bool {
        let name = sink.name().to_string();
        let added = self.sinks.push_unique(sink, |a, b| Arc::ptr_eq(a, b));
        if added {
            debug!(sink = %name, sinks = self.sinks.len(), "Sink added");
        } else {
            debug!(sink = %name, "Sink already registered, ignoring");
        }
        added
    }

    /// Remove a sink (by `Arc` identity) and stop it. No-op if absent.
    pub fn remove_sink(&self, sink: &Arc<dyn RecordSink>) {
        if let Some(removed) = self.sinks.remove_first(|s| Arc::ptr_eq(s, sink)) {
            removed.stop();
            debug!(sink = %removed.name(), sinks = self.sinks.len(), "Sink removed");
        }
    }

    /// Deliver one record to every currently-registered sink, in
    /// registration order.
    ///
    /// A failing sink is logged and skipped; delivery to the remaining sinks
    /// continues.
    pub fn dispatch(&self, record: &VehicleRecord) {
        let count = self.records_dispatched.fetch_add(1, Ordering::Relaxed) + 1;
        metrics::counter!("hub_records_dispatched_total").increment(1);

        let sinks = self.sinks.snapshot();
        for sink in sinks.iter() {
            if let Err(e) = sink.receive(record) {
                self.delivery_failures.fetch_add(1, Ordering::Relaxed);
                metrics::counter!("hub_sink_failures_total", "sink" => sink.name().to_string())
                    .increment(1);
                warn!(
                    sink = %sink.name(),
                    record = %record.name,
                    error = %e,
                    "Sink failed to receive record"
                );
            }
        }

        if count % 1000 == 0 {
            debug!(records = count, "Pipeline progress");
        }
    }

    /// Delivery callback wired into sources.
    ///
    /// Holds only a weak reference: a source that outlives the pipeline
    /// delivers into nothing instead of keeping the pipeline alive.
    pub fn dispatch_callback(&self) -> RecordCallback {
        let weak = self.weak_self.clone();
        Arc::new(move |record: VehicleRecord| {
            if let Some(pipeline) = weak.upgrade() {
                pipeline.dispatch(&record);
            }
        })
    }

    /// Install the canonical inbound source: wire its delivery target to
    /// `dispatch`, then start it. A previously attached source is stopped
    /// and replaced.
    pub fn attach_source(&self, source: Arc<dyn RecordSource>) {
        source.set_callback(self.dispatch_callback());
        let previous = self.source.write().replace(Arc::clone(&source));
        if let Some(previous) = previous {
            previous.stop();
            debug!(source = %previous.name(), "Previous canonical source stopped");
        }
        source.start();
        info!(source = %source.name(), "Canonical source attached");
    }

    /// Stop and remove the canonical source, returning it if one was set.
    pub fn detach_source(&self) -> Option<Arc<dyn RecordSource>> {
        let source = self.source.write().take();
        if let Some(source) = &source {
            source.stop();
            info!(source = %source.name(), "Canonical source detached");
        }
        source
    }

    /// Summary line of the canonical source, if attached.
    pub fn source_summary(&self) -> Option<String> {
        self.source.read().as_ref().map(|s| s.summary())
    }

    /// Summary lines of all registered sinks, in registration order.
    pub fn sink_summaries(&self) -> Vec<String> {
        self.sinks.snapshot().iter().map(|s| s.summary()).collect()
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    pub fn records_dispatched(&self) -> u64 {
        self.records_dispatched.load(Ordering::Relaxed)
    }

    pub fn stats(&self) -> PipelineStats {
        PipelineStats {
            records_dispatched: self.records_dispatched.load(Ordering::Relaxed),
            delivery_failures: self.delivery_failures.load(Ordering::Relaxed),
            active_sinks: self.sinks.len(),
        }
    }

    /// Stop the canonical source and every sink, then clear them.
    ///
    /// Idempotent and safe to call concurrently with an in-flight dispatch;
    /// the dispatch finishes against its own snapshot.
    pub fn stop(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(source) = self.source.write().take() {
            source.stop();
        }
        let sinks = self.sinks.take_all();
        for sink in &sinks {
            sink.stop();
        }
        info!(
            sinks = sinks.len(),
            records = self.records_dispatched(),
            "Pipeline stopped"
        );
    }
}
