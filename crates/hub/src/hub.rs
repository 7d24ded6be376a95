//! VehicleHub - source/controller registry, remote binding and the typed
//! query/command surface.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use contracts::{
    CommandController, HubError, Measurement, MeasurementListener, MeasurementRegistry,
    RecordSink, RecordSource, RemoteEndpoint, SnapshotVec, VehicleRecord,
};
use pipeline::{DataPipeline, ListenerSink};

use crate::binding::{BindingLatch, BindingState};
use crate::remote::{RemoteController, RemoteSource};

/// Application-facing hub.
///
/// Wraps a `DataPipeline` whose first sink is always the listener notifier.
/// User sources attached here deliver straight into the pipeline's dispatch
/// entry point; the pipeline's canonical source slot is reserved for the
/// remote binding, so the two collections never mix.
pub struct VehicleHub {
    name: String,
    registry: Arc<MeasurementRegistry>,
    pipeline: Arc<DataPipeline>,
    notifier: Arc<ListenerSink>,
    sources: SnapshotVec<Arc<dyn RecordSource>>,
    controllers: SnapshotVec<Arc<dyn CommandController>>,
    binding: BindingLatch,
    endpoint: RwLock<Option<Arc<dyn RemoteEndpoint>>>,
    remote_controller: RwLock<Option<Arc<dyn CommandController>>>,
    commands_sent: AtomicU64,
    stopped: AtomicBool,
}

/// Point-in-time hub counters (for run summaries)
#[derive(Debug, Clone, Copy)]
pub struct HubStats {
    pub records_dispatched: u64,
    pub delivery_failures: u64,
    pub records_reified: u64,
    pub records_rejected: u64,
    pub commands_sent: u64,
    pub active_sinks: usize,
    pub user_sources: usize,
    pub binding: BindingState,
}

impl VehicleHub {
    /// Hub over the standard signal catalog.
    pub fn new() -> Arc<Self> {
        Self::named("vehicle-hub", MeasurementRegistry::standard())
    }

    /// Hub with an explicit name and signal registry.
    pub fn named(name: impl Into<String>, registry: MeasurementRegistry) -> Arc<Self> {
        let name = name.into();
        let registry = Arc::new(registry);
        let pipeline = DataPipeline::new();
        let notifier = ListenerSink::new(Arc::clone(&registry));
        pipeline.add_sink(notifier.clone());

        info!(hub = %name, signals = registry.len(), "Hub created");

        Arc::new(Self {
            name,
            registry,
            pipeline,
            notifier,
            sources: SnapshotVec::new(),
            controllers: SnapshotVec::new(),
            binding: BindingLatch::new(),
            endpoint: RwLock::new(None),
            remote_controller: RwLock::new(None),
            commands_sent: AtomicU64::new(0),
            stopped: AtomicBool::new(false),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registry(&self) -> &Arc<MeasurementRegistry> {
        &self.registry
    }

    // ===== Typed query / command surface =====

    /// Current value for a measurement type, queried synchronously from the
    /// bound remote endpoint.
    ///
    /// Never blocks waiting for a binding; that is `wait_until_bound`'s job.
    ///
    /// # Errors
    /// - `UnrecognizedMeasurement` if the identifier is not in the registry
    ///   (checked before any remote call)
    /// - `NoValue` if no endpoint is bound, the transport fails, or the
    ///   endpoint has no data for this type
    /// - `MalformedRecord` if the endpoint answers with a payload that does
    ///   not match the descriptor
    pub fn get(&self, id: &str) -> Result<Measurement, HubError> {
        if !self.registry.contains(id) {
            return Err(HubError::unrecognized(id));
        }

        let endpoint = self.endpoint.read().clone();
        let Some(endpoint) = endpoint else {
            debug!(measurement = id, "Get with no bound endpoint");
            return Err(HubError::no_value(id));
        };

        let record = match endpoint.get(id) {
            Ok(record) => record,
            Err(e) => {
                debug!(measurement = id, error = %e, "Remote get failed");
                return Err(HubError::no_value(id));
            }
        };

        self.registry.reify(&record)
    }

    /// Newest measurement seen on the record stream, from the local cache.
    ///
    /// # Errors
    /// `UnrecognizedMeasurement` for unknown identifiers, `NoValue` before
    /// any valid record of this type has arrived.
    pub fn latest(&self, id: &str) -> Result<Measurement, HubError> {
        self.notifier.latest(id)
    }

    /// Transmit an outbound command to the first registered controller.
    ///
    /// With no controller registered the command is dropped; that is a
    /// documented no-op, not an error. The chosen controller's own failure
    /// propagates; there is no fallback to later controllers.
    pub fn set(&self, command: &VehicleRecord) -> Result<(), HubError> {
        let Some(controller) = self.controllers.first() else {
            debug!(command = %command.name, "No controller registered, command dropped");
            return Ok(());
        };

        controller.set(command)?;
        self.commands_sent.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("hub_commands_sent_total").increment(1);
        debug!(command = %command.name, controller = %controller.name(), "Command sent");
        Ok(())
    }

    /// Forward a locally-produced record to the bound endpoint for
    /// rebroadcast.
    ///
    /// # Errors
    /// `RemoteUnavailable` when no endpoint is bound or the push fails.
    pub fn receive(&self, record: &VehicleRecord) -> Result<(), HubError> {
        let endpoint = self.bound_endpoint()?;
        endpoint.receive(record)
    }

    // ===== Listener surface =====

    /// Register a listener for one measurement type.
    pub fn add_listener(
        &self,
        id: &str,
        listener: Arc<dyn MeasurementListener>,
    ) -> Result<(), HubError> {
        self.notifier.register_listener(id, listener)
    }

    /// Remove a previously registered listener (by `Arc` identity).
    pub fn remove_listener(
        &self,
        id: &str,
        listener: &Arc<dyn MeasurementListener>,
    ) -> Result<(), HubError> {
        self.notifier.unregister_listener(id, listener)
    }

    // ===== Source / controller / sink registry =====

    /// Attach a user source: wire its delivery target into the pipeline,
    /// store it, then start it.
    ///
    /// De-duplicated on `Arc` identity; attaching the same source twice
    /// cannot double-deliver. Returns whether the source was attached.
    pub fn add_source(&self, source: Arc<dyn RecordSource>) -> bool {
        source.set_callback(self.pipeline.dispatch_callback());
        let added = self
            .sources
            .push_unique(Arc::clone(&source), |a, b| Arc::ptr_eq(a, b));
        if added {
            source.start();
            info!(hub = %self.name, source = %source.name(), "Source attached");
        } else {
            debug!(source = %source.name(), "Source already attached, ignoring");
        }
        added
    }

    /// Stop and detach a user source. No-op if absent.
    pub fn remove_source(&self, source: &Arc<dyn RecordSource>) {
        if let Some(removed) = self.sources.remove_first(|s| Arc::ptr_eq(s, source)) {
            removed.stop();
            info!(hub = %self.name, source = %removed.name(), "Source detached");
        }
    }

    /// Register an outbound command destination. Commands go to the first
    /// registered controller only.
    pub fn add_controller(&self, controller: Arc<dyn CommandController>) -> bool {
        let added = self
            .controllers
            .push_unique(Arc::clone(&controller), |a, b| Arc::ptr_eq(a, b));
        if added {
            debug!(hub = %self.name, controller = %controller.name(), "Controller registered");
        }
        added
    }

    /// Remove a controller (by `Arc` identity). No-op if absent.
    pub fn remove_controller(&self, controller: &Arc<dyn CommandController>) {
        self.controllers
            .remove_first(|c| Arc::ptr_eq(c, controller));
    }

    /// Add an output sink to the fan-out set.
    pub fn add_sink(&self, sink: Arc<dyn RecordSink>) -> bool {
        self.pipeline.add_sink(sink)
    }

    /// Remove and stop an output sink. No-op if absent.
    pub fn remove_sink(&self, sink: &Arc<dyn RecordSink>) {
        self.pipeline.remove_sink(sink)
    }

    // ===== Remote binding lifecycle =====

    /// Whether a remote endpoint is currently bound.
    pub fn is_bound(&self) -> bool {
        self.binding.is_bound()
    }

    pub fn binding_state(&self) -> BindingState {
        self.binding.state()
    }

    /// Block the calling thread until a remote endpoint is bound.
    ///
    /// Must not be called from the thread driving
    /// `on_remote_connected`/`on_remote_disconnected`.
    pub fn wait_until_bound(&self) {
        self.binding.wait_until_bound();
    }

    /// Bind a remote endpoint: installs the canonical source proxy on the
    /// pipeline, registers the controller proxy and wakes every
    /// `wait_until_bound` caller.
    ///
    /// Called by external transport glue on connection establishment. A
    /// second call while bound replaces the previous endpoint.
    pub fn on_remote_connected(&self, endpoint: Arc<dyn RemoteEndpoint>) {
        if self.binding.is_bound() {
            warn!(hub = %self.name, "Already bound, replacing endpoint");
            self.on_remote_disconnected();
        }

        *self.endpoint.write() = Some(Arc::clone(&endpoint));

        let source = Arc::new(RemoteSource::new(Arc::clone(&endpoint)));
        self.pipeline.attach_source(source);

        let controller: Arc<dyn CommandController> =
            Arc::new(RemoteController::new(endpoint));
        self.controllers
            .push_unique(Arc::clone(&controller), |a, b| Arc::ptr_eq(a, b));
        *self.remote_controller.write() = Some(controller);

        self.binding.set_bound();
        metrics::gauge!("hub_bound").set(1.0);
        info!(hub = %self.name, "Remote endpoint bound");
    }

    /// Tear down the remote binding: detaches the canonical source, removes
    /// the controller proxy and marks the state `Disconnected`.
    ///
    /// Cached latest values survive a disconnect (stale but available).
    pub fn on_remote_disconnected(&self) {
        let endpoint = self.endpoint.write().take();
        if endpoint.is_none() {
            debug!(hub = %self.name, "Disconnect with no bound endpoint, ignoring");
            return;
        }

        self.pipeline.detach_source();

        if let Some(controller) = self.remote_controller.write().take() {
            self.controllers
                .remove_first(|c| Arc::ptr_eq(c, &controller));
        }

        self.binding.set_disconnected();
        metrics::gauge!("hub_bound").set(0.0);
        info!(hub = %self.name, "Remote endpoint unbound");
    }

    // ===== Remote admin surface =====

    /// Ask the bound endpoint to (re)attach its default upstream sources.
    pub fn initialize_default_sources(&self) -> Result<(), HubError> {
        self.bound_endpoint()?.initialize_default_sources()
    }

    /// Ask the bound endpoint to detach all of its upstream sources.
    pub fn clear_remote_sources(&self) -> Result<(), HubError> {
        self.bound_endpoint()?.clear_sources()
    }

    /// Total records the bound endpoint has processed.
    pub fn message_count(&self) -> Result<u64, HubError> {
        self.bound_endpoint()?.message_count()
    }

    /// Summaries of every attached source: user sources, the canonical
    /// pipeline source, then the remote endpoint's own (when reachable).
    pub fn source_summaries(&self) -> Vec<String> {
        let mut summaries: Vec<String> = self
            .sources
            .snapshot()
            .iter()
            .map(|s| s.summary())
            .collect();
        if let Some(canonical) = self.pipeline.source_summary() {
            summaries.push(canonical);
        }
        summaries.extend(self.remote_summaries(|e| e.source_summaries()));
        summaries
    }

    /// Summaries of every sink: local pipeline sinks, then the remote
    /// endpoint's own (when reachable).
    pub fn sink_summaries(&self) -> Vec<String> {
        let mut summaries = self.pipeline.sink_summaries();
        summaries.extend(self.remote_summaries(|e| e.sink_summaries()));
        summaries
    }

    fn remote_summaries<F>(&self, fetch: F) -> Vec<String>
    where
        F: FnOnce(&dyn RemoteEndpoint) -> Result<Vec<String>, HubError>,
    {
        let endpoint = self.endpoint.read().clone();
        match endpoint {
            Some(endpoint) => match fetch(endpoint.as_ref()) {
                Ok(summaries) => summaries,
                Err(e) => {
                    debug!(error = %e, "Remote summaries unavailable, local only");
                    Vec::new()
                }
            },
            None => Vec::new(),
        }
    }

    fn bound_endpoint(&self) -> Result<Arc<dyn RemoteEndpoint>, HubError> {
        self.endpoint
            .read()
            .clone()
            .ok_or_else(|| HubError::remote_unavailable("no remote endpoint bound"))
    }

    // ===== Lifecycle =====

    pub fn stats(&self) -> HubStats {
        let pipeline = self.pipeline.stats();
        HubStats {
            records_dispatched: pipeline.records_dispatched,
            delivery_failures: pipeline.delivery_failures,
            records_reified: self.notifier.records_reified(),
            records_rejected: self.notifier.records_rejected(),
            commands_sent: self.commands_sent.load(Ordering::Relaxed),
            active_sinks: pipeline.active_sinks,
            user_sources: self.sources.len(),
            binding: self.binding.state(),
        }
    }

    /// Stop every user source, the pipeline (canonical source and all
    /// sinks) and drop all controllers. Idempotent.
    pub fn stop(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }

        for source in self.sources.take_all() {
            source.stop();
        }
        self.controllers.take_all();
        self.pipeline.stop();

        info!(hub = %self.name, "Hub stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adapters::LoopbackEndpoint;
    use parking_lot::Mutex;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    struct CapturingListener {
        seen: Mutex<Vec<Measurement>>,
    }

    impl CapturingListener {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    impl MeasurementListener for CapturingListener {
        fn on_measurement(&self, measurement: &Measurement) {
            self.seen.lock().push(measurement.clone());
        }
    }

    struct JournalController {
        name: String,
        commands: Mutex<Vec<VehicleRecord>>,
        fail: bool,
    }

    impl JournalController {
        fn new(name: &str) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                commands: Mutex::new(Vec::new()),
                fail: false,
            })
        }

        fn failing(name: &str) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                commands: Mutex::new(Vec::new()),
                fail: true,
            })
        }
    }

    impl CommandController for JournalController {
        fn name(&self) -> &str {
            &self.name
        }

        fn set(&self, command: &VehicleRecord) -> Result<(), HubError> {
            self.commands.lock().push(command.clone());
            if self.fail {
                return Err(HubError::remote_unavailable("injected failure"));
            }
            Ok(())
        }
    }

    /// Source driven manually from the test body.
    struct ScriptedSource {
        callback: RwLock<Option<contracts::RecordCallback>>,
        running: AtomicBool,
    }

    impl ScriptedSource {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                callback: RwLock::new(None),
                running: AtomicBool::new(false),
            })
        }

        fn emit(&self, record: VehicleRecord) {
            let callback = self.callback.read().clone();
            if let Some(callback) = callback {
                callback(record);
            }
        }
    }

    impl RecordSource for ScriptedSource {
        fn name(&self) -> &str {
            "scripted"
        }

        fn set_callback(&self, callback: contracts::RecordCallback) {
            *self.callback.write() = Some(callback);
        }

        fn start(&self) {
            self.running.store(true, Ordering::SeqCst);
        }

        fn stop(&self) {
            self.running.store(false, Ordering::SeqCst);
        }

        fn is_running(&self) -> bool {
            self.running.load(Ordering::SeqCst)
        }
    }

    #[test]
    fn user_source_feeds_listeners_and_cache() {
        let hub = VehicleHub::new();
        let listener = CapturingListener::new();
        hub.add_listener("vehicle_speed", listener.clone()).unwrap();

        let source = ScriptedSource::new();
        assert!(hub.add_source(source.clone()));
        assert!(source.is_running());

        source.emit(VehicleRecord::new("vehicle_speed", 42.0));

        let seen = listener.seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].as_f64(), Some(42.0));
        drop(seen);

        assert_eq!(hub.latest("vehicle_speed").unwrap().as_f64(), Some(42.0));
    }

    #[test]
    fn duplicate_source_is_rejected() {
        let hub = VehicleHub::new();
        let source = ScriptedSource::new();
        assert!(hub.add_source(source.clone()));
        assert!(!hub.add_source(source.clone()));
        assert_eq!(hub.stats().user_sources, 1);
    }

    #[test]
    fn removed_source_is_stopped_and_silent() {
        let hub = VehicleHub::new();
        let source = ScriptedSource::new();
        let as_dyn: Arc<dyn RecordSource> = source.clone();
        hub.add_source(as_dyn.clone());

        hub.remove_source(&as_dyn);
        assert!(!source.is_running());
        assert_eq!(hub.stats().user_sources, 0);
    }

    #[test]
    fn set_with_no_controller_is_silent_noop() {
        let hub = VehicleHub::new();
        let result = hub.set(&VehicleRecord::new("high_beam_status", true));
        assert!(result.is_ok());
        assert_eq!(hub.stats().commands_sent, 0);
    }

    #[test]
    fn set_targets_first_controller_only() {
        let hub = VehicleHub::new();
        let first = JournalController::new("first");
        let second = JournalController::new("second");
        hub.add_controller(first.clone());
        hub.add_controller(second.clone());

        hub.set(&VehicleRecord::new("high_beam_status", true))
            .unwrap();

        assert_eq!(first.commands.lock().len(), 1);
        assert!(second.commands.lock().is_empty());
        assert_eq!(hub.stats().commands_sent, 1);
    }

    #[test]
    fn set_propagates_controller_error_without_fallback() {
        let hub = VehicleHub::new();
        let first = JournalController::failing("first");
        let second = JournalController::new("second");
        hub.add_controller(first.clone());
        hub.add_controller(second.clone());

        let err = hub
            .set(&VehicleRecord::new("high_beam_status", true))
            .unwrap_err();
        assert!(matches!(err, HubError::RemoteUnavailable { .. }));
        assert!(second.commands.lock().is_empty());
        assert_eq!(hub.stats().commands_sent, 0);
    }

    #[test]
    fn removing_first_controller_promotes_next() {
        let hub = VehicleHub::new();
        let first = JournalController::new("first");
        let second = JournalController::new("second");
        let first_dyn: Arc<dyn CommandController> = first.clone();
        hub.add_controller(first_dyn.clone());
        hub.add_controller(second.clone());

        hub.remove_controller(&first_dyn);
        hub.set(&VehicleRecord::new("high_beam_status", true))
            .unwrap();

        assert!(first.commands.lock().is_empty());
        assert_eq!(second.commands.lock().len(), 1);
    }

    #[test]
    fn get_before_binding_is_no_value() {
        let hub = VehicleHub::new();
        assert!(matches!(
            hub.get("vehicle_speed"),
            Err(HubError::NoValue { .. })
        ));
    }

    #[test]
    fn get_unknown_type_is_rejected_before_remote_call() {
        let hub = VehicleHub::new();
        assert!(matches!(
            hub.get("warp_drive"),
            Err(HubError::UnrecognizedMeasurement { .. })
        ));
    }

    #[test]
    fn binding_proxies_stream_query_and_commands() {
        let hub = VehicleHub::new();
        let endpoint = Arc::new(LoopbackEndpoint::new());
        let listener = CapturingListener::new();
        hub.add_listener("vehicle_speed", listener.clone()).unwrap();

        hub.on_remote_connected(endpoint.clone());
        assert!(hub.is_bound());

        // Stream path: injected records reach listeners through the
        // canonical source
        endpoint.inject(VehicleRecord::new("vehicle_speed", 55.0));
        assert_eq!(listener.seen.lock().len(), 1);

        // Query path
        let measurement = hub.get("vehicle_speed").unwrap();
        assert_eq!(measurement.as_f64(), Some(55.0));

        // Command path: the remote controller proxy is registered
        hub.set(&VehicleRecord::new("high_beam_status", true))
            .unwrap();
        assert_eq!(endpoint.commands().len(), 1);
    }

    #[test]
    fn get_transport_failure_degrades_to_no_value() {
        let hub = VehicleHub::new();
        let endpoint = Arc::new(LoopbackEndpoint::new());
        hub.on_remote_connected(endpoint.clone());

        endpoint.set_offline(true);
        assert!(matches!(
            hub.get("vehicle_speed"),
            Err(HubError::NoValue { .. })
        ));
    }

    #[test]
    fn disconnect_stops_stream_but_keeps_cache() {
        let hub = VehicleHub::new();
        let endpoint = Arc::new(LoopbackEndpoint::new());
        hub.on_remote_connected(endpoint.clone());

        endpoint.inject(VehicleRecord::new("fuel_level", 80.0));
        assert_eq!(hub.latest("fuel_level").unwrap().as_f64(), Some(80.0));

        hub.on_remote_disconnected();
        assert_eq!(hub.binding_state(), BindingState::Disconnected);

        // Stream is cut
        endpoint.inject(VehicleRecord::new("fuel_level", 10.0));
        // Stale-but-available: the cache still answers with the last value
        assert_eq!(hub.latest("fuel_level").unwrap().as_f64(), Some(80.0));

        // Commands are dropped again (controller proxy removed)
        hub.set(&VehicleRecord::new("high_beam_status", true))
            .unwrap();
        assert!(endpoint.commands().is_empty());
    }

    #[test]
    fn user_controller_outranks_later_remote_binding() {
        let hub = VehicleHub::new();
        let user = JournalController::new("user");
        hub.add_controller(user.clone());

        let endpoint = Arc::new(LoopbackEndpoint::new());
        hub.on_remote_connected(endpoint.clone());

        hub.set(&VehicleRecord::new("high_beam_status", true))
            .unwrap();
        assert_eq!(user.commands.lock().len(), 1);
        assert!(endpoint.commands().is_empty());
    }

    #[test]
    fn wait_until_bound_unblocks_on_connect() {
        let hub = VehicleHub::new();
        let (tx, rx) = mpsc::channel();

        let waiter_hub = Arc::clone(&hub);
        let waiter = thread::spawn(move || {
            waiter_hub.wait_until_bound();
            tx.send(()).unwrap();
        });

        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());

        hub.on_remote_connected(Arc::new(LoopbackEndpoint::new()));
        rx.recv_timeout(Duration::from_secs(2)).unwrap();
        waiter.join().unwrap();
    }

    #[test]
    fn admin_surface_requires_binding() {
        let hub = VehicleHub::new();
        assert!(matches!(
            hub.message_count(),
            Err(HubError::RemoteUnavailable { .. })
        ));
        assert!(matches!(
            hub.initialize_default_sources(),
            Err(HubError::RemoteUnavailable { .. })
        ));
        assert!(matches!(
            hub.receive(&VehicleRecord::new("vehicle_speed", 1.0)),
            Err(HubError::RemoteUnavailable { .. })
        ));

        let endpoint = Arc::new(LoopbackEndpoint::new());
        hub.on_remote_connected(endpoint.clone());

        hub.initialize_default_sources().unwrap();
        hub.receive(&VehicleRecord::new("vehicle_speed", 1.0))
            .unwrap();
        assert!(hub.message_count().unwrap() > 0);
    }

    #[test]
    fn summaries_merge_local_and_remote() {
        let hub = VehicleHub::new();
        let source = ScriptedSource::new();
        hub.add_source(source);

        let endpoint = Arc::new(LoopbackEndpoint::new());
        hub.on_remote_connected(endpoint.clone());
        hub.initialize_default_sources().unwrap();

        let sources = hub.source_summaries();
        // User source + canonical remote proxy + the endpoint's own feed
        assert_eq!(sources.len(), 3);
        assert!(sources.iter().any(|s| s.contains("scripted")));
        assert!(sources.iter().any(|s| s.contains("remote-endpoint")));
        assert!(sources.iter().any(|s| s.contains("loopback-feed")));

        // Remote unreachable: degrade to local views
        endpoint.set_offline(true);
        let sources = hub.source_summaries();
        assert_eq!(sources.len(), 2);

        let sinks = hub.sink_summaries();
        assert!(sinks.iter().any(|s| s.contains("listener-notifier")));
    }

    #[test]
    fn stop_is_idempotent_and_stops_everything() {
        let hub = VehicleHub::new();
        let source = ScriptedSource::new();
        hub.add_source(source.clone());
        let controller = JournalController::new("ctl");
        hub.add_controller(controller.clone());

        hub.stop();
        hub.stop();

        assert!(!source.is_running());
        assert_eq!(hub.stats().user_sources, 0);
        assert_eq!(hub.stats().active_sinks, 0);

        // Commands are dropped after stop
        hub.set(&VehicleRecord::new("high_beam_status", true))
            .unwrap();
        assert!(controller.commands.lock().is_empty());
    }

    #[test]
    fn rebind_after_disconnect() {
        let hub = VehicleHub::new();
        let first = Arc::new(LoopbackEndpoint::new());
        hub.on_remote_connected(first.clone());
        hub.on_remote_disconnected();

        let second = Arc::new(LoopbackEndpoint::new());
        hub.on_remote_connected(second.clone());
        assert!(hub.is_bound());

        second.inject(VehicleRecord::new("vehicle_speed", 5.0));
        assert_eq!(hub.latest("vehicle_speed").unwrap().as_f64(), Some(5.0));
    }
}
