//! # Integration Tests
//!
//! End-to-end coverage for the hub workspace:
//! - contract snapshot checks
//! - blueprint-driven hub assembly (config -> factory -> hub -> listener)
//! - trace capture and replay
//! - remote binding lifecycle

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        let _ = contracts::ConfigVersion::V1;
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::mpsc;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use adapters::{build_sink, build_source, LoopbackEndpoint};
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{Measurement, MeasurementListener, VehicleRecord};
    use hub::{BindingState, HubStats, VehicleHub};
    use observability::{HubMetricsAggregator, HubSample};
    use parking_lot::Mutex;

    const MOCK_HUB_CONFIG: &str = r#"
[hub]
name = "e2e-hub"

[[sources]]
id = "scripted_feed"
kind = "mock"

[sources.params]
frequency_hz = "200"

[[sinks]]
name = "console"
kind = "log"
"#;

    /// Listener that forwards every notification into a channel the test
    /// body can block on.
    struct ForwardingListener {
        tx: Mutex<mpsc::Sender<Measurement>>,
    }

    impl ForwardingListener {
        fn new() -> (Arc<Self>, mpsc::Receiver<Measurement>) {
            let (tx, rx) = mpsc::channel();
            (Arc::new(Self { tx: Mutex::new(tx) }), rx)
        }
    }

    impl MeasurementListener for ForwardingListener {
        fn on_measurement(&self, measurement: &Measurement) {
            let _ = self.tx.lock().send(measurement.clone());
        }
    }

    fn sample_from(stats: &HubStats) -> HubSample {
        HubSample {
            records_dispatched: stats.records_dispatched,
            delivery_failures: stats.delivery_failures,
            records_reified: stats.records_reified,
            records_rejected: stats.records_rejected,
            commands_sent: stats.commands_sent,
        }
    }

    /// End-to-end: blueprint -> factory -> hub -> listener.
    ///
    /// Verifies the full assembly path:
    /// 1. ConfigLoader parses an inline blueprint
    /// 2. the factory constructs the mock source and log sink
    /// 3. the hub fans records out to the notifier
    /// 4. a registered listener sees typed speed measurements
    #[test]
    fn test_e2e_mock_hub() {
        let blueprint = ConfigLoader::load_from_str(MOCK_HUB_CONFIG, ConfigFormat::Toml).unwrap();
        assert_eq!(blueprint.hub.name, "e2e-hub");

        let hub = VehicleHub::named(blueprint.hub.name.clone(), blueprint.build_registry());

        for sink in &blueprint.sinks {
            assert!(hub.add_sink(build_sink(sink).unwrap()));
        }

        let (listener, notifications) = ForwardingListener::new();
        hub.add_listener("vehicle_speed", listener).unwrap();

        for source in &blueprint.sources {
            assert!(hub.add_source(build_source(source).unwrap()));
        }

        let target = 5u64;
        for _ in 0..target {
            let measurement = notifications
                .recv_timeout(Duration::from_secs(5))
                .expect("mock source should keep producing speed measurements");
            assert_eq!(measurement.id().as_str(), "vehicle_speed");
            let speed = measurement.as_f64().unwrap();
            assert!((0.0..=655.0).contains(&speed));
        }

        hub.stop();

        let stats = hub.stats();
        assert!(stats.records_dispatched >= target);
        assert_eq!(stats.records_rejected, 0);
        assert_eq!(stats.delivery_failures, 0);
        assert_eq!(stats.binding, BindingState::Unbound);

        // The cache keeps answering after shutdown
        assert!(hub.latest("vehicle_speed").unwrap().as_f64().is_some());
    }

    /// Capture a mock run into a trace file, then replay it into a second
    /// hub and verify the replayed stream reifies cleanly.
    #[test]
    fn test_trace_capture_then_replay() {
        let dir = tempfile::tempdir().unwrap();
        let trace_path = dir.path().join("capture.jsonl");

        let capture_config = format!(
            r#"
[hub]
name = "capture-hub"

[[sources]]
id = "scripted_feed"
kind = "mock"

[sources.params]
frequency_hz = "200"

[[sinks]]
name = "recorder"
kind = "trace"

[sinks.params]
path = "{path}"
"#,
            path = trace_path.display()
        );

        let blueprint =
            ConfigLoader::load_from_str(&capture_config, ConfigFormat::Toml).unwrap();
        let hub = VehicleHub::named(blueprint.hub.name.clone(), blueprint.build_registry());
        for sink in &blueprint.sinks {
            hub.add_sink(build_sink(sink).unwrap());
        }

        let (listener, notifications) = ForwardingListener::new();
        hub.add_listener("vehicle_speed", listener).unwrap();

        for source in &blueprint.sources {
            hub.add_source(build_source(source).unwrap());
        }

        // Three speed notifications means three full script cycles have
        // passed through the sinks
        for _ in 0..3 {
            notifications
                .recv_timeout(Duration::from_secs(5))
                .expect("capture hub should produce speed measurements");
        }

        // Stop flushes the trace sink
        hub.stop();

        let replay_config = format!(
            r#"
[hub]
name = "replay-hub"

[[sources]]
id = "trace_replay"
kind = "trace"

[sources.params]
path = "{path}"
speed = "25"
"#,
            path = trace_path.display()
        );

        let blueprint =
            ConfigLoader::load_from_str(&replay_config, ConfigFormat::Toml).unwrap();
        let replay = VehicleHub::named(blueprint.hub.name.clone(), blueprint.build_registry());

        let (listener, notifications) = ForwardingListener::new();
        replay.add_listener("vehicle_speed", listener).unwrap();

        for source in &blueprint.sources {
            assert!(replay.add_source(build_source(source).unwrap()));
        }

        let replayed = notifications
            .recv_timeout(Duration::from_secs(5))
            .expect("replay hub should re-deliver recorded speed measurements");
        assert_eq!(replayed.id().as_str(), "vehicle_speed");
        assert!(replayed.timestamp().is_some(), "recorded stamps survive replay");

        // Give the rest of the file a moment to drain, then check that the
        // whole recording reified against the standard catalog
        thread::sleep(Duration::from_millis(300));
        replay.stop();

        let stats = replay.stats();
        assert!(stats.records_dispatched >= 10);
        assert_eq!(stats.records_rejected, 0);
        assert!(replay.latest("engine_speed").unwrap().as_f64().is_some());
    }

    /// Remote binding lifecycle against a loopback endpoint: a blocked
    /// waiter wakes on bind, stream/query/command/admin surfaces work while
    /// bound, and a disconnect leaves the cache stale but readable.
    #[test]
    fn test_remote_binding_lifecycle() {
        let hub = VehicleHub::new();
        let (listener, notifications) = ForwardingListener::new();
        hub.add_listener("vehicle_speed", listener).unwrap();

        // Waiter blocks until the endpoint binds
        let (bound_tx, bound_rx) = mpsc::channel();
        let waiter_hub = Arc::clone(&hub);
        let waiter = thread::spawn(move || {
            waiter_hub.wait_until_bound();
            bound_tx.send(()).unwrap();
        });
        assert!(bound_rx.recv_timeout(Duration::from_millis(50)).is_err());

        let endpoint = Arc::new(LoopbackEndpoint::new());
        hub.on_remote_connected(endpoint.clone());
        bound_rx
            .recv_timeout(Duration::from_secs(2))
            .expect("bind should wake the waiter");
        waiter.join().unwrap();
        assert_eq!(hub.binding_state(), BindingState::Bound);

        // Stream path
        endpoint.inject(VehicleRecord::new("vehicle_speed", 72.0).stamped());
        let seen = notifications.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(seen.as_f64(), Some(72.0));

        // Query and command paths
        assert_eq!(hub.get("vehicle_speed").unwrap().as_f64(), Some(72.0));
        hub.set(&VehicleRecord::new("high_beam_status", true)).unwrap();
        assert_eq!(endpoint.commands().len(), 1);

        // Rebroadcast: a locally produced record goes out through the
        // endpoint and loops back into the hub's own stream
        hub.receive(&VehicleRecord::new("vehicle_speed", 73.5).stamped())
            .unwrap();
        let looped = notifications.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(looped.as_f64(), Some(73.5));

        // Admin surface
        hub.initialize_default_sources().unwrap();
        assert!(hub.message_count().unwrap() > 0);
        assert!(hub
            .source_summaries()
            .iter()
            .any(|s| s.contains("loopback-feed")));

        hub.on_remote_disconnected();
        assert_eq!(hub.binding_state(), BindingState::Disconnected);

        // Stale but available after the disconnect
        assert_eq!(hub.latest("vehicle_speed").unwrap().as_f64(), Some(73.5));
        assert!(hub.get("vehicle_speed").is_err());

        hub.stop();
    }

    /// Periodic counter samples roll up into the run summary report.
    #[test]
    fn test_hub_counters_roll_up_into_metrics_summary() {
        let hub = VehicleHub::new();
        let endpoint = Arc::new(LoopbackEndpoint::new());
        hub.on_remote_connected(endpoint.clone());

        let mut aggregator = HubMetricsAggregator::new();

        for i in 0..10 {
            endpoint.inject(VehicleRecord::new("vehicle_speed", 40.0 + i as f64).stamped());
        }
        aggregator.observe(sample_from(&hub.stats()), Duration::from_secs(2));

        for i in 0..30 {
            endpoint.inject(VehicleRecord::new("engine_speed", 1000.0 + i as f64).stamped());
        }
        hub.set(&VehicleRecord::new("high_beam_status", true)).unwrap();
        aggregator.observe(sample_from(&hub.stats()), Duration::from_secs(2));

        assert_eq!(aggregator.intervals(), 2);
        let summary = aggregator.summary();
        assert_eq!(summary.records_dispatched, 40);
        assert_eq!(summary.commands_sent, 1);
        assert_eq!(summary.records_rejected, 0);
        assert!(summary.throughput.mean > 0.0);

        hub.stop();
    }
}
