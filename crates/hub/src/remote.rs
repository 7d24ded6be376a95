//! Remote endpoint proxies
//!
//! Bridge the abstract `RemoteEndpoint` into the pipeline's source contract
//! and the registry's controller contract. One of each is created per
//! binding and torn down on disconnect.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use contracts::{
    CommandController, HubError, RecordCallback, RecordSource, RemoteEndpoint, VehicleRecord,
};

/// Canonical inbound source: subscribes to the endpoint's push channel and
/// forwards records into the pipeline.
///
/// Delivery is gated on the running flag, so `stop` cuts the flow even when
/// the endpoint is already unreachable and `unsubscribe` cannot be
/// delivered.
pub struct RemoteSource {
    endpoint: Arc<dyn RemoteEndpoint>,
    callback: Mutex<Option<RecordCallback>>,
    running: Arc<AtomicBool>,
}

impl RemoteSource {
    pub fn new(endpoint: Arc<dyn RemoteEndpoint>) -> Self {
        Self {
            endpoint,
            callback: Mutex::new(None),
            running: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl RecordSource for RemoteSource {
    fn name(&self) -> &str {
        "remote-endpoint"
    }

    fn set_callback(&self, callback: RecordCallback) {
        *self.callback.lock() = Some(callback);
    }

    fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        let callback = self.callback.lock().clone();
        let Some(callback) = callback else {
            warn!(source = %self.name(), "No delivery callback set, not starting");
            self.running.store(false, Ordering::SeqCst);
            return;
        };

        let running = Arc::clone(&self.running);
        let gated: RecordCallback = Arc::new(move |record: VehicleRecord| {
            if running.load(Ordering::Relaxed) {
                callback(record);
            }
        });

        if let Err(e) = self.endpoint.subscribe(gated) {
            warn!(source = %self.name(), error = %e, "Subscribe failed");
            self.running.store(false, Ordering::SeqCst);
        }
    }

    fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }

        if let Err(e) = self.endpoint.unsubscribe() {
            // The gate already cuts delivery; losing the unsubscribe only
            // means the endpoint holds a dead callback.
            debug!(source = %self.name(), error = %e, "Unsubscribe failed");
        }
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}

/// Outbound command proxy toward the bound endpoint.
pub struct RemoteController {
    endpoint: Arc<dyn RemoteEndpoint>,
}

impl RemoteController {
    pub fn new(endpoint: Arc<dyn RemoteEndpoint>) -> Self {
        Self { endpoint }
    }
}

impl CommandController for RemoteController {
    fn name(&self) -> &str {
        "remote-endpoint"
    }

    fn set(&self, command: &VehicleRecord) -> Result<(), HubError> {
        self.endpoint.set(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adapters::LoopbackEndpoint;
    use parking_lot::Mutex;

    #[test]
    fn start_subscribes_and_forwards() {
        let endpoint = Arc::new(LoopbackEndpoint::new());
        let source = RemoteSource::new(endpoint.clone());

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        source.set_callback(Arc::new(move |record| {
            seen_clone.lock().push(record);
        }));
        source.start();
        assert!(source.is_running());

        endpoint.inject(VehicleRecord::new("vehicle_speed", 11.0));
        assert_eq!(seen.lock().len(), 1);
    }

    #[test]
    fn stop_cuts_delivery_even_when_unsubscribe_fails() {
        let endpoint = Arc::new(LoopbackEndpoint::new());
        let source = RemoteSource::new(endpoint.clone());

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        source.set_callback(Arc::new(move |record| {
            seen_clone.lock().push(record);
        }));
        source.start();

        // Endpoint goes dark before we can unsubscribe
        endpoint.set_offline(true);
        source.stop();
        assert!(!source.is_running());

        // The endpoint still holds the callback, but the gate drops records
        endpoint.inject(VehicleRecord::new("vehicle_speed", 1.0));
        assert!(seen.lock().is_empty());
    }

    #[test]
    fn start_fails_quietly_when_endpoint_offline() {
        let endpoint = Arc::new(LoopbackEndpoint::new());
        endpoint.set_offline(true);

        let source = RemoteSource::new(endpoint.clone());
        source.set_callback(Arc::new(|_| {}));
        source.start();

        assert!(!source.is_running());
    }

    #[test]
    fn controller_forwards_commands() {
        let endpoint = Arc::new(LoopbackEndpoint::new());
        let controller = RemoteController::new(endpoint.clone());

        controller
            .set(&VehicleRecord::new("high_beam_status", true))
            .unwrap();
        assert_eq!(endpoint.commands().len(), 1);

        endpoint.set_offline(true);
        let err = controller
            .set(&VehicleRecord::new("high_beam_status", false))
            .unwrap_err();
        assert!(matches!(err, HubError::RemoteUnavailable { .. }));
    }
}
