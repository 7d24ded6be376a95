//! Listener notification sink
//!
//! Reifies raw records against the measurement registry, caches the newest
//! measurement per type and notifies registered listeners. This is the sink
//! behind the hub's typed query and subscription surface.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use contracts::{
    HubError, Measurement, MeasurementId, MeasurementListener, MeasurementRegistry, RecordSink,
    VehicleRecord,
};

pub struct ListenerSink {
    registry: Arc<MeasurementRegistry>,
    listeners: RwLock<HashMap<MeasurementId, Vec<Arc<dyn MeasurementListener>>>>,
    latest: RwLock<HashMap<MeasurementId, Measurement>>,
    records_reified: AtomicU64,
    records_rejected: AtomicU64,
}

impl ListenerSink {
    pub fn new(registry: Arc<MeasurementRegistry>) -> Arc<Self> {
        Arc::new(Self {
            registry,
            listeners: RwLock::new(HashMap::new()),
            latest: RwLock::new(HashMap::new()),
            records_reified: AtomicU64::new(0),
            records_rejected: AtomicU64::new(0),
        })
    }

    /// Register a listener for one measurement type.
    ///
    /// Registering the same `Arc` twice for the same type is a no-op.
    ///
    /// # Errors
    /// `UnrecognizedMeasurement` if the identifier is not in the registry.
    pub fn register_listener(
        &self,
        id: &str,
        listener: Arc<dyn MeasurementListener>,
    ) -> Result<(), HubError> {
        let descriptor = self
            .registry
            .descriptor(id)
            .ok_or_else(|| HubError::unrecognized(id))?;

        let mut listeners = self.listeners.write();
        let entries = listeners.entry(descriptor.id.clone()).or_default();
        if entries.iter().any(|known| Arc::ptr_eq(known, &listener)) {
            debug!(measurement = %descriptor.id, "Listener already registered, ignoring");
            return Ok(());
        }
        entries.push(listener);
        debug!(
            measurement = %descriptor.id,
            listeners = entries.len(),
            "Listener registered"
        );
        Ok(())
    }

    /// Remove a previously registered listener (by `Arc` identity).
    ///
    /// Removing a listener that was never registered is a no-op.
    ///
    /// # Errors
    /// `UnrecognizedMeasurement` if the identifier is not in the registry.
    pub fn unregister_listener(
        &self,
        id: &str,
        listener: &Arc<dyn MeasurementListener>,
    ) -> Result<(), HubError> {
        if !self.registry.contains(id) {
            return Err(HubError::unrecognized(id));
        }

        let mut listeners = self.listeners.write();
        if let Some(entries) = listeners.get_mut(id) {
            entries.retain(|known| !Arc::ptr_eq(known, listener));
            if entries.is_empty() {
                listeners.remove(id);
            }
        }
        Ok(())
    }

    /// Newest cached measurement for one type.
    ///
    /// # Errors
    /// - `UnrecognizedMeasurement` if the identifier is not in the registry
    /// - `NoValue` if no valid record of this type has arrived yet
    pub fn latest(&self, id: &str) -> Result<Measurement, HubError> {
        if !self.registry.contains(id) {
            return Err(HubError::unrecognized(id));
        }
        self.latest
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| HubError::no_value(id))
    }

    pub fn registry(&self) -> &Arc<MeasurementRegistry> {
        &self.registry
    }

    pub fn records_reified(&self) -> u64 {
        self.records_reified.load(Ordering::Relaxed)
    }

    pub fn records_rejected(&self) -> u64 {
        self.records_rejected.load(Ordering::Relaxed)
    }

    fn reject(&self, error: &HubError) {
        self.records_rejected.fetch_add(1, Ordering::Relaxed);
        let reason = match error {
            HubError::UnrecognizedMeasurement { .. } => "unrecognized",
            HubError::NoValue { .. } => "no_value",
            _ => "malformed",
        };
        metrics::counter!("hub_records_rejected_total", "reason" => reason).increment(1);
    }
}

impl RecordSink for ListenerSink {
    fn name(&self) -> &str {
        "listener-notifier"
    }

    /// Reify, cache and notify.
    ///
    /// Records that fail reification are dropped here, never reported as a
    /// sink failure: one misbehaving upstream signal must not pollute the
    /// pipeline's delivery accounting. Listeners are invoked with no lock
    /// held, so a listener may call back into `latest` or re-register.
    fn receive(&self, record: &VehicleRecord) -> Result<(), HubError> {
        let measurement = match self.registry.reify(record) {
            Ok(measurement) => measurement,
            Err(error @ HubError::UnrecognizedMeasurement { .. }) => {
                // Upstream streams routinely carry more types than the
                // registry knows; not worth a warning per record.
                self.reject(&error);
                debug!(record = %record.name, "Dropping unrecognized record");
                return Ok(());
            }
            Err(error) => {
                self.reject(&error);
                warn!(record = %record.name, error = %error, "Dropping invalid record");
                return Ok(());
            }
        };

        self.records_reified.fetch_add(1, Ordering::Relaxed);

        // Cache before notifying so listeners observe the value they were
        // woken for.
        self.latest
            .write()
            .insert(measurement.id().clone(), measurement.clone());

        let to_notify: Vec<Arc<dyn MeasurementListener>> = {
            let listeners = self.listeners.read();
            match listeners.get(measurement.id()) {
                Some(entries) => entries.clone(),
                None => return Ok(()),
            }
        };

        metrics::counter!("hub_listener_notifications_total").increment(to_notify.len() as u64);
        for listener in to_notify {
            listener.on_measurement(&measurement);
        }
        Ok(())
    }

    fn summary(&self) -> String {
        format!(
            "listener-notifier [reified: {}, rejected: {}]",
            self.records_reified(),
            self.records_rejected()
        )
    }
}
