//! In-process remote endpoint
//!
//! Implements `RemoteEndpoint` without any transport: injected records are
//! cached and rebroadcast to the subscriber, commands are journaled for
//! inspection. Used for demos and integration tests; an `offline` switch
//! simulates transport loss.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};
use tracing::debug;

use contracts::{HubError, MeasurementId, RecordCallback, RemoteEndpoint, VehicleRecord};

#[derive(Default)]
pub struct LoopbackEndpoint {
    latest: RwLock<HashMap<MeasurementId, VehicleRecord>>,
    subscriber: RwLock<Option<RecordCallback>>,
    commands: Mutex<Vec<VehicleRecord>>,
    messages: AtomicU64,
    sources_attached: AtomicBool,
    offline: AtomicBool,
}

impl LoopbackEndpoint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate upstream traffic: cache the record and push it to the
    /// subscriber, if any.
    pub fn inject(&self, record: VehicleRecord) {
        self.messages.fetch_add(1, Ordering::Relaxed);
        self.latest
            .write()
            .insert(record.name.clone(), record.clone());

        let subscriber = self.subscriber.read().clone();
        if let Some(subscriber) = subscriber {
            subscriber(record);
        }
    }

    /// Flip transport availability; while offline every call fails with
    /// `RemoteUnavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
        debug!(offline, "Loopback endpoint availability changed");
    }

    /// Commands received via `set`, in arrival order.
    pub fn commands(&self) -> Vec<VehicleRecord> {
        self.commands.lock().clone()
    }

    pub fn has_subscriber(&self) -> bool {
        self.subscriber.read().is_some()
    }

    fn ensure_online(&self) -> Result<(), HubError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(HubError::remote_unavailable("loopback endpoint offline"));
        }
        Ok(())
    }
}

impl RemoteEndpoint for LoopbackEndpoint {
    fn get(&self, id: &str) -> Result<VehicleRecord, HubError> {
        self.ensure_online()?;
        Ok(self
            .latest
            .read()
            .get(id)
            .cloned()
            .unwrap_or_else(|| VehicleRecord::empty(id)))
    }

    fn set(&self, command: &VehicleRecord) -> Result<(), HubError> {
        self.ensure_online()?;
        self.messages.fetch_add(1, Ordering::Relaxed);
        self.commands.lock().push(command.clone());
        Ok(())
    }

    fn receive(&self, record: &VehicleRecord) -> Result<(), HubError> {
        self.ensure_online()?;
        self.inject(record.clone());
        Ok(())
    }

    fn subscribe(&self, callback: RecordCallback) -> Result<(), HubError> {
        self.ensure_online()?;
        *self.subscriber.write() = Some(callback);
        Ok(())
    }

    fn unsubscribe(&self) -> Result<(), HubError> {
        self.ensure_online()?;
        *self.subscriber.write() = None;
        Ok(())
    }

    fn initialize_default_sources(&self) -> Result<(), HubError> {
        self.ensure_online()?;
        self.sources_attached.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn clear_sources(&self) -> Result<(), HubError> {
        self.ensure_online()?;
        self.sources_attached.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn source_summaries(&self) -> Result<Vec<String>, HubError> {
        self.ensure_online()?;
        if self.sources_attached.load(Ordering::SeqCst) {
            Ok(vec!["loopback-feed [running: true]".to_string()])
        } else {
            Ok(Vec::new())
        }
    }

    fn sink_summaries(&self) -> Result<Vec<String>, HubError> {
        self.ensure_online()?;
        Ok(Vec::new())
    }

    fn message_count(&self) -> Result<u64, HubError> {
        self.ensure_online()?;
        Ok(self.messages.load(Ordering::Relaxed))
    }
}
