//! RemoteEndpoint trait - RPC contract with the remote aggregation endpoint
//!
//! Connection establishment and loss are asynchronous events delivered to the
//! hub by external transport glue; this trait only covers the calls available
//! while a connection exists.

use crate::{HubError, RecordCallback, VehicleRecord};

/// Abstract RPC/IPC surface of the remote aggregation endpoint.
///
/// Every method may fail with `RemoteUnavailable` when the transport breaks
/// mid-call; callers treat that as recoverable.
pub trait RemoteEndpoint: Send + Sync {
    /// Current value for a measurement type, as a raw record.
    fn get(&self, id: &str) -> Result<VehicleRecord, HubError>;

    /// Transmit an outbound command.
    fn set(&self, command: &VehicleRecord) -> Result<(), HubError>;

    /// Push one locally-produced record upstream for rebroadcast.
    fn receive(&self, record: &VehicleRecord) -> Result<(), HubError>;

    /// Register the single downstream push callback for inbound streaming.
    fn subscribe(&self, callback: RecordCallback) -> Result<(), HubError>;

    /// Drop the downstream push callback.
    fn unsubscribe(&self) -> Result<(), HubError>;

    /// Ask the endpoint to (re)attach its default upstream sources.
    fn initialize_default_sources(&self) -> Result<(), HubError>;

    /// Ask the endpoint to detach all of its upstream sources.
    fn clear_sources(&self) -> Result<(), HubError>;

    /// Human-readable summaries of the endpoint's own sources.
    fn source_summaries(&self) -> Result<Vec<String>, HubError>;

    /// Human-readable summaries of the endpoint's own sinks.
    fn sink_summaries(&self) -> Result<Vec<String>, HubError>;

    /// Total records the endpoint has processed since it started.
    fn message_count(&self) -> Result<u64, HubError>;
}
