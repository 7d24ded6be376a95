//! RelaySink - UDP fire-and-forget record streaming

use std::collections::HashMap;
use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, error, trace};

use contracts::{HubError, RecordSink, VehicleRecord};

/// Configuration for RelaySink
#[derive(Debug, Clone)]
pub struct RelaySinkConfig {
    /// Target address
    pub addr: SocketAddr,
}

impl RelaySinkConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, String> {
        let addr_str = params
            .get("addr")
            .ok_or_else(|| "missing 'addr' parameter".to_string())?;

        let addr: SocketAddr = addr_str
            .parse()
            .map_err(|e| format!("invalid address '{}': {}", addr_str, e))?;

        Ok(Self { addr })
    }
}

/// Sink that relays records over UDP, one JSON datagram per record
#[derive(Debug)]
pub struct RelaySink {
    name: String,
    target: SocketAddr,
    socket: UdpSocket,
    records_sent: AtomicU64,
}

impl RelaySink {
    /// Create a new RelaySink
    pub fn new(name: impl Into<String>, config: RelaySinkConfig) -> std::io::Result<Self> {
        let name = name.into();
        // Bind to any available port
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.connect(config.addr)?;

        debug!(
            sink = %name,
            target = %config.addr,
            "RelaySink connected"
        );

        Ok(Self {
            name,
            target: config.addr,
            socket,
            records_sent: AtomicU64::new(0),
        })
    }

    /// Create from params (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, HubError> {
        let config =
            RelaySinkConfig::from_params(params).map_err(|e| HubError::construction("relay", e))?;
        Self::new(name, config).map_err(|e| HubError::construction("relay", e.to_string()))
    }

    pub fn records_sent(&self) -> u64 {
        self.records_sent.load(Ordering::Relaxed)
    }
}

impl RecordSink for RelaySink {
    fn name(&self) -> &str {
        &self.name
    }

    fn receive(&self, record: &VehicleRecord) -> Result<(), HubError> {
        let data = serde_json::to_vec(record)
            .map_err(|e| HubError::sink_write(&self.name, e.to_string()))?;

        match self.socket.send(&data) {
            Ok(sent) => {
                self.records_sent.fetch_add(1, Ordering::Relaxed);
                trace!(sink = %self.name, record = %record.name, bytes = sent, "Sent");
            }
            Err(e) => {
                // Log but don't fail - UDP is best-effort
                error!(sink = %self.name, error = %e, "UDP send failed");
            }
        }
        Ok(())
    }

    fn stop(&self) {
        debug!(
            sink = %self.name,
            records = self.records_sent(),
            "RelaySink closed"
        );
    }

    fn summary(&self) -> String {
        format!(
            "{} [target: {}, records: {}]",
            self.name,
            self.target,
            self.records_sent()
        )
    }
}
