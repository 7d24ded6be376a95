//! CommandController trait - Outbound command destination

use crate::{HubError, VehicleRecord};

/// Destination capable of accepting outbound commands.
///
/// Commands are delivered to exactly one controller (the first registered);
/// an implementation's failure propagates to the `set` caller but is never
/// retried against another controller.
pub trait CommandController: Send + Sync {
    /// Controller name (used for logging)
    fn name(&self) -> &str;

    /// Transmit one command record
    ///
    /// # Errors
    /// Transport failures surface as `RemoteUnavailable` or adapter-specific
    /// write errors.
    fn set(&self, command: &VehicleRecord) -> Result<(), HubError>;
}
