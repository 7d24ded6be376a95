//! MeasurementListener trait - typed application callback

use crate::Measurement;

/// Application callback invoked for every reified measurement of a
/// registered type.
///
/// Listener identity is `Arc` pointer identity: registering the same `Arc`
/// twice for one type is a no-op, and unregistering requires the same `Arc`
/// that was registered. Invocations happen outside any pipeline lock, so a
/// listener may call back into the hub (except `wait_until_bound` from the
/// connection-state thread).
pub trait MeasurementListener: Send + Sync {
    fn on_measurement(&self, measurement: &Measurement);
}
