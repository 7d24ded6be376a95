//! VehicleHub - the application-facing facade.
//!
//! Owns the data pipeline, the user source/controller registries and the
//! remote binding lifecycle. Applications query and command vehicle state
//! through this crate; everything below it deals in raw records.

pub mod binding;
pub mod hub;
pub mod remote;

pub use binding::{BindingLatch, BindingState};
pub use hub::{HubStats, VehicleHub};
pub use remote::{RemoteController, RemoteSource};
