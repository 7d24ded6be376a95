//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Record timestamps are unix seconds (f64), assigned by the producing source
//! - Records without a timestamp are stamped at the recording boundary

mod blueprint;
mod controller;
mod error;
mod listener;
mod measurement;
mod measurement_id;
mod record;
mod record_sink;
mod record_source;
mod remote;
mod snapshot;

pub use blueprint::*;
pub use controller::CommandController;
pub use error::*;
pub use listener::MeasurementListener;
pub use measurement::*;
pub use measurement_id::MeasurementId;
pub use record::{Value, VehicleRecord};
pub use record_sink::RecordSink;
pub use record_source::{RecordCallback, RecordSource};
pub use remote::RemoteEndpoint;
pub use snapshot::SnapshotVec;
