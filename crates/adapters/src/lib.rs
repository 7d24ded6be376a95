//! Concrete record sources and the config-driven adapter factory.
//!
//! Sources here cover development and offline use: trace playback from
//! recorded drives and a deterministic mock emitter. Live traffic reaches
//! the pipeline through the hub's remote proxy instead.

pub mod factory;
pub mod loopback;
pub mod mock_source;
pub mod trace_source;

pub use factory::{build_sink, build_source};
pub use loopback::LoopbackEndpoint;
pub use mock_source::{MockSource, MockSourceConfig};
pub use trace_source::{TraceSource, TraceSourceConfig};
