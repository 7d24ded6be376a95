//! # Pipeline
//!
//! Record fan-out module.
//!
//! Responsibilities:
//! - Accept raw records from the canonical source (or direct dispatch)
//! - Fan out every record to all registered sinks in registration order
//! - Isolate failing sinks so one bad sink never starves the rest
//! - Own sink/source shutdown on stop

pub mod pipeline;
pub mod sinks;

pub use pipeline::{DataPipeline, PipelineStats};
pub use sinks::{ListenerSink, LogSink, RelaySink, TraceSink};
