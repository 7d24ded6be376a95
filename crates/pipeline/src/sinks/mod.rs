//! Built-in sink implementations

mod log;
mod notifier;
mod relay;
mod trace;

pub use log::LogSink;
pub use notifier::ListenerSink;
pub use relay::RelaySink;
pub use trace::TraceSink;
