//! Hub orchestration module.

mod orchestrator;
mod stats;

pub use orchestrator::{HubRunner, RunnerConfig};
pub use stats::RunStats;
