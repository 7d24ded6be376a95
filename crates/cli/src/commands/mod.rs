//! Command implementations.

mod run;
mod signals;
mod validate;

pub use run::run_hub;
pub use signals::run_signals;
pub use validate::run_validate;
