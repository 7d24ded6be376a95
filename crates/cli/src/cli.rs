//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Vehicle Hub - telemetry fan-out hub for vehicle data streams
#[derive(Parser, Debug)]
#[command(
    name = "vehicle-hub",
    author,
    version,
    about = "Vehicle telemetry hub",
    long_about = "A fan-out hub for vehicle telemetry streams.\n\n\
                  Attaches sources and sinks from configuration, reifies raw \n\
                  records against the signal catalog, and serves typed \n\
                  measurement queries and listener callbacks."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "VEHICLE_HUB_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "VEHICLE_HUB_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the hub
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display the signal catalog
    Signals(SignalsArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "hub.toml", env = "VEHICLE_HUB_CONFIG")]
    pub config: PathBuf,

    /// Override the hub instance name from configuration
    #[arg(long, env = "VEHICLE_HUB_NAME")]
    pub name: Option<String>,

    /// Run duration in seconds (0 = run until interrupted)
    #[arg(long, default_value = "0", env = "VEHICLE_HUB_DURATION")]
    pub duration: u64,

    /// Stop after this many dispatched records, checked at the stats
    /// interval (0 = unlimited)
    #[arg(long, default_value = "0", env = "VEHICLE_HUB_MAX_RECORDS")]
    pub max_records: u64,

    /// Seconds between progress samples
    #[arg(long, default_value = "5", env = "VEHICLE_HUB_STATS_INTERVAL")]
    pub stats_interval: u64,

    /// Validate configuration and exit without running the hub
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "9000", env = "VEHICLE_HUB_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "hub.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `signals` command
#[derive(Parser, Debug)]
pub struct SignalsArgs {
    /// Configuration file whose custom signals extend the catalog
    /// (omit for the standard catalog)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Only show evented signals
    #[arg(long)]
    pub evented: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
