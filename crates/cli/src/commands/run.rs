//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::runner::{HubRunner, RunnerConfig};

/// Execute the `run` command
pub async fn run_hub(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    // Validate config path
    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    // Load and parse configuration
    let mut blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(ref name) = args.name {
        info!(name = %name, "Overriding hub name from CLI");
        blueprint.hub.name = name.clone();
    }

    info!(
        hub = %blueprint.hub.name,
        standard_signals = blueprint.hub.standard_signals,
        custom_signals = blueprint.hub.signals.len(),
        sources = blueprint.sources.len(),
        sinks = blueprint.sinks.len(),
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    // Build runner configuration
    let runner_config = RunnerConfig {
        blueprint,
        duration: if args.duration == 0 {
            None
        } else {
            Some(Duration::from_secs(args.duration))
        },
        max_records: if args.max_records == 0 {
            None
        } else {
            Some(args.max_records)
        },
        stats_interval: Duration::from_secs(args.stats_interval.max(1)),
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
    };

    // Create and run the hub
    let runner = HubRunner::new(runner_config);

    // Setup graceful shutdown handler
    let shutdown_signal = setup_shutdown_signal();

    info!("Starting hub...");

    // Run hub with shutdown signal
    tokio::select! {
        result = runner.run() => {
            match result {
                Ok(stats) => {
                    info!(
                        records_dispatched = stats.records_dispatched,
                        records_rejected = stats.records_rejected,
                        duration_secs = stats.duration.as_secs_f64(),
                        rps = format!("{:.2}", stats.records_per_second()),
                        "Hub run completed successfully"
                    );

                    // Print detailed statistics
                    stats.print_summary();
                }
                Err(e) => {
                    return Err(e).context("Hub run failed");
                }
            }
        }
        _ = shutdown_signal => {
            warn!("Received shutdown signal, stopping hub...");
        }
    }

    info!("Vehicle Hub finished");
    Ok(())
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &contracts::HubBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("Hub:");
    println!("  Name: {}", blueprint.hub.name);
    println!(
        "  Standard catalog: {}",
        if blueprint.hub.standard_signals {
            "yes"
        } else {
            "no"
        }
    );
    println!("  Custom signals: {}", blueprint.hub.signals.len());

    if !blueprint.sources.is_empty() {
        println!("\nSources ({}):", blueprint.sources.len());
        for source in &blueprint.sources {
            println!("  - {} ({:?})", source.id, source.kind);
        }
    }

    if !blueprint.sinks.is_empty() {
        println!("\nSinks ({}):", blueprint.sinks.len());
        for sink in &blueprint.sinks {
            println!("  - {} ({:?})", sink.name, sink.kind);
        }
    }

    println!();
}
