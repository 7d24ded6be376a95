//! Hub runner - builds a hub from its blueprint and drives the run.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::HubBlueprint;
use hub::{HubStats, VehicleHub};
use observability::{record_hub_shape, record_uptime, HubMetricsAggregator, HubSample};
use tracing::{info, warn};

use super::RunStats;

/// Runner configuration
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// The hub blueprint configuration
    pub blueprint: HubBlueprint,

    /// Run duration (None = until interrupted)
    pub duration: Option<Duration>,

    /// Stop once this many records were dispatched (None = unlimited)
    pub max_records: Option<u64>,

    /// Interval between progress samples
    pub stats_interval: Duration,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main hub runner
pub struct HubRunner {
    config: RunnerConfig,
}

impl HubRunner {
    /// Create a new runner with the given configuration
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Run the hub to completion
    pub async fn run(self) -> Result<RunStats> {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        // Build the signal registry and the hub
        let registry = blueprint.build_registry();
        info!(
            hub = %blueprint.hub.name,
            signals = registry.len(),
            "Signal registry built"
        );

        let hub = VehicleHub::named(blueprint.hub.name.clone(), registry);

        // Attach sinks before sources so the first records already fan out
        info!("Attaching sinks...");
        for sink_config in &blueprint.sinks {
            let sink = adapters::build_sink(sink_config)
                .with_context(|| format!("Failed to construct sink '{}'", sink_config.name))?;
            hub.add_sink(sink);
        }

        if blueprint.sinks.is_empty() {
            warn!("No sinks configured - records only reach registered listeners");
        }

        // Attach sources; attaching also starts them
        info!("Attaching sources...");
        for source_config in &blueprint.sources {
            let source = adapters::build_source(source_config)
                .with_context(|| format!("Failed to construct source '{}'", source_config.id))?;
            hub.add_source(source);
        }

        if blueprint.sources.is_empty() {
            warn!("No sources configured - hub will idle until a remote endpoint binds");
        }

        let shape = hub.stats();
        info!(
            sources = shape.user_sources,
            sinks = shape.active_sinks,
            max_records = ?self.config.max_records,
            "Hub running"
        );

        // Sampling loop: feed the aggregator, publish gauges, log progress
        let mut aggregator = HubMetricsAggregator::new();
        let mut last_sample = Instant::now();
        let interval = self.config.stats_interval;
        let max_records = self.config.max_records;

        let sample_loop = async {
            loop {
                tokio::time::sleep(interval).await;

                let stats = hub.stats();
                let elapsed = last_sample.elapsed();
                last_sample = Instant::now();

                aggregator.observe(sample_from(&stats), elapsed);
                record_hub_shape(stats.active_sinks, stats.user_sources);
                record_uptime(start_time.elapsed());

                info!(
                    records = stats.records_dispatched,
                    rejected = stats.records_rejected,
                    failures = stats.delivery_failures,
                    binding = ?stats.binding,
                    "Hub progress"
                );

                if let Some(max) = max_records {
                    if stats.records_dispatched >= max {
                        info!(
                            records = stats.records_dispatched,
                            "Reached max records limit"
                        );
                        break;
                    }
                }
            }
        };

        // Run with optional duration limit
        if let Some(duration) = self.config.duration {
            if tokio::time::timeout(duration, sample_loop).await.is_err() {
                info!(duration_secs = duration.as_secs(), "Run duration elapsed");
            }
        } else {
            sample_loop.await;
        }

        // Shutdown: capture counters before stop() clears the registries
        info!("Stopping hub...");
        let final_counters = hub.stats();
        aggregator.observe(sample_from(&final_counters), last_sample.elapsed());
        hub.stop();

        let duration = start_time.elapsed();
        info!(
            duration_secs = duration.as_secs_f64(),
            records = final_counters.records_dispatched,
            "Hub shutdown complete"
        );

        Ok(RunStats {
            records_dispatched: final_counters.records_dispatched,
            delivery_failures: final_counters.delivery_failures,
            records_rejected: final_counters.records_rejected,
            commands_sent: final_counters.commands_sent,
            duration,
            user_sources: final_counters.user_sources,
            active_sinks: final_counters.active_sinks,
            hub_metrics: aggregator,
        })
    }
}

fn sample_from(stats: &HubStats) -> HubSample {
    HubSample {
        records_dispatched: stats.records_dispatched,
        delivery_failures: stats.delivery_failures,
        records_reified: stats.records_reified,
        records_rejected: stats.records_rejected,
        commands_sent: stats.commands_sent,
    }
}
