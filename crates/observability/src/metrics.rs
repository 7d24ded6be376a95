//! Hub metrics aggregation.
//!
//! Counters are exported where they happen: the pipeline and hub crates
//! emit the `hub_*` Prometheus series directly through the `metrics`
//! facade.
//!
//! - `hub_records_dispatched_total`: records entering the fan-out
//! - `hub_sink_failures_total{sink}`: per-sink delivery failures
//! - `hub_records_rejected_total{reason}`: records dropped at reification
//! - `hub_listener_notifications_total`: listener callbacks fired
//! - `hub_commands_sent_total`: outbound commands
//! - `hub_bound`: 1 while a remote endpoint is bound
//!
//! This module adds the gauges that describe hub shape rather than flow,
//! and aggregates sampled counters in process so a run can end with a
//! printable summary.

use std::time::Duration;

use metrics::gauge;

/// Publish gauges for the current hub shape.
///
/// Meant to be called from a sampling loop; sink and source counts are
/// point-in-time sizes, not counters, so they are published here rather
/// than at mutation sites.
pub fn record_hub_shape(active_sinks: usize, user_sources: usize) {
    gauge!("hub_active_sinks").set(active_sinks as f64);
    gauge!("hub_user_sources").set(user_sources as f64);
}

/// Publish the run uptime gauge.
pub fn record_uptime(uptime: Duration) {
    gauge!("hub_uptime_seconds").set(uptime.as_secs_f64());
}

/// Cumulative hub counters at one sampling instant.
#[derive(Debug, Clone, Copy, Default)]
pub struct HubSample {
    pub records_dispatched: u64,
    pub delivery_failures: u64,
    pub records_reified: u64,
    pub records_rejected: u64,
    pub commands_sent: u64,
}

/// Hub metrics aggregator.
///
/// Consumes periodic `HubSample` snapshots and keeps enough state to
/// answer "how did the run go": final totals plus the distribution of
/// per-interval throughput.
///
/// # Example
///
/// ```ignore
/// use observability::metrics::{HubMetricsAggregator, HubSample};
///
/// let mut aggregator = HubMetricsAggregator::new();
/// loop {
///     let sample = sample_hub_counters(&hub);
///     aggregator.observe(sample, interval);
///     // ...
/// }
/// println!("{}", aggregator.summary());
/// ```
#[derive(Debug, Clone, Default)]
pub struct HubMetricsAggregator {
    /// Latest cumulative counters seen
    latest: HubSample,

    /// Records/second across sampling intervals
    rate_stats: RunningStats,

    /// Dispatched count at the previous sample, for delta computation
    last_dispatched: u64,

    /// Number of samples observed
    intervals: u64,
}

impl HubMetricsAggregator {
    /// Create a new aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in one counter snapshot taken `elapsed` after the previous one.
    pub fn observe(&mut self, sample: HubSample, elapsed: Duration) {
        let delta = sample
            .records_dispatched
            .saturating_sub(self.last_dispatched);
        let secs = elapsed.as_secs_f64();
        if secs > 0.0 {
            self.rate_stats.push(delta as f64 / secs);
        }

        self.last_dispatched = sample.records_dispatched;
        self.latest = sample;
        self.intervals += 1;
    }

    /// Latest cumulative counters.
    pub fn latest(&self) -> &HubSample {
        &self.latest
    }

    /// Number of samples observed so far.
    pub fn intervals(&self) -> u64 {
        self.intervals
    }

    /// Produce the summary report.
    pub fn summary(&self) -> MetricsSummary {
        let dispatched = self.latest.records_dispatched;
        let pct = |part: u64| {
            if dispatched > 0 {
                part as f64 / dispatched as f64 * 100.0
            } else {
                0.0
            }
        };

        MetricsSummary {
            records_dispatched: dispatched,
            delivery_failures: self.latest.delivery_failures,
            records_reified: self.latest.records_reified,
            records_rejected: self.latest.records_rejected,
            commands_sent: self.latest.commands_sent,
            failure_rate: pct(self.latest.delivery_failures),
            rejection_rate: pct(self.latest.records_rejected),
            throughput: StatsSummary::from(&self.rate_stats),
        }
    }

    /// Reset all aggregated state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Metrics summary
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub records_dispatched: u64,
    pub delivery_failures: u64,
    pub records_reified: u64,
    pub records_rejected: u64,
    pub commands_sent: u64,
    pub failure_rate: f64,
    pub rejection_rate: f64,
    pub throughput: StatsSummary,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Hub Metrics Summary ===")?;
        writeln!(f, "Records dispatched: {}", self.records_dispatched)?;
        writeln!(
            f,
            "Delivery failures: {} ({:.2}%)",
            self.delivery_failures, self.failure_rate
        )?;
        writeln!(
            f,
            "Records rejected: {} ({:.2}%)",
            self.records_rejected, self.rejection_rate
        )?;
        writeln!(f, "Records reified: {}", self.records_reified)?;
        writeln!(f, "Commands sent: {}", self.commands_sent)?;
        writeln!(f, "Throughput (records/s): {}", self.throughput)?;

        Ok(())
    }
}

/// Stats summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Add a new value
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// Sample count
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Mean
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// Standard deviation
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Minimum
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Maximum
    pub fn max(&self) -> f64 {
        self.max
    }
}
