//! Run statistics for the hub.

use std::time::Duration;

use observability::HubMetricsAggregator;

/// Statistics from a hub run
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Total records that entered the fan-out
    pub records_dispatched: u64,

    /// Total per-sink delivery failures
    pub delivery_failures: u64,

    /// Total records dropped at reification
    pub records_rejected: u64,

    /// Total outbound commands sent
    pub commands_sent: u64,

    /// Total duration of the run
    pub duration: Duration,

    /// Number of user sources that were attached
    pub user_sources: usize,

    /// Number of sinks that received data
    pub active_sinks: usize,

    /// Sampled hub metrics aggregator
    pub hub_metrics: HubMetricsAggregator,
}

impl RunStats {
    /// Calculate records per second throughput
    pub fn records_per_second(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.records_dispatched as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Calculate rejection rate as percentage
    #[allow(dead_code)]
    pub fn rejection_rate(&self) -> f64 {
        if self.records_dispatched > 0 {
            (self.records_rejected as f64 / self.records_dispatched as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                      Hub Run Statistics                      ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Records dispatched: {}", self.records_dispatched);
        println!("   ├─ Records/s: {:.2}", self.records_per_second());
        println!("   ├─ User sources: {}", self.user_sources);
        println!("   └─ Active sinks: {}", self.active_sinks);

        let summary = self.hub_metrics.summary();

        println!("\n📈 Delivery");
        println!("   ├─ Delivery failures: {}", self.delivery_failures);
        println!(
            "   ├─ Records rejected: {} ({:.2}%)",
            self.records_rejected, summary.rejection_rate
        );
        println!("   ├─ Records reified: {}", summary.records_reified);
        println!("   ├─ Commands sent: {}", self.commands_sent);
        println!("   └─ Throughput (records/s): {}", summary.throughput);

        println!();
    }
}
