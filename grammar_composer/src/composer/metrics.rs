use crate::context::ContextStats;
use serde::Serialize;
use std::time::Duration;

/// Timing and volume figures for one parse. Durations are microseconds and
/// stay zero when metric collection is turned off.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PerformanceMetrics {
    pub total_duration_us: u64,
    pub parse_duration_us: u64,
    pub validation_duration_us: u64,
    pub context_switches: usize,
    pub max_context_depth: usize,
    pub symbol_count: usize,
    pub cross_reference_count: usize,
    pub binding_count: usize,
    pub bytes_processed: usize,
    pub embedded_regions: usize,
}

impl PerformanceMetrics {
    pub fn from_stats(stats: &ContextStats) -> Self {
        Self {
            context_switches: stats.switch_count,
            max_context_depth: stats.max_depth,
            bytes_processed: stats.bytes_processed,
            embedded_regions: stats.embedded_regions,
            ..Self::default()
        }
    }

    pub fn record_durations(&mut self, total: Duration, parse: Duration, validation: Duration) {
        self.total_duration_us = micros(total);
        self.parse_duration_us = micros(parse);
        self.validation_duration_us = micros(validation);
    }

    /// Bytes per second over the whole call
    pub fn throughput(&self) -> f64 {
        if self.total_duration_us == 0 {
            return 0.0;
        }
        self.bytes_processed as f64 / (self.total_duration_us as f64 / 1_000_000.0)
    }
}

fn micros(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_from_stats() {
        let stats = ContextStats {
            switch_count: 4,
            max_depth: 3,
            final_depth: 1,
            embedded_regions: 2,
            bytes_processed: 2_000,
        };
        let mut metrics = PerformanceMetrics::from_stats(&stats);
        assert_eq!(metrics.context_switches, 4);
        assert_eq!(metrics.throughput(), 0.0);

        metrics.record_durations(
            Duration::from_millis(2),
            Duration::from_micros(1_500),
            Duration::from_micros(300),
        );
        assert_eq!(metrics.total_duration_us, 2_000);
        assert_eq!(metrics.parse_duration_us, 1_500);
        assert_eq!(metrics.throughput(), 1_000_000.0);
    }
}
