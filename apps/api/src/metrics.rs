//! Metrics collector — rolling buffer of external-call metrics backing the
//! stats endpoint. Process-wide; handlers record one entry per chat call.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;

const MAX_METRICS: usize = 1000;

#[derive(Debug, Clone, Serialize)]
pub struct CallMetric {
    pub endpoint: String,
    /// "success" | "error" | "cache_hit" | "rate_limited"
    pub status: String,
    pub response_time_ms: u64,
    pub recorded_at: DateTime<Utc>,
}

impl CallMetric {
    pub fn new(endpoint: &str, status: &str, response_time_ms: u64) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            status: status.to_string(),
            response_time_ms,
            recorded_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsStats {
    pub total_requests: usize,
    pub success_rate: f64,
    pub avg_response_time_ms: f64,
    pub last_metric: Option<CallMetric>,
}

/// Bounded metric history: once full, the oldest entry is dropped.
#[derive(Default)]
pub struct MetricsCollector {
    metrics: VecDeque<CallMetric>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, metric: CallMetric) {
        self.metrics.push_back(metric);
        if self.metrics.len() > MAX_METRICS {
            self.metrics.pop_front();
        }
    }

    pub fn stats(&self) -> MetricsStats {
        let total = self.metrics.len();
        if total == 0 {
            return MetricsStats {
                total_requests: 0,
                success_rate: 0.0,
                avg_response_time_ms: 0.0,
                last_metric: None,
            };
        }

        let success = self
            .metrics
            .iter()
            .filter(|m| m.status == "success" || m.status == "cache_hit")
            .count();
        let total_time: u64 = self.metrics.iter().map(|m| m.response_time_ms).sum();
        let avg_time = total_time as f64 / total as f64;

        MetricsStats {
            total_requests: total,
            success_rate: success as f64 / total as f64 * 100.0,
            avg_response_time_ms: (avg_time * 100.0).round() / 100.0,
            last_metric: self.metrics.back().cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_collector_reports_zeroes() {
        let collector = MetricsCollector::new();
        let stats = collector.stats();
        assert_eq!(stats.total_requests, 0);
        assert_eq!(stats.success_rate, 0.0);
        assert!(stats.last_metric.is_none());
    }

    #[test]
    fn test_success_rate_and_average() {
        let mut collector = MetricsCollector::new();
        collector.record(CallMetric::new("chat.completions", "success", 100));
        collector.record(CallMetric::new("chat.completions", "error", 300));
        let stats = collector.stats();
        assert_eq!(stats.total_requests, 2);
        assert_eq!(stats.success_rate, 50.0);
        assert_eq!(stats.avg_response_time_ms, 200.0);
    }

    #[test]
    fn test_cache_hits_count_as_success() {
        let mut collector = MetricsCollector::new();
        collector.record(CallMetric::new("chat.completions", "cache_hit", 0));
        assert_eq!(collector.stats().success_rate, 100.0);
    }

    #[test]
    fn test_buffer_capped_at_1000_entries() {
        let mut collector = MetricsCollector::new();
        for i in 0..1001 {
            collector.record(CallMetric::new("chat.completions", "success", i));
        }
        let stats = collector.stats();
        assert_eq!(stats.total_requests, 1000);
        // Entry 0 was dropped; the newest survives.
        assert_eq!(stats.last_metric.unwrap().response_time_ms, 1000);
    }
}
