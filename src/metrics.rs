//! Performance metrics and statistics tracking for the analysis service.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

use crate::types::AnalysisReport;

/// Metrics collector for the analysis pipeline
pub struct PipelineMetrics {
    /// Total analyses completed
    pub analyses_completed: AtomicU64,
    /// Total analyses that failed (schema or processing errors)
    pub analyses_failed: AtomicU64,
    /// Total rings detected across all analyses
    pub rings_detected: AtomicU64,
    /// Total accounts flagged across all analyses
    pub accounts_flagged: AtomicU64,
    /// Rings by pattern type
    rings_by_pattern: RwLock<HashMap<String, u64>>,
    /// Analysis wall-clock times (in microseconds)
    processing_times: RwLock<Vec<u64>>,
    /// Start time for rate calculation
    start_time: Instant,
}

impl PipelineMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            analyses_completed: AtomicU64::new(0),
            analyses_failed: AtomicU64::new(0),
            rings_detected: AtomicU64::new(0),
            accounts_flagged: AtomicU64::new(0),
            rings_by_pattern: RwLock::new(HashMap::new()),
            processing_times: RwLock::new(Vec::with_capacity(1000)),
            start_time: Instant::now(),
        }
    }

    /// Record a completed analysis
    pub fn record_analysis(&self, elapsed: Duration, report: &AnalysisReport) {
        self.analyses_completed.fetch_add(1, Ordering::Relaxed);
        self.rings_detected
            .fetch_add(report.fraud_rings.len() as u64, Ordering::Relaxed);
        self.accounts_flagged
            .fetch_add(report.suspicious_accounts.len() as u64, Ordering::Relaxed);

        if let Ok(mut by_pattern) = self.rings_by_pattern.write() {
            for ring in &report.fraud_rings {
                *by_pattern
                    .entry(ring.pattern_type.as_str().to_string())
                    .or_insert(0) += 1;
            }
        }

        if let Ok(mut times) = self.processing_times.write() {
            times.push(elapsed.as_micros() as u64);
            // Keep only the recent window for memory efficiency
            if times.len() > 10_000 {
                times.drain(0..5_000);
            }
        }
    }

    /// Record a failed analysis
    pub fn record_failure(&self) {
        self.analyses_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get processing time statistics
    pub fn get_processing_stats(&self) -> ProcessingStats {
        let times = self.processing_times.read().unwrap();
        if times.is_empty() {
            return ProcessingStats::default();
        }

        let mut sorted: Vec<u64> = times.clone();
        sorted.sort_unstable();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();

        ProcessingStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[(count as f64 * 0.95) as usize],
            p99_us: sorted[(count as f64 * 0.99) as usize],
            max_us: *sorted.last().unwrap_or(&0),
        }
    }

    /// Get current throughput (analyses per second)
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.analyses_completed.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Get ring counts by pattern type
    pub fn get_rings_by_pattern(&self) -> HashMap<String, u64> {
        self.rings_by_pattern.read().unwrap().clone()
    }

    /// Log summary statistics
    pub fn print_summary(&self) {
        let completed = self.analyses_completed.load(Ordering::Relaxed);
        let failed = self.analyses_failed.load(Ordering::Relaxed);
        let rings = self.rings_detected.load(Ordering::Relaxed);
        let flagged = self.accounts_flagged.load(Ordering::Relaxed);
        let processing = self.get_processing_stats();

        info!(
            analyses_completed = completed,
            analyses_failed = failed,
            rings_detected = rings,
            accounts_flagged = flagged,
            throughput = format!("{:.2}/s", self.get_throughput()),
            "Pipeline summary"
        );
        info!(
            mean_us = processing.mean_us,
            p50_us = processing.p50_us,
            p95_us = processing.p95_us,
            p99_us = processing.p99_us,
            max_us = processing.max_us,
            "Analysis latency"
        );
        for (pattern, count) in self.get_rings_by_pattern() {
            info!(pattern = %pattern, count = count, "Rings by pattern");
        }
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Processing time statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Real-time metrics reporter that logs periodic summaries
pub struct MetricsReporter {
    metrics: std::sync::Arc<PipelineMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: std::sync::Arc<PipelineMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::LedgerAnalyzer;
    use crate::config::DetectionConfig;
    use crate::types::Transaction;
    use chrono::{TimeZone, Utc};

    fn sample_report() -> AnalysisReport {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let ledger = vec![
            Transaction::new("t1", "a", "b", 10.0, ts),
            Transaction::new("t2", "b", "c", 10.0, ts),
            Transaction::new("t3", "c", "a", 10.0, ts),
        ];
        LedgerAnalyzer::new(DetectionConfig::default())
            .analyze(&ledger)
            .unwrap()
    }

    #[test]
    fn test_metrics_recording() {
        let metrics = PipelineMetrics::new();
        let report = sample_report();

        metrics.record_analysis(Duration::from_micros(150), &report);
        metrics.record_analysis(Duration::from_micros(300), &report);
        metrics.record_failure();

        assert_eq!(metrics.analyses_completed.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.analyses_failed.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.rings_detected.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.get_rings_by_pattern().get("cycle"), Some(&2));
    }

    #[test]
    fn test_processing_stats() {
        let metrics = PipelineMetrics::new();
        let report = sample_report();

        for micros in [100u64, 200, 300, 400] {
            metrics.record_analysis(Duration::from_micros(micros), &report);
        }

        let stats = metrics.get_processing_stats();
        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean_us, 250);
        assert_eq!(stats.max_us, 400);
    }
}
