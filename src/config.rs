//! Configuration management for the fraud ring detector

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::types::PatternType;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub nats: NatsConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// NATS connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NatsConfig {
    /// NATS server URL
    pub url: String,
    /// Subject for incoming analysis requests (ledger payloads)
    pub request_subject: String,
    /// Subject for outgoing analysis reports
    pub report_subject: String,
    /// Queue group shared by competing analyzer instances
    #[serde(default = "default_queue_group")]
    pub queue_group: String,
}

fn default_queue_group() -> String {
    "ring-analyzers".to_string()
}

/// Detector thresholds. Every field defaults to the production constants, so
/// an empty `[detection]` table runs the reference configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetectionConfig {
    #[serde(default)]
    pub safelist: SafelistConfig,
    #[serde(default)]
    pub cycle: CycleConfig,
    #[serde(default)]
    pub structuring: StructuringConfig,
    #[serde(default)]
    pub shell: ShellConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
}

/// Merchant safelist qualification thresholds
#[derive(Debug, Clone, Deserialize)]
pub struct SafelistConfig {
    /// Total degree (in + out) must exceed this
    pub min_total_degree: usize,
    /// Distinct active days must exceed this
    pub min_active_days: usize,
    /// Lower bound on the balanced-flow ratio `(in+1)/(out+1)`
    pub min_flow_ratio: f64,
    /// Upper bound on the balanced-flow ratio
    pub max_flow_ratio: f64,
}

impl Default for SafelistConfig {
    fn default() -> Self {
        Self {
            min_total_degree: 50,
            min_active_days: 7,
            min_flow_ratio: 0.3,
            max_flow_ratio: 3.0,
        }
    }
}

/// Cycle detector bounds
#[derive(Debug, Clone, Deserialize)]
pub struct CycleConfig {
    /// Maximum path length explored by the DFS; cycles longer than this
    /// are never found
    pub max_path_len: usize,
    /// Minimum number of accounts for a reported cycle
    pub min_cycle_len: usize,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            max_path_len: 5,
            min_cycle_len: 3,
        }
    }
}

/// Structuring (smurfing) detector thresholds
#[derive(Debug, Clone, Deserialize)]
pub struct StructuringConfig {
    /// Width of the non-overlapping time buckets, in seconds
    pub bucket_secs: i64,
    /// Buckets with fewer transactions than this are skipped
    pub min_bucket_size: usize,
    /// Distinct-counterparty count at which a hub qualifies
    pub min_fan_count: usize,
}

impl Default for StructuringConfig {
    fn default() -> Self {
        Self {
            bucket_secs: 72 * 3600,
            min_bucket_size: 10,
            min_fan_count: 10,
        }
    }
}

/// Shell chain detector thresholds
#[derive(Debug, Clone, Deserialize)]
pub struct ShellConfig {
    /// Inclusive lower bound on a shell node's total degree
    pub min_shell_degree: usize,
    /// Inclusive upper bound on a shell node's total degree
    pub max_shell_degree: usize,
    /// Maximum path length expanded by the DFS
    pub max_path_len: usize,
    /// Minimum number of accounts for a reported chain
    pub min_chain_len: usize,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            min_shell_degree: 2,
            max_shell_degree: 3,
            max_path_len: 6,
            min_chain_len: 4,
        }
    }
}

/// Ring scoring parameters
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    /// Per-pattern base weights for account scoring
    #[serde(default = "default_pattern_weights")]
    pub pattern_weights: HashMap<String, f64>,
    /// Base weight applied to patterns absent from the map
    #[serde(default = "default_weight")]
    pub default_weight: f64,
    /// Per-pattern fixed ring risk scores
    #[serde(default = "default_risk_scores")]
    pub risk_scores: HashMap<String, f64>,
    /// Cap on the member-count bonus added to a first-seen account
    #[serde(default = "default_size_bonus_cap")]
    pub size_bonus_cap: f64,
    /// Fraction of the base weight added for each repeat ring membership
    #[serde(default = "default_repeat_factor")]
    pub repeat_factor: f64,
    /// Final per-account score ceiling
    #[serde(default = "default_score_cap")]
    pub score_cap: f64,
}

fn default_pattern_weights() -> HashMap<String, f64> {
    let mut weights = HashMap::new();
    weights.insert("cycle".to_string(), 40.0);
    weights.insert("smurfing".to_string(), 30.0);
    weights.insert("shell_chain".to_string(), 35.0);
    weights
}

fn default_weight() -> f64 {
    25.0
}

fn default_risk_scores() -> HashMap<String, f64> {
    let mut scores = HashMap::new();
    scores.insert("cycle".to_string(), 95.0);
    scores.insert("smurfing".to_string(), 90.0);
    scores.insert("shell_chain".to_string(), 92.0);
    scores
}

fn default_size_bonus_cap() -> f64 {
    20.0
}

fn default_repeat_factor() -> f64 {
    0.5
}

fn default_score_cap() -> f64 {
    100.0
}

impl ScoringConfig {
    /// Base scoring weight for a pattern.
    pub fn base_weight(&self, pattern: PatternType) -> f64 {
        self.pattern_weights
            .get(pattern.as_str())
            .copied()
            .unwrap_or(self.default_weight)
    }

    /// Fixed ring risk score for a pattern.
    pub fn risk_score(&self, pattern: PatternType) -> f64 {
        self.risk_scores
            .get(pattern.as_str())
            .copied()
            .unwrap_or(90.0)
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            pattern_weights: default_pattern_weights(),
            default_weight: default_weight(),
            risk_scores: default_risk_scores(),
            size_bonus_cap: default_size_bonus_cap(),
            repeat_factor: default_repeat_factor(),
            score_cap: default_score_cap(),
        }
    }
}

/// Pipeline configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Number of concurrent analysis workers
    pub workers: usize,
    /// Interval between metrics summaries, in seconds
    pub metrics_interval_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            metrics_interval_secs: 30,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            nats: NatsConfig {
                url: "nats://localhost:4222".to_string(),
                request_subject: "ledger.analyze".to_string(),
                report_subject: "fraud.reports".to_string(),
                queue_group: default_queue_group(),
            },
            detection: DetectionConfig::default(),
            pipeline: PipelineConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.nats.url, "nats://localhost:4222");
        assert_eq!(config.detection.safelist.min_total_degree, 50);
        assert_eq!(config.detection.cycle.max_path_len, 5);
        assert_eq!(config.detection.structuring.bucket_secs, 259_200);
        assert_eq!(config.detection.shell.max_shell_degree, 3);
        assert_eq!(config.pipeline.workers, 4);
    }

    #[test]
    fn test_scoring_weights() {
        let scoring = ScoringConfig::default();
        assert_eq!(scoring.base_weight(PatternType::Cycle), 40.0);
        assert_eq!(scoring.base_weight(PatternType::Smurfing), 30.0);
        assert_eq!(scoring.base_weight(PatternType::ShellChain), 35.0);
        assert_eq!(scoring.risk_score(PatternType::Cycle), 95.0);
        assert_eq!(scoring.risk_score(PatternType::ShellChain), 92.0);
    }

    #[test]
    fn test_unknown_pattern_falls_back_to_default_weight() {
        let mut scoring = ScoringConfig::default();
        scoring.pattern_weights.remove("smurfing");
        assert_eq!(scoring.base_weight(PatternType::Smurfing), 25.0);
    }
}
