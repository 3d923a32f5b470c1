//! Analysis report data structures

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Structural fraud pattern classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    /// Money returning to its origin through a short directed cycle
    Cycle,
    /// Time-windowed fan-in/fan-out burst (structuring)
    Smurfing,
    /// Relay path through low-degree pass-through accounts
    ShellChain,
}

impl PatternType {
    /// Stable name used for scoring weights and metrics labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternType::Cycle => "cycle",
            PatternType::Smurfing => "smurfing",
            PatternType::ShellChain => "shell_chain",
        }
    }
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A group of accounts jointly implicated in one fraud pattern instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudRing {
    /// Sequential identifier (`RING_001`, `RING_002`, ...), never reused
    pub ring_id: String,

    /// Pattern that produced the ring
    pub pattern_type: PatternType,

    /// Number of member accounts
    pub member_count: usize,

    /// Fixed per-pattern risk score
    pub risk_score: f64,

    /// Member accounts in discovery order
    pub member_accounts: Vec<String>,
}

/// Per-account suspicion state, accumulated across all rings that
/// reference the account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuspiciousAccount {
    /// Account identifier
    pub account_id: String,

    /// Accumulated suspicion score, rounded to 2 decimals, capped at 100
    pub suspicion_score: f64,

    /// Patterns the account appeared in, one entry per ring (repeats allowed)
    pub detected_patterns: Vec<PatternType>,

    /// Identifiers of the rings the account belongs to
    pub ring_id: Vec<String>,

    /// Number of rings the account belongs to
    pub ring_count: u32,
}

/// Run-level statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub total_accounts_analyzed: usize,
    pub suspicious_accounts_flagged: usize,
    pub fraud_rings_detected: usize,
    pub processing_time_seconds: f64,
}

/// A single directed edge of the visualization payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphLink {
    pub source: String,
    pub target: String,
    /// Formatted as `YYYY-MM-DD HH:MM:SS`
    pub timestamp: String,
}

/// Node/link view of the ledger plus the account-to-ring mapping,
/// assembled for the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphView {
    /// All accounts, in first-seen ledger order
    pub nodes: Vec<String>,
    /// One link per transaction, in ledger order
    pub links: Vec<GraphLink>,
    /// Account -> ring identifiers, rings in registration order
    pub account_ring_map: BTreeMap<String, Vec<String>>,
}

/// The full result of one ledger analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub suspicious_accounts: Vec<SuspiciousAccount>,
    pub fraud_rings: Vec<FraudRing>,
    pub summary: AnalysisSummary,
    pub graph: GraphView,
}

/// Error payload replacing the entire report on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    pub error: String,
}

impl ErrorReport {
    /// Wrap an error message into the wire shape.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
