//! Ledger analysis orchestration.
//!
//! Runs one self-contained batch analysis: graph construction, safelist
//! classification, the three detectors, aggregation, and report assembly.
//! Everything built here is instance-local to the call and discarded once
//! the report is produced; nothing survives across requests.

use std::collections::BTreeMap;
use std::time::Instant;

use tracing::{debug, info};

use crate::config::DetectionConfig;
use crate::detectors::{CycleDetector, ShellChainDetector, StructuringDetector};
use crate::error::Result;
use crate::graph::TransactionGraph;
use crate::safelist::MerchantSafelist;
use crate::scoring::RingAggregator;
use crate::types::{
    AnalysisReport, AnalysisSummary, FraudRing, GraphLink, GraphView, Transaction,
};

/// Format used for link timestamps in the visualization payload.
const LINK_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Batch analyzer over a validated transaction sequence.
pub struct LedgerAnalyzer {
    detection: DetectionConfig,
}

impl LedgerAnalyzer {
    /// Create an analyzer with the given detector thresholds.
    pub fn new(detection: DetectionConfig) -> Self {
        Self { detection }
    }

    /// Analyze one ledger and assemble the full report.
    ///
    /// The aggregation order (cycles, then smurfing, then shell chains) is
    /// fixed: ring identifiers are assigned in that order and are observable
    /// output.
    pub fn analyze(&self, transactions: &[Transaction]) -> Result<AnalysisReport> {
        let started = Instant::now();

        let graph = TransactionGraph::from_transactions(transactions);
        let safelist =
            MerchantSafelist::classify(transactions, &graph, &self.detection.safelist);
        debug!(
            accounts = graph.num_accounts(),
            safelisted = safelist.len(),
            "Graph built"
        );

        let cycles = CycleDetector::new(self.detection.cycle.clone()).detect(&graph);
        let structuring = StructuringDetector::new(self.detection.structuring.clone())
            .detect(transactions, &safelist);
        let shells = ShellChainDetector::new(self.detection.shell.clone())
            .detect(&graph, &safelist);
        debug!(
            cycles = cycles.len(),
            structuring = structuring.len(),
            shells = shells.len(),
            "Detectors finished"
        );

        let mut aggregator = RingAggregator::new(self.detection.scoring.clone());
        for candidate in cycles.into_iter().chain(structuring).chain(shells) {
            aggregator.register(candidate);
        }
        let (fraud_rings, suspicious_accounts) = aggregator.finish();

        let graph_view = assemble_graph_view(transactions, &graph, &fraud_rings);
        let processing_time_seconds =
            (started.elapsed().as_secs_f64() * 100.0).round() / 100.0;

        let summary = AnalysisSummary {
            total_accounts_analyzed: graph.num_accounts(),
            suspicious_accounts_flagged: suspicious_accounts.len(),
            fraud_rings_detected: fraud_rings.len(),
            processing_time_seconds,
        };

        info!(
            transactions = transactions.len(),
            accounts = summary.total_accounts_analyzed,
            rings = summary.fraud_rings_detected,
            flagged = summary.suspicious_accounts_flagged,
            elapsed_s = processing_time_seconds,
            "Ledger analysis complete"
        );

        Ok(AnalysisReport {
            suspicious_accounts,
            fraud_rings,
            summary,
            graph: graph_view,
        })
    }
}

/// Assemble the node/link view and the account-to-ring mapping for the
/// presentation layer. Consumes only already-computed core outputs.
fn assemble_graph_view(
    transactions: &[Transaction],
    graph: &TransactionGraph,
    fraud_rings: &[FraudRing],
) -> GraphView {
    let links = transactions
        .iter()
        .map(|tx| GraphLink {
            source: tx.sender_id.clone(),
            target: tx.receiver_id.clone(),
            timestamp: tx.timestamp.format(LINK_TIMESTAMP_FORMAT).to_string(),
        })
        .collect();

    let mut account_ring_map: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for ring in fraud_rings {
        for member in &ring.member_accounts {
            account_ring_map
                .entry(member.clone())
                .or_default()
                .push(ring.ring_id.clone());
        }
    }

    GraphView {
        nodes: graph.accounts().to_vec(),
        links,
        account_ring_map,
    }
}
