//! Short directed cycle detection.
//!
//! Finds money that returns to its origin within a few hops. The search is
//! an iterative depth-first traversal with an explicit work stack, started
//! from every sender in the ledger. Paths are capped at
//! `CycleConfig::max_path_len` nodes, so longer cycles are never found; this
//! bound is deliberate and keeps the worst-case (exponential in branching
//! factor) traversal tractable on real ledgers.
//!
//! The safelist plays no role here: a merchant inside a circular flow is as
//! suspicious as anyone else in it.

use std::collections::HashSet;

use crate::config::CycleConfig;
use crate::detectors::{canonical_key, RingCandidate};
use crate::graph::TransactionGraph;
use crate::types::PatternType;

/// Detector for short directed cycles.
#[derive(Debug, Clone)]
pub struct CycleDetector {
    config: CycleConfig,
}

impl CycleDetector {
    /// Create a detector with the given bounds.
    pub fn new(config: CycleConfig) -> Self {
        Self { config }
    }

    /// Enumerate simple cycles of length `min_cycle_len..=max_path_len`.
    ///
    /// A cycle is registered once per member set: visiting order is
    /// discarded by the sorted-member dedup key, so the same loop reached
    /// from different start nodes is reported a single time.
    pub fn detect(&self, graph: &TransactionGraph) -> Vec<RingCandidate> {
        let mut rings = Vec::new();
        let mut seen: HashSet<Vec<String>> = HashSet::new();

        for start in graph.senders() {
            let mut stack: Vec<(String, Vec<String>)> =
                vec![(start.clone(), vec![start.clone()])];

            while let Some((current, path)) = stack.pop() {
                if path.len() > self.config.max_path_len {
                    continue;
                }

                for neighbor in graph.neighbors(&current) {
                    if neighbor == start && path.len() >= self.config.min_cycle_len {
                        let key = canonical_key(&path);
                        if seen.insert(key) {
                            rings.push(RingCandidate::new(PatternType::Cycle, path.clone()));
                        }
                    } else if !path.iter().any(|node| node == neighbor) {
                        let mut extended = path.clone();
                        extended.push(neighbor.clone());
                        stack.push((neighbor.clone(), extended));
                    }
                }
            }
        }

        rings
    }
}
