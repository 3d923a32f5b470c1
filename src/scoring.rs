//! Ring aggregation and account scoring.
//!
//! Merges the candidates of all three detectors into the final ring catalog
//! and the per-account suspicion table. Identifier assignment order is an
//! observable property: candidates must be registered in detector-priority
//! order (cycles, then smurfing, then shell chains), and the counter is owned
//! by the aggregator and never reset within a run.

use std::collections::HashMap;

use crate::config::ScoringConfig;
use crate::detectors::RingCandidate;
use crate::types::{FraudRing, SuspiciousAccount};

/// Accumulates rings and account scores across detectors.
pub struct RingAggregator {
    config: ScoringConfig,
    rings: Vec<FraudRing>,
    accounts: Vec<SuspiciousAccount>,
    /// account id -> index into `accounts`; insertion order is preserved so
    /// the report lists accounts in first-flagged order
    index: HashMap<String, usize>,
    next_ring: u32,
}

impl RingAggregator {
    /// Create an empty aggregator. Ring numbering starts at 1.
    pub fn new(config: ScoringConfig) -> Self {
        Self {
            config,
            rings: Vec::new(),
            accounts: Vec::new(),
            index: HashMap::new(),
            next_ring: 1,
        }
    }

    /// Register one candidate ring: assign the next identifier, record the
    /// ring, and update every member's suspicion state.
    pub fn register(&mut self, candidate: RingCandidate) {
        let ring_id = format!("RING_{:03}", self.next_ring);
        self.next_ring += 1;

        let base_weight = self.config.base_weight(candidate.pattern);
        let size_bonus =
            (candidate.members.len() as f64 * 2.0).min(self.config.size_bonus_cap);

        self.rings.push(FraudRing {
            ring_id: ring_id.clone(),
            pattern_type: candidate.pattern,
            member_count: candidate.members.len(),
            risk_score: self.config.risk_score(candidate.pattern),
            member_accounts: candidate.members.clone(),
        });

        for account in candidate.members {
            match self.index.get(&account) {
                Some(&i) => {
                    let entry = &mut self.accounts[i];
                    entry.detected_patterns.push(candidate.pattern);
                    entry.ring_id.push(ring_id.clone());
                    entry.ring_count += 1;
                    entry.suspicion_score += base_weight * self.config.repeat_factor;
                }
                None => {
                    self.index.insert(account.clone(), self.accounts.len());
                    self.accounts.push(SuspiciousAccount {
                        account_id: account,
                        suspicion_score: base_weight + size_bonus,
                        detected_patterns: vec![candidate.pattern],
                        ring_id: vec![ring_id.clone()],
                        ring_count: 1,
                    });
                }
            }
        }
    }

    /// Finalize: round every score to 2 decimals and clamp to the cap, then
    /// hand back the ring catalog and the account table.
    pub fn finish(mut self) -> (Vec<FraudRing>, Vec<SuspiciousAccount>) {
        for account in &mut self.accounts {
            let rounded = (account.suspicion_score * 100.0).round() / 100.0;
            account.suspicion_score = rounded.min(self.config.score_cap);
        }
        (self.rings, self.accounts)
    }

    /// Number of rings registered so far.
    pub fn ring_count(&self) -> usize {
        self.rings.len()
    }
}
