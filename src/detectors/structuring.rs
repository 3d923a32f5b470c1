//! Structuring ("smurfing") detection.
//!
//! Splitting a large flow into many small transfers to or from a hub account
//! shows up as a fan-in or fan-out burst inside a short time window. The
//! ledger is partitioned into fixed, non-overlapping buckets by integer
//! division of the epoch-second timestamp; within each sufficiently busy
//! bucket, hubs with enough distinct counterparties produce a ring of the
//! counterparties plus the hub. Safelisted hubs are ignored.

use std::collections::{BTreeMap, HashSet};

use crate::config::StructuringConfig;
use crate::detectors::{canonical_key, RingCandidate};
use crate::safelist::MerchantSafelist;
use crate::types::{PatternType, Transaction};

/// Detector for time-windowed fan-in/fan-out bursts.
#[derive(Debug, Clone)]
pub struct StructuringDetector {
    config: StructuringConfig,
}

impl StructuringDetector {
    /// Create a detector with the given thresholds.
    pub fn new(config: StructuringConfig) -> Self {
        Self { config }
    }

    /// Find fan-in and fan-out rings across all time buckets.
    ///
    /// Dedup is global to the run, not per bucket: the same member set
    /// surfacing in two buckets (or as both a fan-in and a fan-out) is
    /// reported once, first occurrence wins.
    pub fn detect(
        &self,
        transactions: &[Transaction],
        safelist: &MerchantSafelist,
    ) -> Vec<RingCandidate> {
        // Ascending bucket order keeps discovery order reproducible.
        let mut buckets: BTreeMap<i64, Vec<&Transaction>> = BTreeMap::new();
        for tx in transactions {
            let bucket = tx.timestamp.timestamp().div_euclid(self.config.bucket_secs);
            buckets.entry(bucket).or_default().push(tx);
        }

        let mut rings = Vec::new();
        let mut seen: HashSet<Vec<String>> = HashSet::new();

        for group in buckets.values() {
            if group.len() < self.config.min_bucket_size {
                continue;
            }

            // hub -> distinct counterparties in first-appearance order
            let mut fan_in: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
            let mut fan_out: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
            for tx in group {
                let senders = fan_in.entry(tx.receiver_id.as_str()).or_default();
                if !senders.contains(&tx.sender_id.as_str()) {
                    senders.push(tx.sender_id.as_str());
                }
                let receivers = fan_out.entry(tx.sender_id.as_str()).or_default();
                if !receivers.contains(&tx.receiver_id.as_str()) {
                    receivers.push(tx.receiver_id.as_str());
                }
            }

            for (receiver, senders) in &fan_in {
                if senders.len() >= self.config.min_fan_count && !safelist.contains(receiver) {
                    Self::register(PatternType::Smurfing, senders, receiver, &mut seen, &mut rings);
                }
            }

            for (sender, receivers) in &fan_out {
                if receivers.len() >= self.config.min_fan_count && !safelist.contains(sender) {
                    Self::register(PatternType::Smurfing, receivers, sender, &mut seen, &mut rings);
                }
            }
        }

        rings
    }

    /// Register `counterparties + hub` as a ring unless the member set was
    /// already seen.
    fn register(
        pattern: PatternType,
        counterparties: &[&str],
        hub: &str,
        seen: &mut HashSet<Vec<String>>,
        rings: &mut Vec<RingCandidate>,
    ) {
        let mut members: Vec<String> =
            counterparties.iter().map(|s| (*s).to_string()).collect();
        members.push(hub.to_string());

        let key = canonical_key(&members);
        if seen.insert(key) {
            rings.push(RingCandidate::new(pattern, members));
        }
    }
}
