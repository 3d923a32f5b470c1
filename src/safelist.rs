//! Merchant safelist classification.
//!
//! High-volume legitimate hubs (merchants, payroll processors) would
//! otherwise dominate the fan-in/fan-out and shell-chain matches. An account
//! is safelisted when it is busy (total degree above threshold), persistent
//! (active on enough distinct days), and balanced (incoming and outgoing
//! counts of the same order). The safelist is computed once per analysis from
//! the full ledger and is immutable for the rest of the run.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use crate::config::SafelistConfig;
use crate::graph::TransactionGraph;
use crate::types::Transaction;

/// Accounts excluded as endpoints from structuring and shell-chain matches.
///
/// Cycles are never suppressed: a merchant inside a circular flow is still
/// reported.
#[derive(Debug, Clone, Default)]
pub struct MerchantSafelist {
    members: HashSet<String>,
}

impl MerchantSafelist {
    /// Classify every account of the ledger against the safelist rule.
    pub fn classify(
        transactions: &[Transaction],
        graph: &TransactionGraph,
        config: &SafelistConfig,
    ) -> Self {
        // Distinct calendar days on which each account was active in either
        // role. Sender-days and receiver-days are unioned, not summed.
        let mut active_days: HashMap<&str, HashSet<NaiveDate>> = HashMap::new();
        for tx in transactions {
            let day = tx.timestamp.date_naive();
            active_days
                .entry(tx.sender_id.as_str())
                .or_default()
                .insert(day);
            active_days
                .entry(tx.receiver_id.as_str())
                .or_default()
                .insert(day);
        }

        let mut members = HashSet::new();
        for account in graph.accounts() {
            let degree = graph.total_degree(account);
            let days = active_days
                .get(account.as_str())
                .map(HashSet::len)
                .unwrap_or(0);
            let in_count = graph.in_degree(account);
            let out_count = graph.out_degree(account);
            let ratio = (in_count as f64 + 1.0) / (out_count as f64 + 1.0);

            if degree > config.min_total_degree
                && days > config.min_active_days
                && ratio >= config.min_flow_ratio
                && ratio <= config.max_flow_ratio
            {
                members.insert(account.clone());
            }
        }

        Self { members }
    }

    /// Whether an account is a safelisted hub.
    pub fn contains(&self, account: &str) -> bool {
        self.members.contains(account)
    }

    /// Number of safelisted accounts.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the safelist is empty.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    // One balanced hub: 30 in, 30 out, spread over 10 days.
    fn hub_ledger() -> Vec<Transaction> {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let mut ledger = Vec::new();
        for i in 0..30u32 {
            let ts = base + Duration::days(i as i64 % 10);
            ledger.push(Transaction::new(
                format!("in_{i:03}"),
                format!("cust_{i:03}"),
                "merchant",
                40.0,
                ts,
            ));
            ledger.push(Transaction::new(
                format!("out_{i:03}"),
                "merchant",
                format!("supplier_{i:03}"),
                35.0,
                ts,
            ));
        }
        ledger
    }

    #[test]
    fn test_balanced_hub_qualifies() {
        let ledger = hub_ledger();
        let graph = TransactionGraph::from_transactions(&ledger);
        let safelist =
            MerchantSafelist::classify(&ledger, &graph, &SafelistConfig::default());

        assert!(safelist.contains("merchant"));
        assert!(!safelist.contains("cust_000"));
        assert_eq!(safelist.len(), 1);
    }

    #[test]
    fn test_low_degree_account_not_safelisted() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let ledger = vec![Transaction::new("tx_001", "a", "b", 10.0, ts)];
        let graph = TransactionGraph::from_transactions(&ledger);
        let safelist =
            MerchantSafelist::classify(&ledger, &graph, &SafelistConfig::default());

        assert!(safelist.is_empty());
    }

    #[test]
    fn test_busy_but_burst_account_fails_day_threshold() {
        // 60 transactions, balanced flow, but all on a single day.
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let mut ledger = Vec::new();
        for i in 0..30u32 {
            ledger.push(Transaction::new(
                format!("in_{i:03}"),
                format!("s_{i:03}"),
                "burst",
                10.0,
                ts,
            ));
            ledger.push(Transaction::new(
                format!("out_{i:03}"),
                "burst",
                format!("r_{i:03}"),
                10.0,
                ts,
            ));
        }
        let graph = TransactionGraph::from_transactions(&ledger);
        let safelist =
            MerchantSafelist::classify(&ledger, &graph, &SafelistConfig::default());

        assert!(!safelist.contains("burst"));
    }

    #[test]
    fn test_one_sided_flow_fails_ratio() {
        // Pure sink: 60 incoming over 10 days, nothing outgoing.
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let ledger: Vec<Transaction> = (0..60u32)
            .map(|i| {
                Transaction::new(
                    format!("tx_{i:03}"),
                    format!("s_{i:03}"),
                    "sink",
                    10.0,
                    base + Duration::days(i as i64 % 10),
                )
            })
            .collect();
        let graph = TransactionGraph::from_transactions(&ledger);
        let safelist =
            MerchantSafelist::classify(&ledger, &graph, &SafelistConfig::default());

        // ratio (60+1)/(0+1) = 61 is far outside [0.3, 3.0]
        assert!(!safelist.contains("sink"));
    }
}
