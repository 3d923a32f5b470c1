//! Directed transaction graph construction.
//!
//! Builds the adjacency structure the detectors traverse. Multi-edges are
//! preserved: each transaction contributes one adjacency entry, so an account
//! pair transacting five times appears five times. Amounts and timestamps are
//! not retained here; the structuring detector reads them from the ledger
//! directly.

use std::collections::HashMap;

use crate::types::Transaction;

/// Directed multigraph over account identifiers, with degree tables.
#[derive(Debug, Clone, Default)]
pub struct TransactionGraph {
    /// sender -> receivers, one entry per transaction
    adjacency: HashMap<String, Vec<String>>,
    in_degree: HashMap<String, usize>,
    out_degree: HashMap<String, usize>,
    /// Senders in first-seen ledger order. Detector DFS starts follow this
    /// order so ring discovery order is reproducible across runs.
    senders: Vec<String>,
    /// All accounts (senders and receivers) in first-seen ledger order.
    accounts: Vec<String>,
}

impl TransactionGraph {
    /// Build the graph from a validated transaction sequence.
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let mut graph = Self::default();

        for tx in transactions {
            let out = graph.out_degree.entry(tx.sender_id.clone()).or_insert(0);
            if *out == 0 && !graph.in_degree.contains_key(&tx.sender_id) {
                graph.accounts.push(tx.sender_id.clone());
            }
            *out += 1;

            let entry = graph.adjacency.entry(tx.sender_id.clone()).or_default();
            if entry.is_empty() {
                graph.senders.push(tx.sender_id.clone());
            }
            entry.push(tx.receiver_id.clone());

            let seen_receiver = graph.in_degree.contains_key(&tx.receiver_id)
                || graph.out_degree.contains_key(&tx.receiver_id);
            if !seen_receiver {
                graph.accounts.push(tx.receiver_id.clone());
            }
            *graph.in_degree.entry(tx.receiver_id.clone()).or_insert(0) += 1;
        }

        graph
    }

    /// Receivers reachable from `account`, one entry per transaction.
    pub fn neighbors(&self, account: &str) -> &[String] {
        self.adjacency
            .get(account)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Accounts that sent at least one transaction, in first-seen order.
    pub fn senders(&self) -> &[String] {
        &self.senders
    }

    /// All accounts, in first-seen order.
    pub fn accounts(&self) -> &[String] {
        &self.accounts
    }

    /// Incoming transaction count for an account.
    pub fn in_degree(&self, account: &str) -> usize {
        self.in_degree.get(account).copied().unwrap_or(0)
    }

    /// Outgoing transaction count for an account.
    pub fn out_degree(&self, account: &str) -> usize {
        self.out_degree.get(account).copied().unwrap_or(0)
    }

    /// Total transaction count (in + out) for an account.
    pub fn total_degree(&self, account: &str) -> usize {
        self.in_degree(account) + self.out_degree(account)
    }

    /// Number of distinct accounts in the ledger.
    pub fn num_accounts(&self) -> usize {
        self.accounts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn tx(id: u32, sender: &str, receiver: &str) -> Transaction {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        Transaction::new(format!("tx_{id:03}"), sender, receiver, 100.0, ts)
    }

    #[test]
    fn test_degrees_and_adjacency() {
        let ledger = vec![tx(1, "a", "b"), tx(2, "a", "c"), tx(3, "b", "c")];
        let graph = TransactionGraph::from_transactions(&ledger);

        assert_eq!(graph.out_degree("a"), 2);
        assert_eq!(graph.in_degree("c"), 2);
        assert_eq!(graph.total_degree("b"), 2);
        assert_eq!(graph.neighbors("a"), ["b", "c"]);
        assert_eq!(graph.num_accounts(), 3);
    }

    #[test]
    fn test_multi_edges_preserved() {
        let ledger = vec![tx(1, "a", "b"), tx(2, "a", "b"), tx(3, "a", "b")];
        let graph = TransactionGraph::from_transactions(&ledger);

        assert_eq!(graph.neighbors("a"), ["b", "b", "b"]);
        assert_eq!(graph.out_degree("a"), 3);
        assert_eq!(graph.in_degree("b"), 3);
    }

    #[test]
    fn test_first_seen_order() {
        let ledger = vec![tx(1, "z", "m"), tx(2, "a", "z"), tx(3, "m", "q")];
        let graph = TransactionGraph::from_transactions(&ledger);

        assert_eq!(graph.senders(), ["z", "a", "m"]);
        assert_eq!(graph.accounts(), ["z", "m", "a", "q"]);
    }

    #[test]
    fn test_receiver_only_account() {
        let ledger = vec![tx(1, "a", "sink")];
        let graph = TransactionGraph::from_transactions(&ledger);

        assert!(graph.neighbors("sink").is_empty());
        assert_eq!(graph.out_degree("sink"), 0);
        assert_eq!(graph.in_degree("sink"), 1);
    }
}
