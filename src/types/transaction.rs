//! Transaction data structures for ledger analysis

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single money transfer between two accounts.
///
/// Transactions are immutable once ingested. Rows with unparsable timestamps
/// are dropped during ingestion and never reach the detectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction identifier
    #[serde(alias = "TRANSACTION_ID")]
    pub transaction_id: String,

    /// Account that sent the funds
    #[serde(alias = "SENDER_ID")]
    pub sender_id: String,

    /// Account that received the funds
    #[serde(alias = "RECEIVER_ID")]
    pub receiver_id: String,

    /// Transferred amount
    #[serde(alias = "AMOUNT")]
    pub amount: f64,

    /// Transfer timestamp
    #[serde(alias = "TIMESTAMP")]
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    /// Create a new transaction.
    pub fn new(
        transaction_id: impl Into<String>,
        sender_id: impl Into<String>,
        receiver_id: impl Into<String>,
        amount: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            sender_id: sender_id.into(),
            receiver_id: receiver_id.into(),
            amount,
            timestamp,
        }
    }
}
