//! Ledger ingestion and schema validation.
//!
//! Analysis requests carry the ledger as a JSON array of records. Before any
//! graph work, every record is checked for the five required fields; the
//! first absent field aborts the whole request with a schema error naming the
//! column. Records that pass the schema check but carry an unparsable
//! timestamp are dropped silently, mirroring upstream exports that emit
//! blank or malformed dates for voided transfers.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

use crate::error::{AnalysisError, Result};
use crate::types::Transaction;

/// Fields every ledger record must carry.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    "transaction_id",
    "sender_id",
    "receiver_id",
    "amount",
    "timestamp",
];

/// Decode and validate a raw request payload into a transaction sequence.
pub fn parse_ledger(payload: &[u8]) -> Result<Vec<Transaction>> {
    let rows: Vec<Value> = serde_json::from_slice(payload)?;

    for column in REQUIRED_COLUMNS {
        if !rows.iter().all(|row| has_column(row, column)) {
            return Err(AnalysisError::missing_column(column));
        }
    }

    let mut transactions = Vec::with_capacity(rows.len());
    for row in &rows {
        let Some(timestamp) = get(row, "timestamp").and_then(parse_timestamp) else {
            continue;
        };
        let (Some(transaction_id), Some(sender_id), Some(receiver_id)) = (
            get(row, "transaction_id").and_then(field_as_string),
            get(row, "sender_id").and_then(field_as_string),
            get(row, "receiver_id").and_then(field_as_string),
        ) else {
            continue;
        };
        // Amount is carried through to the report layer only; a non-numeric
        // value does not invalidate the row.
        let amount = get(row, "amount").and_then(field_as_f64).unwrap_or(0.0);

        transactions.push(Transaction {
            transaction_id,
            sender_id,
            receiver_id,
            amount,
            timestamp,
        });
    }

    Ok(transactions)
}

/// Field lookup accepting both the canonical and the upper-case header name.
fn get<'a>(row: &'a Value, column: &str) -> Option<&'a Value> {
    row.get(column)
        .or_else(|| row.get(column.to_uppercase()))
}

fn has_column(row: &Value, column: &str) -> bool {
    get(row, column).is_some()
}

/// Account and transaction identifiers may arrive as strings or numbers.
fn field_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn field_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Accept RFC 3339 or the `YYYY-MM-DD HH:MM:SS` form common in CSV exports.
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let raw = value.as_str()?;
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_ledger_parsed() {
        let payload = br#"[
            {"transaction_id": "tx_1", "sender_id": "a", "receiver_id": "b",
             "amount": 120.5, "timestamp": "2024-03-01 10:00:00"},
            {"transaction_id": "tx_2", "sender_id": 17, "receiver_id": "c",
             "amount": 80.0, "timestamp": "2024-03-01T11:00:00Z"}
        ]"#;

        let ledger = parse_ledger(payload).unwrap();
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger[0].sender_id, "a");
        assert_eq!(ledger[1].sender_id, "17");
        assert_eq!(ledger[0].timestamp.to_rfc3339(), "2024-03-01T10:00:00+00:00");
    }

    #[test]
    fn test_missing_receiver_column() {
        let payload = br#"[
            {"transaction_id": "tx_1", "sender_id": "a",
             "amount": 120.5, "timestamp": "2024-03-01 10:00:00"}
        ]"#;

        let err = parse_ledger(payload).unwrap_err();
        assert_eq!(err.to_string(), "Missing required column: receiver_id");
    }

    #[test]
    fn test_column_missing_in_one_row() {
        let payload = br#"[
            {"transaction_id": "tx_1", "sender_id": "a", "receiver_id": "b",
             "amount": 1.0, "timestamp": "2024-03-01 10:00:00"},
            {"transaction_id": "tx_2", "sender_id": "a",
             "amount": 1.0, "timestamp": "2024-03-01 10:00:00"}
        ]"#;

        let err = parse_ledger(payload).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingColumn(ref c) if c == "receiver_id"));
    }

    #[test]
    fn test_unparsable_timestamp_row_dropped() {
        let payload = br#"[
            {"transaction_id": "tx_1", "sender_id": "a", "receiver_id": "b",
             "amount": 1.0, "timestamp": "not a date"},
            {"transaction_id": "tx_2", "sender_id": "c", "receiver_id": "d",
             "amount": 1.0, "timestamp": "2024-03-01 10:00:00"}
        ]"#;

        let ledger = parse_ledger(payload).unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].transaction_id, "tx_2");
    }

    #[test]
    fn test_uppercase_headers_accepted() {
        let payload = br#"[
            {"TRANSACTION_ID": "tx_1", "SENDER_ID": "a", "RECEIVER_ID": "b",
             "AMOUNT": 5.0, "TIMESTAMP": "2024-03-01 10:00:00"}
        ]"#;

        let ledger = parse_ledger(payload).unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].receiver_id, "b");
    }

    #[test]
    fn test_empty_ledger_is_valid() {
        let ledger = parse_ledger(b"[]").unwrap();
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_non_array_payload_rejected() {
        let err = parse_ledger(b"{\"rows\": []}").unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidPayload(_)));
    }
}
