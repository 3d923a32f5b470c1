//! Error types for ledger analysis.

use thiserror::Error;

/// Result type alias using `AnalysisError`.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors that can occur while analyzing a ledger.
///
/// Both variants are terminal for the request: no partial detector results
/// are emitted and no retry is attempted. The transport layer serializes the
/// `Display` form into the `{"error": ...}` payload.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A required field is absent from the submitted ledger. Detected before
    /// any graph work begins.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// The request payload could not be decoded as a ledger at all.
    #[error("Invalid ledger payload: {0}")]
    InvalidPayload(String),

    /// Any other failure during graph build, detection, or aggregation.
    #[error("Processing error: {0}")]
    Processing(String),
}

impl AnalysisError {
    /// Create a missing-column schema error.
    #[must_use]
    pub fn missing_column(column: impl Into<String>) -> Self {
        AnalysisError::MissingColumn(column.into())
    }

    /// Create a processing error.
    #[must_use]
    pub fn processing(msg: impl Into<String>) -> Self {
        AnalysisError::Processing(msg.into())
    }

    /// Returns true if this is a schema error (reported before analysis).
    #[must_use]
    pub fn is_schema_error(&self) -> bool {
        matches!(self, AnalysisError::MissingColumn(_))
    }
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        AnalysisError::InvalidPayload(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_column_display() {
        let err = AnalysisError::missing_column("receiver_id");
        assert_eq!(err.to_string(), "Missing required column: receiver_id");
        assert!(err.is_schema_error());
    }

    #[test]
    fn test_processing_display() {
        let err = AnalysisError::processing("degree table overflow");
        assert_eq!(err.to_string(), "Processing error: degree table overflow");
        assert!(!err.is_schema_error());
    }
}
