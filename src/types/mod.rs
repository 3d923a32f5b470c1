//! Type definitions for the fraud ring detector

pub mod report;
pub mod transaction;

pub use report::{
    AnalysisReport, AnalysisSummary, ErrorReport, FraudRing, GraphLink, GraphView, PatternType,
    SuspiciousAccount,
};
pub use transaction::Transaction;
