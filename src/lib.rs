//! Fraud Ring Detector Library
//!
//! Batch detection of structural fraud patterns in money-transfer ledgers:
//! circular fund flows, fan-in/fan-out structuring, and shell relay chains,
//! merged into per-account suspicion scores and a ring catalog.

pub mod analyzer;
pub mod config;
pub mod consumer;
pub mod detectors;
pub mod error;
pub mod graph;
pub mod ingest;
pub mod metrics;
pub mod producer;
pub mod safelist;
pub mod scoring;
pub mod types;

pub use analyzer::LedgerAnalyzer;
pub use config::AppConfig;
pub use consumer::AnalysisConsumer;
pub use error::AnalysisError;
pub use graph::TransactionGraph;
pub use producer::ReportProducer;
pub use safelist::MerchantSafelist;
pub use types::{AnalysisReport, FraudRing, SuspiciousAccount, Transaction};
