//! Fraud Ring Detector - Main Entry Point
//!
//! Consumes ledger analysis requests from NATS, runs graph-based ring
//! detection, and publishes the resulting reports. Requests are processed in
//! parallel up to the configured worker count; each analysis is a
//! self-contained batch with no state shared across requests.

use anyhow::Result;
use fraud_ring_detector::{
    analyzer::LedgerAnalyzer,
    config::AppConfig,
    consumer::AnalysisConsumer,
    ingest,
    metrics::{MetricsReporter, PipelineMetrics},
    producer::ReportProducer,
};
use futures::StreamExt;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first so the log level can come from it
    let config = AppConfig::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(
                format!("fraud_ring_detector={}", config.logging.level).parse()?,
            ),
        )
        .init();

    info!("Starting Fraud Ring Detector");
    info!(
        safelist_min_degree = config.detection.safelist.min_total_degree,
        cycle_max_path = config.detection.cycle.max_path_len,
        structuring_bucket_secs = config.detection.structuring.bucket_secs,
        shell_degree_band = format!(
            "{}..={}",
            config.detection.shell.min_shell_degree, config.detection.shell.max_shell_degree
        ),
        "Detection thresholds loaded"
    );

    // Initialize metrics
    let metrics = Arc::new(PipelineMetrics::new());

    // Initialize the analyzer
    let analyzer = Arc::new(LedgerAnalyzer::new(config.detection.clone()));

    // Connect to NATS
    let client = async_nats::connect(&config.nats.url).await?;
    info!("Connected to NATS at {}", config.nats.url);

    // Initialize consumer and producer
    let consumer = AnalysisConsumer::new(
        client.clone(),
        &config.nats.request_subject,
        &config.nats.queue_group,
    );
    let producer = Arc::new(ReportProducer::new(client.clone(), &config.nats.report_subject));

    let num_workers = config.pipeline.workers;
    info!(
        workers = num_workers,
        request_subject = %config.nats.request_subject,
        report_subject = %config.nats.report_subject,
        "Starting analysis loop"
    );

    // Semaphore to limit concurrent analyses
    let semaphore = Arc::new(Semaphore::new(num_workers));

    // Start the metrics reporter
    let metrics_clone = metrics.clone();
    let interval = config.pipeline.metrics_interval_secs;
    tokio::spawn(async move {
        let reporter = MetricsReporter::new(metrics_clone, interval);
        reporter.start().await;
    });

    // Process analysis requests in parallel
    let mut subscription = consumer.subscribe().await?;

    while let Some(message) = subscription.next().await {
        // Acquire permit (limits concurrent tasks)
        let permit = semaphore.clone().acquire_owned().await?;

        let analyzer = analyzer.clone();
        let producer = producer.clone();
        let metrics = metrics.clone();

        // Spawn a task to process this request
        tokio::spawn(async move {
            let analysis_id = Uuid::new_v4();
            let started = Instant::now();
            let reply = message.reply.clone();

            let outcome = ingest::parse_ledger(&message.payload)
                .and_then(|ledger| analyzer.analyze(&ledger));

            match outcome {
                Ok(report) => {
                    metrics.record_analysis(started.elapsed(), &report);
                    info!(
                        analysis_id = %analysis_id,
                        rings = report.summary.fraud_rings_detected,
                        flagged = report.summary.suspicious_accounts_flagged,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Analysis complete"
                    );
                    if let Err(e) = producer.publish_report(&report, reply).await {
                        error!(analysis_id = %analysis_id, error = %e, "Failed to publish report");
                    }
                }
                Err(e) => {
                    metrics.record_failure();
                    warn!(analysis_id = %analysis_id, error = %e, "Analysis failed");
                    if let Err(e) = producer.publish_error(&e.to_string(), reply).await {
                        error!(analysis_id = %analysis_id, error = %e, "Failed to publish error");
                    }
                }
            }

            // Release permit when done
            drop(permit);
        });
    }

    info!("Request stream closed, shutting down");
    metrics.print_summary();

    Ok(())
}
