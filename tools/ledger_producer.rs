//! Synthetic Ledger Producer
//!
//! Generates a transfer ledger with planted fraud rings and publishes it as
//! an analysis request, then prints the returned report summary. Falls back
//! to running the analyzer in-process when no NATS server is reachable.

use chrono::{DateTime, Duration, TimeZone, Utc};
use fraud_ring_detector::analyzer::LedgerAnalyzer;
use fraud_ring_detector::config::DetectionConfig;
use fraud_ring_detector::types::Transaction;
use rand::Rng;
use tracing::{info, warn};

/// Ledger generator with deterministic counters and random background noise
struct LedgerGenerator {
    rng: rand::rngs::ThreadRng,
    counter: u64,
    base: DateTime<Utc>,
}

impl LedgerGenerator {
    fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
            counter: 0,
            base: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
        }
    }

    fn next_tx(
        &mut self,
        sender: impl Into<String>,
        receiver: impl Into<String>,
        amount: f64,
        offset_minutes: i64,
    ) -> Transaction {
        self.counter += 1;
        Transaction::new(
            format!("tx_{:06}", self.counter),
            sender,
            receiver,
            amount,
            self.base + Duration::minutes(offset_minutes),
        )
    }

    /// Background transfers between ordinary accounts, spread over a month
    fn background(&mut self, accounts: usize, count: usize) -> Vec<Transaction> {
        (0..count)
            .map(|_| {
                let sender = format!("acct_{:04}", self.rng.gen_range(0..accounts));
                let mut receiver = format!("acct_{:04}", self.rng.gen_range(0..accounts));
                while receiver == sender {
                    receiver = format!("acct_{:04}", self.rng.gen_range(0..accounts));
                }
                let amount = self.rng.gen_range(10.0..800.0);
                let offset = self.rng.gen_range(0..43_200);
                self.next_tx(sender, receiver, amount, offset)
            })
            .collect()
    }

    /// A circular flow: ring_a -> ring_b -> ring_c -> ring_a
    fn plant_cycle(&mut self) -> Vec<Transaction> {
        vec![
            self.next_tx("ring_a", "ring_b", 9_500.0, 10),
            self.next_tx("ring_b", "ring_c", 9_200.0, 25),
            self.next_tx("ring_c", "ring_a", 8_900.0, 40),
        ]
    }

    /// A fan-in burst: ten mules paying one collector within an hour
    fn plant_fan_in(&mut self) -> Vec<Transaction> {
        (0..10)
            .map(|i| {
                let amount = self.rng.gen_range(850.0..990.0);
                self.next_tx(format!("mule_{i:02}"), "collector", amount, 60 + i)
            })
            .collect()
    }

    /// A relay chain through two single-purpose pass-through accounts
    fn plant_shell_chain(&mut self) -> Vec<Transaction> {
        // Keep the shells far from the background window so their degree
        // stays in the shell band.
        vec![
            self.next_tx("origin", "pass_1", 15_000.0, 50_000),
            self.next_tx("pass_1", "pass_2", 14_800.0, 50_030),
            self.next_tx("pass_2", "destination", 14_500.0, 50_060),
        ]
    }

    fn build(&mut self, accounts: usize, background_count: usize) -> Vec<Transaction> {
        let mut ledger = self.background(accounts, background_count);
        ledger.extend(self.plant_cycle());
        ledger.extend(self.plant_fan_in());
        ledger.extend(self.plant_shell_chain());
        ledger
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ledger_producer=info".parse()?),
        )
        .init();

    info!("Starting Synthetic Ledger Producer");

    let args: Vec<String> = std::env::args().collect();
    let nats_url = args
        .get(1)
        .map(|s| s.as_str())
        .unwrap_or("nats://localhost:4222");
    let subject = args.get(2).map(|s| s.as_str()).unwrap_or("ledger.analyze");
    let accounts: usize = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(200);
    let background: usize = args.get(4).and_then(|s| s.parse().ok()).unwrap_or(500);

    let mut generator = LedgerGenerator::new();
    let ledger = generator.build(accounts, background);
    info!(
        transactions = ledger.len(),
        accounts = accounts,
        "Ledger generated with planted cycle, fan-in burst, and shell chain"
    );

    let payload = serde_json::to_vec(&ledger)?;

    let client = match async_nats::connect(nats_url).await {
        Ok(c) => {
            info!(nats_url = %nats_url, "Connected to NATS");
            c
        }
        Err(e) => {
            warn!(error = %e, "Failed to connect to NATS. Analyzing in-process instead.");
            return run_in_process(&ledger);
        }
    };

    info!(subject = %subject, bytes = payload.len(), "Publishing analysis request");
    let response = client.request(subject.to_string(), payload.into()).await?;

    let report: serde_json::Value = serde_json::from_slice(&response.payload)?;
    if let Some(error) = report.get("error") {
        warn!(error = %error, "Analysis returned an error");
    } else {
        info!(
            rings = %report["summary"]["fraud_rings_detected"],
            flagged = %report["summary"]["suspicious_accounts_flagged"],
            elapsed_s = %report["summary"]["processing_time_seconds"],
            "Report received"
        );
        if let Some(rings) = report["fraud_rings"].as_array() {
            for ring in rings {
                info!(
                    ring_id = %ring["ring_id"],
                    pattern = %ring["pattern_type"],
                    members = %ring["member_count"],
                    "Detected ring"
                );
            }
        }
    }

    Ok(())
}

/// Dry-run path: run the analyzer directly on the generated ledger.
fn run_in_process(ledger: &[Transaction]) -> anyhow::Result<()> {
    let analyzer = LedgerAnalyzer::new(DetectionConfig::default());
    let report = analyzer.analyze(ledger)?;

    info!(
        rings = report.summary.fraud_rings_detected,
        flagged = report.summary.suspicious_accounts_flagged,
        "In-process analysis finished"
    );
    for ring in &report.fraud_rings {
        info!(
            ring_id = %ring.ring_id,
            pattern = %ring.pattern_type,
            members = ring.member_count,
            "Detected ring"
        );
    }
    Ok(())
}
