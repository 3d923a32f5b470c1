//! NATS producer for analysis reports

use anyhow::Result;
use async_nats::{Client, Subject};
use tracing::{debug, error};

use crate::types::{AnalysisReport, ErrorReport};

/// Producer for publishing analysis results to NATS.
///
/// Every outcome goes to the report subject; when the request carried a
/// reply subject the same payload is also sent back there. Error payloads
/// replace the entire report, never accompany a partial one.
#[derive(Clone)]
pub struct ReportProducer {
    client: Client,
    subject: String,
}

impl ReportProducer {
    /// Create a new report producer
    pub fn new(client: Client, subject: &str) -> Self {
        Self {
            client,
            subject: subject.to_string(),
        }
    }

    /// Publish a finished analysis report
    pub async fn publish_report(
        &self,
        report: &AnalysisReport,
        reply: Option<Subject>,
    ) -> Result<()> {
        let payload = serde_json::to_vec(report)?;
        self.send(payload, reply).await?;

        debug!(
            rings = report.summary.fraud_rings_detected,
            flagged = report.summary.suspicious_accounts_flagged,
            "Published analysis report"
        );
        Ok(())
    }

    /// Publish an error payload in place of a report
    pub async fn publish_error(&self, message: &str, reply: Option<Subject>) -> Result<()> {
        let payload = serde_json::to_vec(&ErrorReport::new(message))?;
        self.send(payload, reply).await?;

        error!(error = %message, "Published analysis error");
        Ok(())
    }

    async fn send(&self, payload: Vec<u8>, reply: Option<Subject>) -> Result<()> {
        self.client
            .publish(self.subject.clone(), payload.clone().into())
            .await?;
        if let Some(reply) = reply {
            self.client.publish(reply, payload.into()).await?;
        }
        Ok(())
    }

    /// Get the subject name
    pub fn subject(&self) -> &str {
        &self.subject
    }
}

#[cfg(test)]
mod tests {
    // Integration tests would require a running NATS server
}
