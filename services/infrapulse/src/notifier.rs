//! Delivery of one consolidated alert email per cycle

use std::fmt;
use std::sync::Arc;

use crate::alert::{AlertBatch, ALERT_SUBJECT};
use crate::config::SmtpConfig;
use crate::io::{MailMessage, MailTransport};

/// What happened to a cycle's alert batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The cycle produced no alerts
    NothingToSend,
    /// No SMTP host is configured; alerting is disabled
    SkippedNoSmtp,
    /// SMTP is configured but no recipient address is set
    SkippedNoRecipients,
    /// One email went out to these recipients
    Sent { recipients: Vec<String> },
    /// The transport reported an error
    Failed(String),
}

impl DeliveryOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, DeliveryOutcome::Sent { .. })
    }
}

/// Split a comma-separated recipient field into trimmed, non-empty addresses
pub fn parse_recipients(field: &str) -> Vec<String> {
    field
        .split(',')
        .map(str::trim)
        .filter(|addr| !addr.is_empty())
        .map(str::to_string)
        .collect()
}

/// Sends alert batches through a mail transport
pub struct AlertNotifier {
    smtp: SmtpConfig,
    recipients: Vec<String>,
    transport: Arc<dyn MailTransport>,
}

impl fmt::Debug for AlertNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlertNotifier")
            .field("smtp_host", &self.smtp.host)
            .field("smtp_port", &self.smtp.port)
            .field("recipients", &self.recipients)
            .finish()
    }
}

impl AlertNotifier {
    pub fn new(smtp: SmtpConfig, alert_recipient: &str, transport: Arc<dyn MailTransport>) -> Self {
        let recipients = parse_recipients(alert_recipient);
        tracing::debug!(
            "Created AlertNotifier for {} recipient(s) via '{}'",
            recipients.len(),
            smtp.host
        );
        Self {
            smtp,
            recipients,
            transport,
        }
    }

    pub fn recipients(&self) -> &[String] {
        &self.recipients
    }

    /// Send the batch as one email. Never fails; problems are logged and
    /// reported through the returned outcome.
    pub async fn deliver(&self, batch: &AlertBatch) -> DeliveryOutcome {
        if batch.is_empty() {
            return DeliveryOutcome::NothingToSend;
        }

        if !self.smtp.is_enabled() {
            tracing::info!(
                "SMTP configuration not found, skipping email for {} alert(s)",
                batch.len()
            );
            return DeliveryOutcome::SkippedNoSmtp;
        }

        if self.recipients.is_empty() {
            tracing::warn!("Email alert not sent: alert_recipient is not set");
            return DeliveryOutcome::SkippedNoRecipients;
        }

        let message = MailMessage {
            from: self.smtp.username.clone(),
            to: self.recipients.clone(),
            subject: ALERT_SUBJECT.to_string(),
            body: batch.body(),
        };

        tracing::info!(
            "Sending {} failure alert(s) to {}",
            batch.len(),
            self.recipients.join(", ")
        );

        match self.transport.send(&message).await {
            Ok(()) => {
                tracing::info!("Email alert sent successfully");
                DeliveryOutcome::Sent {
                    recipients: self.recipients.clone(),
                }
            }
            Err(e) => {
                tracing::error!("Email alert failed to send: {}", e);
                DeliveryOutcome::Failed(e.to_string())
            }
        }
    }
}
