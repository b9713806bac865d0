//! Alert text formatting and per-cycle batching

use chrono::{DateTime, TimeZone};

use crate::checker::CheckResult;

/// Subject line of every alert email
pub const ALERT_SUBJECT: &str = "InfraPulse Alert: Service Degradation Detected";

/// Opening line of the alert email body
pub const ALERT_HEADER: &str = "One or more services are down:\n\n";

/// Separator placed between alert blocks
pub const ALERT_SEPARATOR: &str = "\n---------------------------------\n\n";

/// Placeholder used when a check failed without an error description
pub const NO_ERROR_PLACEHOLDER: &str = "No specific error message.";

/// Render one down-transition as a text block
pub fn format_alert<Tz>(result: &CheckResult, detected_at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let unit = &result.unit;
    let time = detected_at.to_rfc2822();
    let error = result.error.as_deref().unwrap_or(NO_ERROR_PLACEHOLDER);

    match unit.port {
        None => format!(
            "Host Down Alert\n\nHost: {} ({})\nTime: {}\nDetails: Ping failed.\nError: {}\n",
            unit.name, unit.host, time, error
        ),
        Some(port) => format!(
            "Service Down Alert\n\nService: {}\nHost: {}\nPort: {}\nTime: {}\nError: {}\n",
            unit.name, unit.host, port, time, error
        ),
    }
}

/// Alert blocks collected during one cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertBatch {
    blocks: Vec<String>,
}

impl AlertBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a batch from transitioned results, stamped with their check time
    pub fn from_transitions(transitions: &[CheckResult]) -> Self {
        Self {
            blocks: transitions
                .iter()
                .map(|r| format_alert(r, &r.checked_at))
                .collect(),
        }
    }

    pub fn push(&mut self, block: String) {
        self.blocks.push(block);
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn blocks(&self) -> &[String] {
        &self.blocks
    }

    /// Email body containing every block in this batch
    pub fn body(&self) -> String {
        format!("{}{}", ALERT_HEADER, self.blocks.join(ALERT_SEPARATOR))
    }
}
