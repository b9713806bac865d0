//! Checker trait and result types

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local};

use crate::io::NetworkProbe;
use crate::target::CheckUnit;

/// Echo requests sent per ping unit
pub const PING_ATTEMPTS: u16 = 3;

/// Overall bound on one ping unit
pub const PING_TIMEOUT: Duration = Duration::from_secs(2);

/// Connect timeout for one port unit
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Observed status of a check unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Up,
    Down,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Up => write!(f, "UP"),
            Status::Down => write!(f, "DOWN"),
        }
    }
}

/// Result of checking one unit in one cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub unit: CheckUnit,
    pub status: Status,
    pub error: Option<String>,
    pub checked_at: DateTime<Local>,
}

impl CheckResult {
    pub fn up(unit: CheckUnit) -> Self {
        Self {
            unit,
            status: Status::Up,
            error: None,
            checked_at: Local::now(),
        }
    }

    pub fn down(unit: CheckUnit, error: Option<String>) -> Self {
        Self {
            unit,
            status: Status::Down,
            error,
            checked_at: Local::now(),
        }
    }

    pub fn is_down(&self) -> bool {
        self.status == Status::Down
    }
}

/// Trait for checking a single unit
///
/// Implementations must always return a result and must not block
/// indefinitely. Failures are reported as `Status::Down`, never as errors.
#[async_trait]
pub trait Checker: Send + Sync + fmt::Debug {
    async fn check(&self, unit: CheckUnit) -> CheckResult;
}

/// Checker backed by a [`NetworkProbe`]
pub struct ProbeChecker {
    probe: Arc<dyn NetworkProbe>,
    ping_attempts: u16,
    ping_timeout: Duration,
    connect_timeout: Duration,
}

impl fmt::Debug for ProbeChecker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProbeChecker")
            .field("ping_attempts", &self.ping_attempts)
            .field("ping_timeout", &self.ping_timeout)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl ProbeChecker {
    pub fn new(probe: Arc<dyn NetworkProbe>) -> Self {
        Self {
            probe,
            ping_attempts: PING_ATTEMPTS,
            ping_timeout: PING_TIMEOUT,
            connect_timeout: CONNECT_TIMEOUT,
        }
    }
}

#[async_trait]
impl Checker for ProbeChecker {
    async fn check(&self, unit: CheckUnit) -> CheckResult {
        match unit.port {
            None => {
                match self
                    .probe
                    .ping(&unit.host, self.ping_attempts, self.ping_timeout)
                    .await
                {
                    Ok(summary) if summary.received > 0 => CheckResult::up(unit),
                    Ok(summary) => {
                        tracing::debug!(
                            "No echo replies from {} ({} sent)",
                            unit.host,
                            summary.transmitted
                        );
                        CheckResult::down(unit, summary.last_error)
                    }
                    Err(e) => CheckResult::down(unit, Some(e.to_string())),
                }
            }
            Some(port) => {
                match self
                    .probe
                    .connect(&unit.host, port, self.connect_timeout)
                    .await
                {
                    Ok(()) => CheckResult::up(unit),
                    Err(e) => CheckResult::down(unit, Some(e.to_string())),
                }
            }
        }
    }
}
