//! Per-unit status history and down-transition detection

use std::collections::HashMap;

use crate::checker::{CheckResult, Status};
use crate::target::UnitKey;

/// Last observed status of every unit, keyed by host and port.
///
/// Owned by the loop driver and only touched between cycles.
#[derive(Debug, Default)]
pub struct StatusHistory {
    statuses: HashMap<UnitKey, Status>,
}

impl StatusHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one cycle's results and return those that just went down.
    ///
    /// A result is a transition when it is `Down` and the unit was not
    /// already `Down`, which includes having no entry yet. The entry is
    /// overwritten whether or not the result is a transition.
    pub fn track(&mut self, results: &[CheckResult]) -> Vec<CheckResult> {
        let mut transitions = Vec::new();

        for result in results {
            let key = result.unit.key();
            let previous = self.statuses.insert(key.clone(), result.status);

            match (previous, result.status) {
                (Some(Status::Down), Status::Down) => {
                    tracing::debug!("{} is still down", key);
                }
                (_, Status::Down) => {
                    tracing::debug!("{} went down (was {:?})", key, previous);
                    transitions.push(result.clone());
                }
                (Some(Status::Down), Status::Up) => {
                    tracing::info!("{} ({}) recovered", result.unit.name, key);
                }
                (_, Status::Up) => {}
            }
        }

        transitions
    }

    /// Last recorded status for a unit
    pub fn status_of(&self, key: &UnitKey) -> Option<Status> {
        self.statuses.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }
}
