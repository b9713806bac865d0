//! Fan-out of one cycle's checks with a join barrier

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};

use crate::checker::{CheckResult, Checker};
use crate::target::CheckUnit;

/// Run every unit's check concurrently and return once all have finished.
///
/// One task is spawned per unit. Results come back in completion order and
/// the returned set always has exactly one entry per input unit: a task
/// that panics or is cancelled is reported as a `Down` result carrying the
/// join error.
pub async fn run_checks(checker: Arc<dyn Checker>, units: &[CheckUnit]) -> Vec<CheckResult> {
    let mut pending: FuturesUnordered<_> = units
        .iter()
        .cloned()
        .map(|unit| {
            let checker = Arc::clone(&checker);
            let task_unit = unit.clone();
            let handle = tokio::spawn(async move { checker.check(task_unit).await });
            async move { (unit, handle.await) }
        })
        .collect();

    tracing::debug!("Dispatched {} checks", pending.len());

    let mut results = Vec::with_capacity(units.len());
    while let Some((unit, outcome)) = pending.next().await {
        match outcome {
            Ok(result) => results.push(result),
            Err(e) => {
                tracing::warn!("Check task for {} failed: {}", unit.key(), e);
                results.push(CheckResult::down(
                    unit,
                    Some(format!("check task failed: {}", e)),
                ));
            }
        }
    }

    results
}
