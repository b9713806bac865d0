//! Engine: drives check cycles once or on a timer

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::alert::AlertBatch;
use crate::checker::{CheckResult, Checker};
use crate::config::Target;
use crate::notifier::{AlertNotifier, DeliveryOutcome};
use crate::report;
use crate::scheduler::run_checks;
use crate::state::StatusHistory;
use crate::target::{expand_targets, CheckUnit};

/// Everything one cycle produced
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub results: Vec<CheckResult>,
    pub alerts: AlertBatch,
    pub delivery: DeliveryOutcome,
}

impl CycleReport {
    pub fn down_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_down()).count()
    }
}

/// The engine runs expand, check, track and notify for the configured inventory
#[derive(Debug)]
pub struct Engine {
    units: Vec<CheckUnit>,
    checker: Arc<dyn Checker>,
    notifier: AlertNotifier,
}

impl Engine {
    pub fn new(targets: &[Target], checker: Arc<dyn Checker>, notifier: AlertNotifier) -> Self {
        let units = expand_targets(targets);
        tracing::debug!(
            "Expanded {} target(s) into {} check unit(s)",
            targets.len(),
            units.len()
        );
        Self {
            units,
            checker,
            notifier,
        }
    }

    pub fn units(&self) -> &[CheckUnit] {
        &self.units
    }

    /// Run one full cycle against `history` and return what it produced.
    ///
    /// The history is updated before notification, so a failed delivery
    /// does not cause the same transition to alert again next cycle.
    pub async fn run_cycle(&self, history: &mut StatusHistory) -> CycleReport {
        let started = Instant::now();
        let results = self.check_all().await;
        let transitions = history.track(&results);
        self.notify(started, results, &transitions).await
    }

    /// Run a single cycle without any history.
    ///
    /// Every down result alerts, including duplicates of the same host and
    /// port, since there is no previous state to compare against.
    pub async fn run_once(&self) -> CycleReport {
        let started = Instant::now();
        let results = self.check_all().await;
        let transitions: Vec<CheckResult> =
            results.iter().filter(|r| r.is_down()).cloned().collect();
        self.notify(started, results, &transitions).await
    }

    async fn check_all(&self) -> Vec<CheckResult> {
        let results = run_checks(Arc::clone(&self.checker), &self.units).await;
        report::log_results(&results);
        results
    }

    async fn notify(
        &self,
        started: Instant,
        results: Vec<CheckResult>,
        transitions: &[CheckResult],
    ) -> CycleReport {
        let alerts = AlertBatch::from_transitions(transitions);
        let delivery = self.notifier.deliver(&alerts).await;

        let report = CycleReport {
            results,
            alerts,
            delivery,
        };

        tracing::info!(
            "Cycle complete: {} check(s), {} down, {} new alert(s) in {:.2}s",
            report.results.len(),
            report.down_count(),
            report.alerts.len(),
            started.elapsed().as_secs_f64()
        );

        report
    }

    /// Run a cycle every `interval` until `cancel` fires.
    ///
    /// The first cycle starts one interval after the call. Cancellation is
    /// only observed between cycles; a cycle that has started always runs
    /// through its notification step. Returns the final status history.
    pub async fn run_loop(&self, interval: Duration, cancel: CancellationToken) -> StatusHistory {
        let mut history = StatusHistory::new();
        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!("Monitoring loop cancelled");
                    break;
                }
                _ = ticker.tick() => {
                    self.run_cycle(&mut history).await;
                }
            }
        }

        history
    }
}
