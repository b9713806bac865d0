//! BDD step definitions for monitoring cycles and edge-triggered alerts

use std::sync::Arc;

use cucumber::{given, then, when};

use infrapulse::checker::{Checker, ProbeChecker};
use infrapulse::config::SmtpConfig;
use infrapulse::engine::Engine;
use infrapulse::io::{MailTransport, NetworkProbe};
use infrapulse::notifier::{AlertNotifier, DeliveryOutcome};

use crate::world::{InfraPulseWorld, RecordingTransport};

fn build_engine(world: &InfraPulseWorld) -> Engine {
    let probe: Arc<dyn NetworkProbe> = world.probe.clone();
    let checker: Arc<dyn Checker> = Arc::new(ProbeChecker::new(probe));
    let transport: Arc<dyn MailTransport> = world.transport.clone();
    let notifier = AlertNotifier::new(world.smtp.clone(), &world.alert_recipient, transport);
    Engine::new(&world.targets, checker, notifier)
}

#[given(expr = "SMTP is configured with recipients {string}")]
fn smtp_configured(world: &mut InfraPulseWorld, recipients: String) {
    world.smtp = SmtpConfig {
        host: "smtp.example.com".to_string(),
        port: 587,
        username: "alerts@example.com".to_string(),
        password: "secret".to_string(),
    };
    world.alert_recipient = recipients;
}

#[given("SMTP is not configured")]
fn smtp_not_configured(world: &mut InfraPulseWorld) {
    world.smtp = SmtpConfig::default();
    world.alert_recipient = "ops@example.com".to_string();
}

#[given("the mail relay rejects every message")]
fn relay_rejects(world: &mut InfraPulseWorld) {
    world.transport = Arc::new(RecordingTransport::failing());
}

#[given(expr = "port {int} on {string} is unreachable")]
fn port_unreachable(world: &mut InfraPulseWorld, port: u16, host: String) {
    world.probe.set_reachable(&host, Some(port), false);
}

#[given(expr = "port {int} on {string} is reachable")]
fn port_reachable(world: &mut InfraPulseWorld, port: u16, host: String) {
    world.probe.set_reachable(&host, Some(port), true);
}

#[when(expr = "port {int} on {string} becomes reachable")]
fn port_becomes_reachable(world: &mut InfraPulseWorld, port: u16, host: String) {
    world.probe.set_reachable(&host, Some(port), true);
}

#[when(expr = "port {int} on {string} becomes unreachable")]
fn port_becomes_unreachable(world: &mut InfraPulseWorld, port: u16, host: String) {
    world.probe.set_reachable(&host, Some(port), false);
}

#[given(expr = "host {string} does not answer pings")]
fn host_silent(world: &mut InfraPulseWorld, host: String) {
    world.probe.set_reachable(&host, None, false);
}

#[when("a monitoring cycle runs")]
async fn cycle_runs(world: &mut InfraPulseWorld) {
    let engine = build_engine(world);
    let report = engine.run_cycle(&mut world.history).await;
    world.reports.push(report);
}

#[when(expr = "{int} monitoring cycles run")]
async fn cycles_run(world: &mut InfraPulseWorld, count: usize) {
    let engine = build_engine(world);
    for _ in 0..count {
        let report = engine.run_cycle(&mut world.history).await;
        world.reports.push(report);
    }
}

#[when("a single-shot run happens")]
async fn single_shot(world: &mut InfraPulseWorld) {
    let engine = build_engine(world);
    let report = engine.run_once().await;
    world.reports.push(report);
}

#[given(expr = "port {int} on {string} reports {string} over successive cycles")]
fn status_sequence(world: &mut InfraPulseWorld, port: u16, host: String, sequence: String) {
    world.targets.push(infrapulse::Target {
        name: "Sequenced".to_string(),
        host,
        ports: vec![port],
    });
    world.status_sequence = sequence
        .split(',')
        .map(|s| match s.trim() {
            "UP" => true,
            "DOWN" => false,
            other => panic!("Unknown status: {}", other),
        })
        .collect();
}

#[when("those cycles run")]
async fn sequenced_cycles_run(world: &mut InfraPulseWorld) {
    let engine = build_engine(world);
    let unit = engine.units()[0].clone();
    let port = unit.port.expect("sequenced unit must have a port");

    for (index, up) in world.status_sequence.clone().into_iter().enumerate() {
        world.probe.set_reachable(&unit.host, Some(port), up);
        let report = engine.run_cycle(&mut world.history).await;
        if !report.alerts.is_empty() {
            world.alerting_cycles.push(index + 1);
        }
        world.reports.push(report);
    }
}

#[then(expr = "alerts should fire on cycles {string}")]
fn alerts_on_cycles(world: &mut InfraPulseWorld, cycles: String) {
    let expected: Vec<usize> = cycles
        .split(',')
        .map(|c| c.trim().parse().expect("invalid cycle number"))
        .collect();
    assert_eq!(world.alerting_cycles, expected);
}

#[then(expr = "the last cycle should report {int} up and {int} down results")]
fn last_cycle_counts(world: &mut InfraPulseWorld, up: usize, down: usize) {
    let report = world.last_report();
    assert_eq!(report.results.len() - report.down_count(), up);
    assert_eq!(report.down_count(), down);
}

#[then(expr = "the last cycle should raise {int} alert(s)")]
fn last_cycle_alerts(world: &mut InfraPulseWorld, expected: usize) {
    assert_eq!(world.last_report().alerts.len(), expected);
}

#[then(expr = "the alert should mention {string}")]
fn alert_mentions(world: &mut InfraPulseWorld, text: String) {
    let alerts = &world.last_report().alerts;
    assert!(
        alerts.blocks().iter().any(|b| b.contains(&text)),
        "no alert block mentions '{}': {:?}",
        text,
        alerts.blocks()
    );
}

#[then(expr = "{int} email(s) should have been sent")]
fn emails_sent(world: &mut InfraPulseWorld, expected: usize) {
    assert_eq!(world.transport.sent().len(), expected);
}

#[then(expr = "the last email should contain {int} alert block(s)")]
fn email_blocks(world: &mut InfraPulseWorld, expected: usize) {
    let sent = world.transport.sent();
    let last = sent.last().expect("no email sent");
    let blocks = last.body.matches(" Down Alert\n").count();
    assert_eq!(blocks, expected, "body: {}", last.body);
}

#[then(expr = "the last email should be addressed to {string}")]
fn email_addressed(world: &mut InfraPulseWorld, recipients: String) {
    let sent = world.transport.sent();
    let last = sent.last().expect("no email sent");
    let expected: Vec<String> = recipients.split(',').map(|r| r.to_string()).collect();
    assert_eq!(last.to, expected);
}

#[then("the delivery should be skipped because SMTP is not configured")]
fn delivery_skipped_no_smtp(world: &mut InfraPulseWorld) {
    assert_eq!(world.last_report().delivery, DeliveryOutcome::SkippedNoSmtp);
}

#[then("the delivery should be skipped because no recipient is set")]
fn delivery_skipped_no_recipients(world: &mut InfraPulseWorld) {
    assert_eq!(
        world.last_report().delivery,
        DeliveryOutcome::SkippedNoRecipients
    );
}

#[then("the delivery should be reported as failed")]
fn delivery_failed(world: &mut InfraPulseWorld) {
    assert!(
        matches!(world.last_report().delivery, DeliveryOutcome::Failed(_)),
        "got {:?}",
        world.last_report().delivery
    );
}
