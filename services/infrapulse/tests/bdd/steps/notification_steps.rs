//! BDD step definitions for alert delivery

use std::sync::Arc;

use cucumber::{then, when};

use infrapulse::alert::AlertBatch;
use infrapulse::io::MailTransport;
use infrapulse::notifier::{parse_recipients, AlertNotifier, DeliveryOutcome};

use crate::world::InfraPulseWorld;

#[when(expr = "the recipient field {string} is parsed")]
fn recipients_parsed(world: &mut InfraPulseWorld, field: String) {
    world.recipients = parse_recipients(&field);
}

#[then(expr = "there should be {int} recipients")]
fn recipient_count(world: &mut InfraPulseWorld, expected: usize) {
    assert_eq!(
        world.recipients.len(),
        expected,
        "recipients: {:?}",
        world.recipients
    );
}

#[then(expr = "recipient {int} should be {string}")]
fn recipient_is(world: &mut InfraPulseWorld, index: usize, expected: String) {
    assert_eq!(world.recipients[index - 1], expected);
}

#[when(expr = "a batch of {int} alert(s) is delivered")]
async fn batch_delivered(world: &mut InfraPulseWorld, count: usize) {
    let mut batch = AlertBatch::new();
    for i in 0..count {
        batch.push(format!("Service Down Alert\n\nService: svc{}\n", i));
    }

    let transport: Arc<dyn MailTransport> = world.transport.clone();
    let notifier = AlertNotifier::new(world.smtp.clone(), &world.alert_recipient, transport);
    world.delivery = Some(notifier.deliver(&batch).await);
}

#[then("nothing should be delivered")]
fn nothing_delivered(world: &mut InfraPulseWorld) {
    assert_eq!(world.delivery, Some(DeliveryOutcome::NothingToSend));
    assert!(world.transport.sent().is_empty());
}

#[then("no send should be attempted")]
fn no_send_attempted(world: &mut InfraPulseWorld) {
    assert!(world.transport.sent().is_empty());
}

#[then("the batch delivery should be skipped because SMTP is not configured")]
fn batch_skipped_no_smtp(world: &mut InfraPulseWorld) {
    assert_eq!(world.delivery, Some(DeliveryOutcome::SkippedNoSmtp));
}

#[then(expr = "the batch should be sent to {int} recipients")]
fn batch_sent(world: &mut InfraPulseWorld, expected: usize) {
    match &world.delivery {
        Some(DeliveryOutcome::Sent { recipients }) => assert_eq!(recipients.len(), expected),
        other => panic!("expected DeliveryOutcome::Sent, got {other:?}"),
    }
}
