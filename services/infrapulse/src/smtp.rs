//! SMTP mail transport

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;
use crate::error::InfraPulseError;
use crate::io::{MailMessage, MailTransport};

const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Mail transport that relays through the configured SMTP server.
///
/// STARTTLS is used when the server offers it. Credentials are sent only
/// when a username is configured.
pub struct SmtpMailTransport {
    config: SmtpConfig,
}

impl std::fmt::Debug for SmtpMailTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailTransport")
            .field("host", &self.config.host)
            .field("port", &self.config.port)
            .field("username", &self.config.username)
            .finish()
    }
}

impl SmtpMailTransport {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    fn transport(&self) -> crate::Result<AsyncSmtpTransport<Tokio1Executor>> {
        let tls = TlsParameters::new(self.config.host.clone())
            .map_err(|e| InfraPulseError::Mail(format!("TLS setup failed: {}", e)))?;

        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(self.config.host.as_str())
                .port(self.config.port)
                .tls(Tls::Opportunistic(tls))
                .timeout(Some(SMTP_TIMEOUT));

        if !self.config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                self.config.username.clone(),
                self.config.password.clone(),
            ));
        }

        Ok(builder.build())
    }
}

/// Build the RFC 5322 message for an alert email
pub fn build_message(message: &MailMessage) -> crate::Result<Message> {
    let from: Mailbox = message.from.parse().map_err(|e| {
        InfraPulseError::Mail(format!("invalid sender address '{}': {}", message.from, e))
    })?;

    let mut builder = Message::builder()
        .from(from)
        .subject(message.subject.clone())
        .header(ContentType::TEXT_PLAIN);

    for recipient in &message.to {
        let mailbox: Mailbox = recipient.parse().map_err(|e| {
            InfraPulseError::Mail(format!("invalid recipient address '{}': {}", recipient, e))
        })?;
        builder = builder.to(mailbox);
    }

    builder
        .body(message.body.clone())
        .map_err(|e| InfraPulseError::Mail(format!("failed to build message: {}", e)))
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn send(&self, message: &MailMessage) -> crate::Result<()> {
        let email = build_message(message)?;
        let transport = self.transport()?;

        tracing::debug!(
            "Relaying alert through {}:{} to {} recipient(s)",
            self.config.host,
            self.config.port,
            message.to.len()
        );

        let response = transport.send(email).await.map_err(|e| {
            InfraPulseError::Mail(format!(
                "SMTP delivery via {}:{} failed: {}",
                self.config.host, self.config.port, e
            ))
        })?;

        tracing::debug!("SMTP server replied {}", response.code());
        Ok(())
    }
}
