//! Notification construction and SMTP delivery.

use anyhow::{Context, Result};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use crate::config::MailConfig;
use crate::data::RunWindow;

pub const REPORT_LABEL: &str = "A-share daily review";
pub const FAILURE_LABEL: &str = "daily review pipeline FAILED";

/// One outbound notification: built once, sent once, discarded.
#[derive(Debug, Clone)]
pub struct Notification {
    pub subject: String,
    pub body: String,
    pub recipient: String,
}

impl Notification {
    /// Success-path report addressed to the configured recipient.
    pub fn report(window: &RunWindow, body: String, recipient: &str) -> Self {
        Self {
            subject: format!("{} {}", window.end_compact(), REPORT_LABEL),
            body,
            recipient: recipient.to_string(),
        }
    }

    /// Diagnostic alert addressed to the operator's own address.
    pub fn failure_alert(window: &RunWindow, error: &anyhow::Error, operator: &str) -> Self {
        Self {
            subject: format!("{} {}", window.end_compact(), FAILURE_LABEL),
            body: format!(
                "daily review pipeline run failed\n\nrun window: {} .. {}\n\nerror chain:\n{:?}",
                window.start_compact(),
                window.end_compact(),
                error
            ),
            recipient: operator.to_string(),
        }
    }
}

/// Delivery collaborator boundary.
#[allow(async_fn_in_trait)]
pub trait DeliveryChannel {
    async fn send(&self, notification: &Notification) -> Result<()>;
}

/// SMTP delivery over implicit TLS (SMTPS, port 465 by default).
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Result<Self> {
        let sender: Mailbox = config
            .sender
            .parse()
            .context("EMAIL_USER is not a valid email address")?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .context("failed to configure SMTP relay")?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.sender.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self { transport, sender })
    }
}

impl DeliveryChannel for SmtpMailer {
    async fn send(&self, notification: &Notification) -> Result<()> {
        let message = Message::builder()
            .from(self.sender.clone())
            .to(notification
                .recipient
                .parse()
                .context("recipient is not a valid email address")?)
            .subject(notification.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(notification.body.clone())
            .context("failed to build email message")?;

        self.transport
            .send(message)
            .await
            .context("SMTP delivery failed")?;

        info!(
            recipient = %notification.recipient,
            subject = %notification.subject,
            "notification delivered"
        );
        Ok(())
    }
}
