// # SMTP Notifier
//
// This crate delivers parcel status notifications as HTML email.
//
// ## Behaviour
//
// - One message per `notify()` call: `multipart/alternative` with a
//   plain-text and an HTML body
// - STARTTLS submission to the configured relay, authenticated with the
//   sender credentials
// - SMTP timeout configured (30 seconds by default)
// - Failures returned as `Error::Notify`; the engine decides what happens next
// - Dry-run mode renders and logs the message without connecting
//
// ## Security Requirements
//
// - The SMTP password NEVER appears in logs or `Debug` output

pub mod render;

pub use render::{render_html, render_text};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use parcel_core::config::EmailConfig;
use parcel_core::traits::{Notification, Notifier};
use parcel_core::{Error, Result};
use std::time::Duration;

/// Email notifier backed by an SMTP relay
pub struct SmtpNotifier {
    /// Authenticated STARTTLS transport (connects lazily on send)
    transport: AsyncSmtpTransport<Tokio1Executor>,

    /// Sender mailbox
    from: Mailbox,

    /// The single recipient
    to: Mailbox,

    /// Subject line
    subject: String,

    /// Timezone used to stamp the latest update
    timezone: Tz,

    /// `host:port` of the relay, for logging
    relay: String,

    /// Dry-run mode: if true, render and log but never connect
    dry_run: bool,
}

// Custom Debug implementation that leaves out the transport (it holds the credentials)
impl std::fmt::Debug for SmtpNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpNotifier")
            .field("from", &self.from.to_string())
            .field("to", &self.to.to_string())
            .field("subject", &self.subject)
            .field("timezone", &self.timezone.name())
            .field("relay", &self.relay)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl SmtpNotifier {
    /// Create a notifier from configuration
    ///
    /// No connection is made here; the relay is contacted on the first send.
    /// Must be called from within a tokio runtime (the connection pool
    /// starts its housekeeping task on construction).
    ///
    /// # Errors
    ///
    /// `Error::Config` for invalid addresses, an unknown timezone, or an
    /// unusable relay host.
    pub fn new(config: &EmailConfig, dry_run: bool) -> Result<Self> {
        config.validate()?;

        let from: Mailbox = config.sender_email.parse().map_err(|e| {
            Error::config(format!("Invalid sender address '{}': {}", config.sender_email, e))
        })?;
        let to: Mailbox = config.recipient_email.parse().map_err(|e| {
            Error::config(format!(
                "Invalid recipient address '{}': {}",
                config.recipient_email, e
            ))
        })?;
        let timezone: Tz = config
            .timezone
            .parse()
            .map_err(|e| Error::config(format!("Unknown timezone '{}': {}", config.timezone, e)))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| {
                Error::config(format!("Invalid SMTP relay '{}': {}", config.smtp_host, e))
            })?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.sender_email.clone(),
                config.sender_password.clone(),
            ))
            .timeout(Some(Duration::from_secs(config.timeout_secs)))
            .build();

        if dry_run {
            tracing::warn!("SMTP notifier running in DRY-RUN mode - no email will be sent");
        }

        Ok(Self {
            transport,
            from,
            to,
            subject: config.subject.clone(),
            timezone,
            relay: format!("{}:{}", config.smtp_host, config.smtp_port),
            dry_run,
        })
    }

    /// Build the email for a notification, stamped with `sent_at`
    pub fn build_message(
        &self,
        notification: &Notification,
        sent_at: &DateTime<Tz>,
    ) -> Result<Message> {
        let html = render_html(&notification.tracking_number, &notification.events, sent_at);
        let text = render_text(&notification.tracking_number, &notification.events, sent_at);

        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(self.subject.clone())
            .multipart(MultiPart::alternative_plain_html(text, html))
            .map_err(|e| Error::notify(format!("Failed to build message: {}", e)))
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify(&self, notification: &Notification) -> Result<()> {
        let sent_at = Utc::now().with_timezone(&self.timezone);
        let message = self.build_message(notification, &sent_at)?;

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would email '{}' update for {} to {} ({} event(s))",
                notification.status,
                notification.tracking_number,
                self.to,
                notification.events.len()
            );
            tracing::debug!(
                "[DRY-RUN] Message:\n{}",
                String::from_utf8_lossy(&message.formatted())
            );
            return Ok(());
        }

        self.transport
            .send(message)
            .await
            .map_err(|e| Error::notify(format!("SMTP send via {} failed: {}", self.relay, e)))?;

        tracing::info!(
            "Emailed '{}' update for {} to {}",
            notification.status,
            notification.tracking_number,
            self.to
        );
        Ok(())
    }

    fn notifier_name(&self) -> &'static str {
        "smtp"
    }
}
