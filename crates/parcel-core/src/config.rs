//! Configuration types for the parcel tracker
//!
//! The configuration is a TOML file with a `[dhl]` section (API credentials
//! and the tracking number) and an `[email]` section (sender, recipient and
//! relay settings). An optional `[engine]` section tunes the poll loop.
//!
//! Section and key names also accept the upper-case spelling used by older
//! `dhl_details` files (`[DHL]`, `API_KEY`, `[Email]`, `SENDER_EMAIL`, ...).
//!
//! ```toml
//! [dhl]
//! api_key = "..."
//! api_secret = "..."
//! tracking_number = "00340434292135100186"
//!
//! [email]
//! sender_email = "bot@example.com"
//! sender_password = "..."
//! recipient_email = "me@example.com"
//! ```

use serde::Deserialize;
use std::path::Path;

/// Default DHL Shipment Tracking endpoint
pub const DEFAULT_TRACKING_ENDPOINT: &str = "https://api-eu.dhl.com/track/shipments";

/// Main tracker configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TrackerConfig {
    /// Tracking API configuration
    #[serde(alias = "DHL")]
    pub dhl: DhlConfig,

    /// Notification email configuration
    #[serde(alias = "Email", alias = "EMAIL")]
    pub email: EmailConfig,

    /// Optional engine settings
    #[serde(default, alias = "Engine", alias = "ENGINE")]
    pub engine: EngineConfig,
}

impl TrackerConfig {
    /// Parse a configuration from TOML text
    ///
    /// The result is validated before it is returned.
    pub fn from_toml_str(text: &str) -> Result<Self, crate::Error> {
        let config: Self = toml::from_str(text)
            .map_err(|e| crate::Error::config(format!("Invalid configuration file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, crate::Error> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            crate::Error::config(format!(
                "Cannot read configuration file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&text)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.dhl.validate()?;
        self.email.validate()?;
        self.engine.validate()?;
        Ok(())
    }
}

/// DHL tracking API configuration
#[derive(Clone, Deserialize)]
pub struct DhlConfig {
    /// Value of the `DHL-API-Key` header
    /// ⚠️ NEVER log this value
    #[serde(alias = "API_KEY")]
    pub api_key: String,

    /// Value of the `DHL-API-Secret` header
    /// ⚠️ NEVER log this value
    #[serde(alias = "API_SECRET")]
    pub api_secret: String,

    /// The shipment to follow
    #[serde(alias = "TRACKING_NUMBER")]
    pub tracking_number: String,

    /// Tracking endpoint (the tracking number is sent as a query parameter)
    #[serde(default = "default_endpoint", alias = "ENDPOINT")]
    pub endpoint: String,

    /// HTTP request timeout in seconds
    #[serde(default = "default_http_timeout_secs", alias = "TIMEOUT_SECS")]
    pub timeout_secs: u64,
}

impl DhlConfig {
    /// Create a DHL configuration with default endpoint and timeout
    pub fn new(
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        tracking_number: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            tracking_number: tracking_number.into(),
            endpoint: default_endpoint(),
            timeout_secs: default_http_timeout_secs(),
        }
    }

    /// Validate the tracking API configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.api_key.trim().is_empty() {
            return Err(crate::Error::config("dhl.api_key cannot be empty"));
        }
        if self.api_secret.trim().is_empty() {
            return Err(crate::Error::config("dhl.api_secret cannot be empty"));
        }
        if self.tracking_number.trim().is_empty() {
            return Err(crate::Error::config("dhl.tracking_number cannot be empty"));
        }
        if !self.endpoint.starts_with("https://") && !self.endpoint.starts_with("http://") {
            return Err(crate::Error::config(format!(
                "dhl.endpoint must use HTTP or HTTPS scheme. Got: {}",
                self.endpoint
            )));
        }
        if self.timeout_secs == 0 {
            return Err(crate::Error::config("dhl.timeout_secs must be > 0"));
        }
        Ok(())
    }
}

// Custom Debug implementation that hides the API credentials
impl std::fmt::Debug for DhlConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DhlConfig")
            .field("api_key", &"<REDACTED>")
            .field("api_secret", &"<REDACTED>")
            .field("tracking_number", &self.tracking_number)
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Email notification configuration
#[derive(Clone, Deserialize)]
pub struct EmailConfig {
    /// Sender address, also used as the SMTP login
    #[serde(alias = "SENDER_EMAIL")]
    pub sender_email: String,

    /// SMTP password for the sender account
    /// ⚠️ NEVER log this value
    #[serde(alias = "SENDER_PASSWORD")]
    pub sender_password: String,

    /// The single recipient of every notification
    #[serde(alias = "RECIPIENT_EMAIL")]
    pub recipient_email: String,

    /// SMTP relay host (STARTTLS)
    #[serde(default = "default_smtp_host", alias = "SMTP_HOST")]
    pub smtp_host: String,

    /// SMTP submission port
    #[serde(default = "default_smtp_port", alias = "SMTP_PORT")]
    pub smtp_port: u16,

    /// Subject line of notification emails
    #[serde(default = "default_subject", alias = "SUBJECT")]
    pub subject: String,

    /// IANA timezone used to stamp the latest update
    #[serde(default = "default_timezone", alias = "TIMEZONE")]
    pub timezone: String,

    /// SMTP connection timeout in seconds
    #[serde(default = "default_smtp_timeout_secs", alias = "TIMEOUT_SECS")]
    pub timeout_secs: u64,
}

impl EmailConfig {
    /// Create an email configuration with default relay settings
    pub fn new(
        sender_email: impl Into<String>,
        sender_password: impl Into<String>,
        recipient_email: impl Into<String>,
    ) -> Self {
        Self {
            sender_email: sender_email.into(),
            sender_password: sender_password.into(),
            recipient_email: recipient_email.into(),
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            subject: default_subject(),
            timezone: default_timezone(),
            timeout_secs: default_smtp_timeout_secs(),
        }
    }

    /// Validate the email configuration
    ///
    /// Address syntax is only checked loosely here; the notifier parses
    /// the mailboxes properly when it is built.
    pub fn validate(&self) -> Result<(), crate::Error> {
        if !self.sender_email.contains('@') {
            return Err(crate::Error::config(format!(
                "email.sender_email is not an email address: '{}'",
                self.sender_email
            )));
        }
        if !self.recipient_email.contains('@') {
            return Err(crate::Error::config(format!(
                "email.recipient_email is not an email address: '{}'",
                self.recipient_email
            )));
        }
        if self.sender_password.is_empty() {
            return Err(crate::Error::config("email.sender_password cannot be empty"));
        }
        if self.smtp_host.trim().is_empty() {
            return Err(crate::Error::config("email.smtp_host cannot be empty"));
        }
        if self.smtp_port == 0 {
            return Err(crate::Error::config("email.smtp_port must be > 0"));
        }
        if self.timezone.trim().is_empty() {
            return Err(crate::Error::config("email.timezone cannot be empty"));
        }
        if self.timeout_secs == 0 {
            return Err(crate::Error::config("email.timeout_secs must be > 0"));
        }
        Ok(())
    }
}

// Custom Debug implementation that hides the SMTP password
impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("sender_email", &self.sender_email)
            .field("sender_password", &"<REDACTED>")
            .field("recipient_email", &self.recipient_email)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("subject", &self.subject)
            .field("timezone", &self.timezone)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// What the engine does when a notification cannot be delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyFailurePolicy {
    /// Leave the status change uncommitted and try again after the retry interval
    #[default]
    Retry,
    /// Stop the engine and return the error
    Abort,
}

/// Engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Wait between successful polls (in seconds)
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Wait after a failed poll (in seconds)
    #[serde(default = "default_retry_interval_secs")]
    pub retry_interval_secs: u64,

    /// Handling of mail transport failures
    #[serde(default)]
    pub on_notify_failure: NotifyFailurePolicy,

    /// Capacity of the engine event channel
    ///
    /// When full, new events are dropped with a warning log.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl EngineConfig {
    /// Validate the engine configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.poll_interval_secs == 0 {
            return Err(crate::Error::config("engine.poll_interval_secs must be > 0"));
        }
        if self.retry_interval_secs == 0 {
            return Err(crate::Error::config("engine.retry_interval_secs must be > 0"));
        }
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config(
                "engine.event_channel_capacity must be > 0",
            ));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            retry_interval_secs: default_retry_interval_secs(),
            on_notify_failure: NotifyFailurePolicy::default(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_TRACKING_ENDPOINT.to_string()
}

fn default_http_timeout_secs() -> u64 {
    30
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_subject() -> String {
    "New Update for DHL Package".to_string()
}

fn default_timezone() -> String {
    "America/Lima".to_string()
}

fn default_smtp_timeout_secs() -> u64 {
    30
}

fn default_poll_interval_secs() -> u64 {
    600
}

fn default_retry_interval_secs() -> u64 {
    60
}

fn default_event_channel_capacity() -> usize {
    100
}
