//! Transactional email for Forge My Hero.
//!
//! [`Mailer`] wraps the `lettre` async SMTP transport. Configuration comes
//! from the environment; when `SMTP_HOST` is unset [`MailConfig::from_env`]
//! returns `None` and callers skip sending.

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

// ---------------------------------------------------------------------------
// MailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "Forge My Hero <noreply@forgemyhero.local>";

/// SMTP settings.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    /// RFC 5322 "From" mailbox.
    pub from_address: String,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
}

impl MailConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable        | Required | Default                                      |
    /// |-----------------|----------|----------------------------------------------|
    /// | `SMTP_HOST`     | yes      | --                                           |
    /// | `SMTP_PORT`     | no       | `587`                                        |
    /// | `SMTP_FROM`     | no       | `Forge My Hero <noreply@forgemyhero.local>`  |
    /// | `SMTP_USER`     | no       | --                                           |
    /// | `SMTP_PASSWORD` | no       | --                                           |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

/// A rendered plain-text email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub subject: String,
    pub body: String,
}

/// Password reset email pointing at `reset_link`.
pub fn password_reset_email(username: &str, reset_link: &str, expiry_mins: i64) -> Email {
    Email {
        subject: "[Forge My Hero] Reset your password".to_string(),
        body: format!(
            "Hi {username},\n\n\
             Someone asked to reset the password for your Forge My Hero account.\n\
             Follow this link to choose a new one:\n\n\
             {reset_link}\n\n\
             The link expires in {expiry_mins} minutes and can be used once.\n\
             If you did not ask for this, you can ignore this email.\n"
        ),
    }
}

// ---------------------------------------------------------------------------
// Mailer
// ---------------------------------------------------------------------------

/// Sends plain-text emails via SMTP.
#[derive(Debug, Clone)]
pub struct Mailer {
    config: MailConfig,
}

impl Mailer {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }

    /// Build the MIME message for `email` addressed to `to`.
    pub fn build_message(&self, to: &str, email: &Email) -> Result<Message, MailError> {
        Message::builder()
            .from(self.config.from_address.parse()?)
            .to(to.parse()?)
            .subject(email.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(email.body.clone())
            .map_err(|e| MailError::Build(e.to_string()))
    }

    /// Send `email` to `to`.
    pub async fn send(&self, to: &str, email: &Email) -> Result<(), MailError> {
        let message = self.build_message(to, email)?;

        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
                .port(self.config.smtp_port);

        if let (Some(user), Some(pass)) = (&self.config.smtp_user, &self.config.smtp_password) {
            transport_builder =
                transport_builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        let mailer = transport_builder.build();
        mailer.send(message).await?;

        tracing::info!(to, subject = %email.subject, "Email sent");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
