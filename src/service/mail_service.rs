use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;
use crate::error::{AppError, Result};

pub struct MailOutcome {
    pub mock_mode: bool,
}

/// Outbound SMTP mail. Without a configured relay it runs in mock mode:
/// the message is logged and reported as sent.
pub struct Mailer {
    config: SmtpConfig,
}

impl Mailer {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    fn is_configured(&self) -> bool {
        self.config.enabled
            && self.config.host.is_some()
            && self.config.username.is_some()
            && self.config.password.is_some()
    }

    pub async fn send(&self, to: &str, subject: &str, body: &str) -> Result<MailOutcome> {
        if !self.is_configured() {
            tracing::info!(
                to = %to,
                subject = %subject,
                "SMTP not configured; mail logged instead of sent"
            );
            return Ok(MailOutcome { mock_mode: true });
        }

        let host = self.config.host.as_deref().unwrap_or_default();
        let username = self.config.username.clone().unwrap_or_default();
        let password = self.config.password.clone().unwrap_or_default();
        let from = self
            .config
            .from_address
            .clone()
            .unwrap_or_else(|| username.clone());

        let message = Message::builder()
            .from(from.parse().map_err(|e| {
                AppError::Mail(format!("Invalid from address '{}': {}", from, e))
            })?)
            .to(to.parse().map_err(|e| {
                AppError::Mail(format!("Invalid recipient address '{}': {}", to, e))
            })?)
            .subject(subject)
            .body(body.to_string())
            .map_err(|e| AppError::Mail(format!("Failed to build message: {}", e)))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| AppError::Mail(format!("Invalid SMTP relay '{}': {}", host, e)))?
            .credentials(Credentials::new(username, password));

        if let Some(port) = self.config.port {
            builder = builder.port(port);
        }

        let transport = builder.build();

        transport
            .send(message)
            .await
            .map_err(|e| AppError::Mail(e.to_string()))?;

        Ok(MailOutcome { mock_mode: false })
    }
}
