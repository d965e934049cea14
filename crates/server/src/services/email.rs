//! SMTP newsletter delivery via lettre.

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::EmailConfig;

/// Email delivery errors.
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("Invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Failed to build message: {0}")]
    Message(#[from] lettre::error::Error),
}

/// Async SMTP mailer built from the `SMTP_*` environment configuration.
#[derive(Clone)]
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl Mailer {
    /// Build the STARTTLS transport. Fails fast at startup on a bad host,
    /// not at the first send.
    ///
    /// # Errors
    ///
    /// Returns `EmailError::Transport` if the relay cannot be constructed.
    pub fn new(config: &EmailConfig) -> Result<Self, EmailError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            transport,
            from_address: config.from_address.clone(),
        })
    }

    /// Send one HTML email. Newsletter sends call this per recipient so a
    /// bad address does not abort the whole batch.
    ///
    /// # Errors
    ///
    /// Returns `EmailError` when the address is invalid or the relay
    /// rejects the message.
    pub async fn send_html(
        &self,
        to: &str,
        subject: &str,
        body_html: &str,
        reply_to: Option<&str>,
    ) -> Result<(), EmailError> {
        let mut builder = Message::builder()
            .from(self.from_address.parse()?)
            .to(to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_HTML);

        if let Some(reply_to) = reply_to {
            builder = builder.reply_to(reply_to.parse()?);
        }

        let message = builder.body(body_html.to_string())?;
        self.transport.send(message).await?;
        Ok(())
    }
}
