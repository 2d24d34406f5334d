//! SMTP email transport
//!
//! Thin wrapper over lettre's Tokio transport. Implicit TLS is used when the
//! configuration says `secure`, otherwise STARTTLS is attempted when offered.

use crate::config::SmtpConfig;
use crate::notify::{EmailMessage, EmailTransport, NotificationError};
use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

/// Email transport backed by an SMTP server
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    host: String,
}

impl SmtpMailer {
    /// Build a mailer from SMTP settings
    ///
    /// No connection is opened here; the server is contacted on first send.
    ///
    /// # Arguments
    /// * `config` - Host, port, TLS mode and optional credentials
    ///
    /// # Returns
    /// * `Ok(SmtpMailer)` - Transport ready to send
    /// * `Err(NotificationError)` - If TLS parameters could not be created
    pub fn from_config(config: &SmtpConfig) -> Result<Self, NotificationError> {
        let builder = if config.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|e| NotificationError::Smtp(e.to_string()))?
        } else {
            let tls = TlsParameters::new(config.host.clone())
                .map_err(|e| NotificationError::Smtp(e.to_string()))?;
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(config.host.as_str())
                .tls(Tls::Opportunistic(tls))
        };

        let mut builder = builder.port(config.port);
        if let Some(user) = &config.user {
            builder = builder.credentials(Credentials::new(
                user.clone(),
                config.password.clone().unwrap_or_default(),
            ));
        }

        Ok(Self {
            transport: builder.build(),
            host: config.host.clone(),
        })
    }

    /// Assemble a plain-text MIME message
    pub fn build_message(message: &EmailMessage) -> Result<Message, NotificationError> {
        Message::builder()
            .from(parse_mailbox(&message.from)?)
            .to(parse_mailbox(&message.to)?)
            .subject(message.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(message.text.clone())
            .map_err(|e| NotificationError::Build(e.to_string()))
    }
}

#[async_trait]
impl EmailTransport for SmtpMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotificationError> {
        let email = Self::build_message(message)?;
        debug!(host = %self.host, to = %message.to, "Sending email");

        self.transport
            .send(email)
            .await
            .map_err(|e| NotificationError::Smtp(e.to_string()))?;
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotificationError> {
    address
        .parse::<Mailbox>()
        .map_err(|e| NotificationError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        })
}
