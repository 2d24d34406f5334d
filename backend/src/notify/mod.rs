//! Customer and owner notifications
//!
//! Email and SMS providers sit behind the [`EmailTransport`] and
//! [`SmsTransport`] traits; [`Notifier`] fans an accepted order out to them.

pub mod dispatcher;
pub mod error;
pub mod smtp;
pub mod twilio;

pub use dispatcher::{Channel, Delivery, DeliveryOutcome, DeliveryReport, Notifier, Recipient};
pub use error::NotificationError;
pub use smtp::SmtpMailer;
pub use twilio::TwilioSms;

use async_trait::async_trait;

/// Plain-text email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    /// Sender address
    pub from: String,
    /// Recipient address
    pub to: String,
    /// Subject line
    pub subject: String,
    /// Plain-text body
    pub text: String,
}

/// Text message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsMessage {
    /// Sender number
    pub from: String,
    /// Recipient number
    pub to: String,
    /// Message text
    pub body: String,
}

/// Anything that can deliver an [`EmailMessage`]
#[async_trait]
pub trait EmailTransport: Send + Sync {
    /// Deliver one message
    async fn send(&self, message: &EmailMessage) -> Result<(), NotificationError>;
}

/// Anything that can deliver an [`SmsMessage`]
#[async_trait]
pub trait SmsTransport: Send + Sync {
    /// Deliver one message
    async fn send(&self, message: &SmsMessage) -> Result<(), NotificationError>;
}
