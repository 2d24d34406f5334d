//! Notification-specific error types
//!
//! Errors raised while building or delivering email and SMS messages.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while sending a notification
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NotificationError {
    /// Sender or recipient could not be parsed as an address
    #[error("Invalid address '{address}': {reason}")]
    InvalidAddress {
        /// The offending address
        address: String,
        /// Parser message
        reason: String,
    },

    /// Message could not be assembled
    #[error("Failed to build message: {0}")]
    Build(String),

    /// SMTP transport or server rejected the message
    #[error("SMTP delivery failed: {0}")]
    Smtp(String),

    /// HTTP request to the SMS provider failed before a response arrived
    #[error("SMS provider request failed: {0}")]
    Http(String),

    /// SMS provider answered with a non-success status
    #[error("SMS provider returned status {status}: {message}")]
    Provider {
        /// HTTP status code
        status: u16,
        /// Provider's error message, or the raw body
        message: String,
    },

    /// A single attempt exceeded the configured timeout
    #[error("Notification timed out after {0:?}")]
    Timeout(Duration),
}

impl NotificationError {
    /// Whether another attempt could succeed
    ///
    /// Address and message-building errors fail identically every time.
    pub fn is_retryable(&self) -> bool {
        match self {
            NotificationError::InvalidAddress { .. } | NotificationError::Build(_) => false,
            NotificationError::Smtp(_)
            | NotificationError::Http(_)
            | NotificationError::Provider { .. }
            | NotificationError::Timeout(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_delivery_errors_are_retryable() {
        let invalid = NotificationError::InvalidAddress {
            address: "not-an-address".to_string(),
            reason: "missing @".to_string(),
        };
        assert!(!invalid.is_retryable());
        assert!(!NotificationError::Build("no body".to_string()).is_retryable());

        assert!(NotificationError::Smtp("421".to_string()).is_retryable());
        assert!(NotificationError::Http("reset".to_string()).is_retryable());
        assert!(NotificationError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(NotificationError::Provider {
            status: 503,
            message: "busy".to_string()
        }
        .is_retryable());
    }
}
