// Application state management
// Process-wide state built once at startup and shared read-only by handlers

use crate::config::Config;
use crate::notify::{EmailTransport, Notifier, SmsTransport, SmtpMailer, TwilioSms};
use crate::state::persistence::OrderStore;
use std::sync::Arc;
use tracing::{info, warn};

/// Handle shared with every request handler
pub type SharedState = Arc<AppState>;

/// Main application state
///
/// Holds the configuration, the order store and the notifier. Nothing here
/// changes after startup; the store serializes its own writes.
pub struct AppState {
    /// Configuration the process was started with
    pub config: Config,
    /// Persisted order collection
    pub store: OrderStore,
    /// Email and SMS fan-out
    pub notifier: Notifier,
}

impl AppState {
    /// Assemble state from already-built parts
    pub fn new(config: Config, store: OrderStore, notifier: Notifier) -> Self {
        Self {
            config,
            store,
            notifier,
        }
    }

    /// Build the production state: SMTP mailer, Twilio client if credentials
    /// exist, and a store at the configured path
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let mailer: Arc<dyn EmailTransport> = Arc::new(SmtpMailer::from_config(&config.smtp)?);

        let sms: Option<Arc<dyn SmsTransport>> = match &config.sms {
            Some(sms_config) => {
                let client = reqwest::Client::builder()
                    .timeout(config.notifications.timeout)
                    .build()?;
                Some(Arc::new(TwilioSms::new(client, sms_config)))
            }
            None => None,
        };

        if config.notifications.from_email.is_none() {
            warn!("FROM_EMAIL is not set; order emails will be rejected");
        }
        match (&sms, &config.notifications.sms_from) {
            (Some(_), Some(from)) => info!(from = %from, "SMS notifications enabled"),
            (Some(_), None) => warn!("Twilio credentials set but TWILIO_FROM is missing; SMS disabled"),
            (None, _) => info!("SMS notifications disabled"),
        }

        let store = OrderStore::new(config.persistence.orders_file.clone());
        let notifier = Notifier::new(mailer, sms, config.notifications.clone());

        Ok(Self::new(config, store, notifier))
    }
}
