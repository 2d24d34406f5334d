//! Notification fan-out
//!
//! Sends the four order notifications strictly in sequence: customer email,
//! owner email, customer SMS, owner SMS. Each channel has its own
//! [`DeliveryPolicy`]; every attempt is bounded by the configured timeout and
//! retried up to the configured number of attempts.

use crate::config::{DeliveryPolicy, NotificationConfig};
use crate::notify::{EmailMessage, EmailTransport, NotificationError, SmsMessage, SmsTransport};
use crate::orders::{MessageTemplates, Order};
use std::future::Future;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Delivery channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// SMTP email
    Email,
    /// Text message
    Sms,
}

/// Who a notification is addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// The customer who placed the order
    Customer,
    /// The shop owner
    Owner,
}

/// What happened to one notification
#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryOutcome {
    /// Accepted by the provider
    Delivered,
    /// Not attempted because the path is not configured
    Skipped(&'static str),
    /// Attempted and failed under a best-effort policy
    Failed(String),
}

/// Outcome of one notification
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    /// Channel used
    pub channel: Channel,
    /// Addressee
    pub recipient: Recipient,
    /// Result
    pub outcome: DeliveryOutcome,
}

/// Outcomes of a full fan-out, in the order they happened
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeliveryReport {
    /// One entry per notification step
    pub deliveries: Vec<Delivery>,
}

impl DeliveryReport {
    fn record(&mut self, channel: Channel, recipient: Recipient, outcome: DeliveryOutcome) {
        self.deliveries.push(Delivery {
            channel,
            recipient,
            outcome,
        });
    }

    /// Number of notifications the providers accepted
    pub fn delivered(&self) -> usize {
        self.count(|o| matches!(o, DeliveryOutcome::Delivered))
    }

    /// Number of best-effort notifications that failed
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, DeliveryOutcome::Failed(_)))
    }

    /// Number of notifications not attempted
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, DeliveryOutcome::Skipped(_)))
    }

    fn count(&self, pred: impl Fn(&DeliveryOutcome) -> bool) -> usize {
        self.deliveries.iter().filter(|d| pred(&d.outcome)).count()
    }
}

/// Sends order notifications through the configured transports
pub struct Notifier {
    mailer: Arc<dyn EmailTransport>,
    sms: Option<Arc<dyn SmsTransport>>,
    templates: MessageTemplates,
    settings: NotificationConfig,
}

impl Notifier {
    /// Create a notifier
    ///
    /// # Arguments
    /// * `mailer` - Email transport (email is always attempted)
    /// * `sms` - SMS transport, `None` when no provider credentials exist
    /// * `settings` - Recipients, templates and delivery policy
    pub fn new(
        mailer: Arc<dyn EmailTransport>,
        sms: Option<Arc<dyn SmsTransport>>,
        settings: NotificationConfig,
    ) -> Self {
        Self {
            mailer,
            sms,
            templates: MessageTemplates::from_config(&settings),
            settings,
        }
    }

    /// Message templates in use
    pub fn templates(&self) -> &MessageTemplates {
        &self.templates
    }

    /// SMS goes out only with provider credentials and a sender number
    pub fn sms_enabled(&self) -> bool {
        self.sms.is_some() && self.settings.sms_from.is_some()
    }

    /// Notify customer and owner about an accepted order
    ///
    /// # Arguments
    /// * `order` - Accepted, already persisted order
    /// * `summary` - Rendered order summary embedded in the emails
    ///
    /// # Returns
    /// * `Ok(DeliveryReport)` - Every required notification was delivered
    /// * `Err(NotificationError)` - A notification on a `Required` channel
    ///   failed; later steps were not attempted
    pub async fn notify_order(
        &self,
        order: &Order,
        summary: &str,
    ) -> Result<DeliveryReport, NotificationError> {
        let mut report = DeliveryReport::default();
        let from = self.settings.from_email.clone().unwrap_or_default();

        let customer_email = EmailMessage {
            from: from.clone(),
            to: order.text("email"),
            subject: self.templates.customer_email_subject(order),
            text: self.templates.customer_email_body(order, summary),
        };
        let result = self
            .attempt(Channel::Email, Recipient::Customer, || {
                self.mailer.send(&customer_email)
            })
            .await;
        self.settle(&mut report, Channel::Email, Recipient::Customer, result)?;

        match &self.settings.owner_email {
            Some(owner_email) => {
                let owner_message = EmailMessage {
                    from,
                    to: owner_email.clone(),
                    subject: self.templates.owner_email_subject(order),
                    text: self.templates.owner_email_body(summary),
                };
                let result = self
                    .attempt(Channel::Email, Recipient::Owner, || {
                        self.mailer.send(&owner_message)
                    })
                    .await;
                self.settle(&mut report, Channel::Email, Recipient::Owner, result)?;
            }
            None => report.record(
                Channel::Email,
                Recipient::Owner,
                DeliveryOutcome::Skipped("owner email not configured"),
            ),
        }

        let (sms, sms_from) = match (&self.sms, &self.settings.sms_from) {
            (Some(sms), Some(sms_from)) => (sms, sms_from),
            _ => {
                let reason = "sms provider not configured";
                report.record(Channel::Sms, Recipient::Customer, DeliveryOutcome::Skipped(reason));
                report.record(Channel::Sms, Recipient::Owner, DeliveryOutcome::Skipped(reason));
                return Ok(report);
            }
        };

        let customer_sms = SmsMessage {
            from: sms_from.clone(),
            to: order.text("phone"),
            body: self.templates.customer_sms(order),
        };
        let result = self
            .attempt(Channel::Sms, Recipient::Customer, || sms.send(&customer_sms))
            .await;
        self.settle(&mut report, Channel::Sms, Recipient::Customer, result)?;

        match &self.settings.owner_phone {
            Some(owner_phone) => {
                let owner_sms = SmsMessage {
                    from: sms_from.clone(),
                    to: owner_phone.clone(),
                    body: self.templates.owner_sms(order),
                };
                let result = self
                    .attempt(Channel::Sms, Recipient::Owner, || sms.send(&owner_sms))
                    .await;
                self.settle(&mut report, Channel::Sms, Recipient::Owner, result)?;
            }
            None => report.record(
                Channel::Sms,
                Recipient::Owner,
                DeliveryOutcome::Skipped("owner phone not configured"),
            ),
        }

        Ok(report)
    }

    fn policy(&self, channel: Channel) -> DeliveryPolicy {
        match channel {
            Channel::Email => self.settings.email_policy,
            Channel::Sms => self.settings.sms_policy,
        }
    }

    /// Record a result, propagating the error when the channel is required
    fn settle(
        &self,
        report: &mut DeliveryReport,
        channel: Channel,
        recipient: Recipient,
        result: Result<(), NotificationError>,
    ) -> Result<(), NotificationError> {
        match result {
            Ok(()) => {
                info!(?channel, ?recipient, "Notification delivered");
                report.record(channel, recipient, DeliveryOutcome::Delivered);
                Ok(())
            }
            Err(e) => match self.policy(channel) {
                DeliveryPolicy::Required => {
                    error!(?channel, ?recipient, error = %e, "Required notification failed");
                    Err(e)
                }
                DeliveryPolicy::BestEffort => {
                    warn!(?channel, ?recipient, error = %e, "Notification failed");
                    report.record(channel, recipient, DeliveryOutcome::Failed(e.to_string()));
                    Ok(())
                }
            },
        }
    }

    /// Run `send` with the configured timeout and retry budget
    ///
    /// Errors that cannot change between attempts are returned at once.
    async fn attempt<F, Fut>(
        &self,
        channel: Channel,
        recipient: Recipient,
        mut send: F,
    ) -> Result<(), NotificationError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<(), NotificationError>>,
    {
        let max_attempts = self.settings.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            let result = match tokio::time::timeout(self.settings.timeout, send()).await {
                Ok(result) => result,
                Err(_) => Err(NotificationError::Timeout(self.settings.timeout)),
            };

            match result {
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    warn!(
                        ?channel,
                        ?recipient,
                        attempt,
                        max_attempts,
                        error = %e,
                        "Notification attempt failed, retrying"
                    );
                    tokio::time::sleep(self.settings.retry_backoff).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}
