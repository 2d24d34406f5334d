//! Application configuration
//!
//! Centralized configuration management with environment variable support
//! and sensible defaults. Built once at startup and shared read-only.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Persistence configuration
    pub persistence: PersistenceConfig,
    /// Outgoing mail server configuration
    pub smtp: SmtpConfig,
    /// SMS provider configuration, `None` when credentials are missing
    pub sms: Option<SmsConfig>,
    /// Notification routing and delivery policy
    pub notifications: NotificationConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind the server to
    pub port: u16,
    /// Host address to bind to
    pub host: String,
    /// Serve the front-end bundle for unmatched paths
    pub serve_static: bool,
    /// Directory holding the front-end bundle
    pub static_dir: PathBuf,
}

/// Persistence configuration
#[derive(Debug, Clone)]
pub struct PersistenceConfig {
    /// JSON file holding every accepted order, newest first
    pub orders_file: PathBuf,
}

/// SMTP configuration
#[derive(Clone)]
pub struct SmtpConfig {
    /// SMTP server host
    pub host: String,
    /// SMTP server port
    pub port: u16,
    /// Use implicit TLS instead of opportunistic STARTTLS
    pub secure: bool,
    /// Login user, if the server requires authentication
    pub user: Option<String>,
    /// Login password
    pub password: Option<String>,
}

// Keeps the password out of the startup log line.
impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("secure", &self.secure)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Twilio credentials
#[derive(Clone)]
pub struct SmsConfig {
    /// Account SID
    pub account_sid: String,
    /// Auth token
    pub auth_token: String,
    /// REST API base URL (overridable for testing)
    pub api_base_url: String,
}

impl std::fmt::Debug for SmsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmsConfig")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"***")
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

/// Whether a failed notification channel fails the whole request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryPolicy {
    /// Failure propagates and the request answers 500
    Required,
    /// Failure is logged and otherwise ignored
    BestEffort,
}

impl DeliveryPolicy {
    /// Parse `required` / `best-effort` (case-insensitive)
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "required" => Some(DeliveryPolicy::Required),
            "best-effort" | "best_effort" | "besteffort" => Some(DeliveryPolicy::BestEffort),
            _ => None,
        }
    }
}

/// Notification configuration
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    /// Sender address for all outgoing email
    pub from_email: Option<String>,
    /// Shop owner's address; enables the owner email when set
    pub owner_email: Option<String>,
    /// Sender number for SMS; required for any SMS to go out
    pub sms_from: Option<String>,
    /// Shop owner's phone; enables the owner SMS when set
    pub owner_phone: Option<String>,
    /// Shop name used in message templates
    pub shop_name: String,
    /// Currency label used in message templates
    pub currency: String,
    /// Failure policy for email
    pub email_policy: DeliveryPolicy,
    /// Failure policy for SMS
    pub sms_policy: DeliveryPolicy,
    /// Upper bound on a single send attempt
    pub timeout: Duration,
    /// Attempts per message, at least 1
    pub max_attempts: u32,
    /// Delay between attempts
    pub retry_backoff: Duration,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            from_email: None,
            owner_email: None,
            sms_from: None,
            owner_phone: None,
            shop_name: DEFAULT_SHOP_NAME.to_string(),
            currency: DEFAULT_CURRENCY.to_string(),
            email_policy: DeliveryPolicy::Required,
            sms_policy: DeliveryPolicy::BestEffort,
            timeout: Duration::from_secs(30),
            max_attempts: 1,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

/// Shop name used when `SHOP_NAME` is unset
pub const DEFAULT_SHOP_NAME: &str = "FreshFold Laundry";

/// Currency label used when `CURRENCY` is unset
pub const DEFAULT_CURRENCY: &str = "PKR";

/// Public Twilio REST endpoint
pub const TWILIO_API_BASE_URL: &str = "https://api.twilio.com";

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    ///
    /// Empty values are treated the same as unset ones.
    ///
    /// # Arguments
    /// * `lookup` - Returns the raw value for a variable name
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let parse_or = |key: &str, default: u64| {
            get(key)
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(default)
        };

        let smtp_port = get("SMTP_PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(587);
        let smtp_secure = get("SMTP_SECURE")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(smtp_port == 465);

        let sms = match (get("TWILIO_SID"), get("TWILIO_TOKEN")) {
            (Some(account_sid), Some(auth_token)) => Some(SmsConfig {
                account_sid,
                auth_token,
                api_base_url: get("TWILIO_API_BASE_URL")
                    .unwrap_or_else(|| TWILIO_API_BASE_URL.to_string()),
            }),
            _ => None,
        };

        let defaults = NotificationConfig::default();

        Self {
            server: ServerConfig {
                port: get("PORT").and_then(|p| p.parse().ok()).unwrap_or(3000),
                host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                serve_static: get("SERVE_STATIC").is_some_and(|v| v == "true"),
                static_dir: PathBuf::from(get("STATIC_DIR").unwrap_or_else(|| "public".into())),
            },
            persistence: PersistenceConfig {
                orders_file: PathBuf::from(
                    get("ORDERS_FILE").unwrap_or_else(|| "orders.json".to_string()),
                ),
            },
            smtp: SmtpConfig {
                host: get("SMTP_HOST").unwrap_or_else(|| "localhost".to_string()),
                port: smtp_port,
                secure: smtp_secure,
                user: get("SMTP_USER"),
                password: get("SMTP_PASS"),
            },
            sms,
            notifications: NotificationConfig {
                from_email: get("FROM_EMAIL"),
                owner_email: get("OWNER_EMAIL"),
                sms_from: get("TWILIO_FROM"),
                owner_phone: get("OWNER_PHONE"),
                shop_name: get("SHOP_NAME").unwrap_or(defaults.shop_name),
                currency: get("CURRENCY").unwrap_or(defaults.currency),
                email_policy: get("EMAIL_DELIVERY")
                    .and_then(|v| DeliveryPolicy::parse(&v))
                    .unwrap_or(defaults.email_policy),
                sms_policy: get("SMS_DELIVERY")
                    .and_then(|v| DeliveryPolicy::parse(&v))
                    .unwrap_or(defaults.sms_policy),
                timeout: Duration::from_secs(parse_or("NOTIFY_TIMEOUT_SECS", 30).max(1)),
                max_attempts: parse_or("NOTIFY_MAX_ATTEMPTS", 1).clamp(1, 10) as u32,
                retry_backoff: Duration::from_millis(parse_or("NOTIFY_RETRY_BACKOFF_MS", 500)),
            },
        }
    }

    /// Get the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
