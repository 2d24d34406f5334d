//! Shared helpers for order API integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{body::Body, http::Request, Router};
use freshfold_backend::config::Config;
use freshfold_backend::notify::{
    EmailMessage, EmailTransport, NotificationError, Notifier, SmsMessage, SmsTransport,
};
use freshfold_backend::server::build_router;
use freshfold_backend::state::{AppState, OrderStore, SharedState};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tower::ServiceExt;

/// One notification as seen by a fake transport
#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Email(EmailMessage),
    Sms(SmsMessage),
}

/// Notification log shared by both fake transports, in call order
pub type SentLog = Arc<Mutex<Vec<Sent>>>;

pub struct FakeMailer {
    pub log: SentLog,
    pub fail: bool,
}

#[async_trait]
impl EmailTransport for FakeMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotificationError> {
        if self.fail {
            return Err(NotificationError::Smtp("454 try again later".to_string()));
        }
        self.log.lock().unwrap().push(Sent::Email(message.clone()));
        Ok(())
    }
}

pub struct FakeSms {
    pub log: SentLog,
    pub fail: bool,
}

#[async_trait]
impl SmsTransport for FakeSms {
    async fn send(&self, message: &SmsMessage) -> Result<(), NotificationError> {
        if self.fail {
            return Err(NotificationError::Provider {
                status: 400,
                message: "invalid number".to_string(),
            });
        }
        self.log.lock().unwrap().push(Sent::Sms(message.clone()));
        Ok(())
    }
}

/// Test application: router plus everything needed to inspect side effects
pub struct TestApp {
    pub router: Router,
    pub state: SharedState,
    pub log: SentLog,
    pub dir: TempDir,
}

/// Options for [`spawn_app`]
#[derive(Default)]
pub struct TestOptions {
    /// Extra configuration variables
    pub vars: Vec<(&'static str, String)>,
    /// Wire an SMS transport
    pub with_sms: bool,
    pub email_fails: bool,
    pub sms_fails: bool,
}

/// Variables for a fully configured shop
pub fn full_vars() -> Vec<(&'static str, String)> {
    vec![
        ("FROM_EMAIL", "shop@freshfold.pk".to_string()),
        ("OWNER_EMAIL", "owner@freshfold.pk".to_string()),
        ("TWILIO_FROM", "+15005550006".to_string()),
        ("OWNER_PHONE", "+92311".to_string()),
    ]
}

pub fn config_from(dir: &TempDir, vars: &[(&'static str, String)]) -> Config {
    let mut map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect();
    map.entry("ORDERS_FILE".to_string())
        .or_insert_with(|| dir.path().join("orders.json").display().to_string());
    map.insert("NOTIFY_TIMEOUT_SECS".to_string(), "2".to_string());
    Config::from_lookup(|key| map.get(key).cloned())
}

pub fn spawn_app(options: TestOptions) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let config = config_from(&dir, &options.vars);
    let log: SentLog = Arc::new(Mutex::new(Vec::new()));

    let mailer = Arc::new(FakeMailer {
        log: log.clone(),
        fail: options.email_fails,
    });
    let sms: Option<Arc<dyn SmsTransport>> = if options.with_sms {
        Some(Arc::new(FakeSms {
            log: log.clone(),
            fail: options.sms_fails,
        }))
    } else {
        None
    };

    let store = OrderStore::new(config.persistence.orders_file.clone());
    let notifier = Notifier::new(mailer, sms, config.notifications.clone());
    let state = Arc::new(AppState::new(config, store, notifier));

    TestApp {
        router: build_router(state.clone()),
        state,
        log,
        dir,
    }
}

pub fn order_request(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/order")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

/// Send a request and return status plus parsed JSON body (`Null` if not JSON)
pub async fn send(router: &Router, request: Request<Body>) -> (u16, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status().as_u16();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub async fn post_order(router: &Router, payload: &Value) -> (u16, Value) {
    send(router, order_request(payload.to_string())).await
}

/// Raw contents of the order file, parsed
pub fn stored_orders(app: &TestApp) -> Vec<Value> {
    match std::fs::read_to_string(app.state.store.path()) {
        Ok(raw) => serde_json::from_str(&raw).unwrap(),
        Err(_) => Vec::new(),
    }
}
