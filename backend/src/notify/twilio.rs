//! Twilio SMS client
//!
//! Direct HTTP client for the Twilio Messages REST API.

use crate::config::SmsConfig;
use crate::notify::{NotificationError, SmsMessage, SmsTransport};
use async_trait::async_trait;
use serde::Deserialize;

/// Error payload returned by Twilio on failure
#[derive(Debug, Deserialize)]
struct TwilioErrorBody {
    code: Option<i64>,
    message: Option<String>,
}

/// SMS transport backed by Twilio
#[derive(Clone)]
pub struct TwilioSms {
    client: reqwest::Client,
    account_sid: String,
    auth_token: String,
    base_url: String,
}

impl TwilioSms {
    /// Create a client from credentials
    ///
    /// # Arguments
    /// * `client` - Shared HTTP client (connection pooling)
    /// * `config` - Account SID, auth token and API base URL
    pub fn new(client: reqwest::Client, config: &SmsConfig) -> Self {
        Self {
            client,
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        )
    }
}

#[async_trait]
impl SmsTransport for TwilioSms {
    async fn send(&self, message: &SmsMessage) -> Result<(), NotificationError> {
        let url = self.messages_url();

        tracing::debug!(
            url = %url,
            to = %message.to,
            body_len = message.body.len(),
            "Sending SMS via Twilio"
        );

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[
                ("To", message.to.as_str()),
                ("From", message.from.as_str()),
                ("Body", message.body.as_str()),
            ])
            .send()
            .await
            .map_err(|e| NotificationError::Http(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let status_code = status.as_u16();
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error body".to_string());

        let message = match serde_json::from_str::<TwilioErrorBody>(&error_body) {
            Ok(TwilioErrorBody {
                message: Some(message),
                code,
            }) => match code {
                Some(code) => format!("{} (code {})", message, code),
                None => message,
            },
            _ => error_body,
        };

        tracing::error!(
            status_code = status_code,
            error = %message,
            "Twilio API returned error status"
        );

        Err(NotificationError::Provider {
            status: status_code,
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn sms_config(base_url: &str) -> SmsConfig {
        SmsConfig {
            account_sid: "AC123".to_string(),
            auth_token: "secret".to_string(),
            api_base_url: base_url.to_string(),
        }
    }

    fn sms() -> SmsMessage {
        SmsMessage {
            from: "+15005550006".to_string(),
            to: "+92300".to_string(),
            body: "Thank you Ali! Your order A1 was received. Total PKR 250.".to_string(),
        }
    }

    #[tokio::test]
    async fn test_send_sms_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/2010-04-01/Accounts/AC123/Messages.json")
            .match_header("authorization", "Basic QUMxMjM6c2VjcmV0")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("To".into(), "+92300".into()),
                Matcher::UrlEncoded("From".into(), "+15005550006".into()),
                Matcher::UrlEncoded(
                    "Body".into(),
                    "Thank you Ali! Your order A1 was received. Total PKR 250.".into(),
                ),
            ]))
            .with_status(201)
            .with_body(r#"{"sid": "SM123", "status": "queued"}"#)
            .create_async()
            .await;

        let client = TwilioSms::new(reqwest::Client::new(), &sms_config(&server.url()));
        let result = client.send(&sms()).await;

        mock.assert_async().await;
        assert!(result.is_ok(), "send failed: {:?}", result);
    }

    #[tokio::test]
    async fn test_send_sms_provider_error_message() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/2010-04-01/Accounts/AC123/Messages.json")
            .with_status(400)
            .with_body(
                r#"{"code": 21211, "message": "The 'To' number +92300 is not a valid phone number.", "status": 400}"#,
            )
            .create_async()
            .await;

        let client = TwilioSms::new(reqwest::Client::new(), &sms_config(&server.url()));
        let result = client.send(&sms()).await;

        mock.assert_async().await;
        match result {
            Err(NotificationError::Provider { status, message }) => {
                assert_eq!(status, 400);
                assert!(message.contains("not a valid phone number"));
                assert!(message.contains("21211"));
            }
            other => panic!("Expected Provider error, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_send_sms_non_json_error_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/2010-04-01/Accounts/AC123/Messages.json")
            .with_status(503)
            .with_body("Service Unavailable")
            .create_async()
            .await;

        let client = TwilioSms::new(reqwest::Client::new(), &sms_config(&server.url()));
        let result = client.send(&sms()).await;

        mock.assert_async().await;
        assert_eq!(
            result,
            Err(NotificationError::Provider {
                status: 503,
                message: "Service Unavailable".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_trailing_slash_in_base_url() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/2010-04-01/Accounts/AC123/Messages.json")
            .with_status(201)
            .with_body("{}")
            .create_async()
            .await;

        let base = format!("{}/", server.url());
        let client = TwilioSms::new(reqwest::Client::new(), &sms_config(&base));
        assert!(client.send(&sms()).await.is_ok());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_http_error() {
        // Port 9 (discard) on localhost is expected to refuse connections.
        let client = TwilioSms::new(
            reqwest::Client::new(),
            &sms_config("http://127.0.0.1:9"),
        );
        let result = client.send(&sms()).await;
        assert!(matches!(result, Err(NotificationError::Http(_))));
    }
}
