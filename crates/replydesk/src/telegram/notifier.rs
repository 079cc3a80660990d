//! Outbound notifier: delivers admin replies through the Bot API.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;

use crate::core::config;
use crate::core::error::{AppError, AppResult};
use crate::core::logging::mask_token;

/// What happened to a reply after it was handed to the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Failed(String),
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered)
    }
}

/// Sends a text to a chat.
///
/// Implementations never return an error: every failure is reported as
/// [`DeliveryOutcome::Failed`] so the caller decides what to do with it.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_message(&self, recipient: &str, text: &str) -> DeliveryOutcome;
}

/// Envelope every Bot API method answers with.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Bot API client for `sendMessage` and `setWebhook`.
pub struct TelegramNotifier {
    client: Client,
    api_url: String,
    token: SecretString,
}

impl TelegramNotifier {
    /// # Arguments
    /// * `api_url` - Bot API base, e.g. `https://api.telegram.org`
    /// * `token` - Bot token
    pub fn new(api_url: &str, token: &SecretString) -> AppResult<Self> {
        let client = Client::builder().timeout(config::network::timeout()).build()?;
        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token: SecretString::from(token.expose_secret()),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.token.expose_secret(), method)
    }

    async fn call(&self, method: &str, payload: serde_json::Value) -> Result<(), String> {
        let url = self.method_url(method);
        let masked = mask_token(&url, self.token.expose_secret());

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            // reqwest errors embed the full URL, token included
            .map_err(|e| format!("request to {} failed: {}", masked, e.without_url()))?;

        let status = response.status();
        let body: Option<ApiResponse> = response.json().await.ok();

        match body {
            Some(ApiResponse { ok: true, .. }) if status.is_success() => Ok(()),
            Some(ApiResponse { description, .. }) => Err(format!(
                "{} answered {}: {}",
                masked,
                status,
                description.unwrap_or_else(|| "no description".to_string())
            )),
            None => Err(format!("{} answered {} with an unreadable body", masked, status)),
        }
    }

    /// Register `webhook_url` as the destination for bot updates.
    pub async fn set_webhook(&self, webhook_url: &str, secret_token: Option<&str>) -> AppResult<()> {
        let mut payload = json!({ "url": webhook_url });
        if let Some(secret) = secret_token {
            payload["secret_token"] = json!(secret);
        }

        self.call("setWebhook", payload)
            .await
            .map_err(|reason| AppError::Anyhow(anyhow::anyhow!("setWebhook failed: {}", reason)))?;

        log::info!("Webhook registered: {}", webhook_url);
        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_message(&self, recipient: &str, text: &str) -> DeliveryOutcome {
        // Numeric chat ids go out as numbers, @channel names as strings.
        let chat_id = match recipient.parse::<i64>() {
            Ok(id) => json!(id),
            Err(_) => json!(recipient),
        };

        match self.call("sendMessage", json!({ "chat_id": chat_id, "text": text })).await {
            Ok(()) => {
                log::info!("Reply delivered to {}", recipient);
                DeliveryOutcome::Delivered
            }
            Err(reason) => {
                log::error!("Failed to deliver reply to {}: {}", recipient, reason);
                DeliveryOutcome::Failed(reason)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TOKEN: &str = "123:TEST";

    fn notifier(server: &MockServer) -> TelegramNotifier {
        TelegramNotifier::new(&server.uri(), &SecretString::from(TOKEN)).unwrap()
    }

    #[tokio::test]
    async fn test_send_message_delivered() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bot123:TEST/sendMessage"))
            .and(body_json(json!({"chat_id": 42, "text": "hello"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": {}})))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = notifier(&server).send_message("42", "hello").await;

        assert_eq!(outcome, DeliveryOutcome::Delivered);
    }

    #[tokio::test]
    async fn test_send_message_to_channel_name() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bot123:TEST/sendMessage"))
            .and(body_json(json!({"chat_id": "@news", "text": "hi"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": {}})))
            .expect(1)
            .mount(&server)
            .await;

        assert!(notifier(&server).send_message("@news", "hi").await.is_delivered());
    }

    #[tokio::test]
    async fn test_api_error_is_failed_outcome() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bot123:TEST/sendMessage"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"ok": false, "description": "Bad Request: chat not found"})),
            )
            .mount(&server)
            .await;

        let outcome = notifier(&server).send_message("42", "hello").await;

        match outcome {
            DeliveryOutcome::Failed(reason) => {
                assert!(reason.contains("chat not found"));
                assert!(!reason.contains(TOKEN));
            }
            DeliveryOutcome::Delivered => panic!("expected failure"),
        }
    }

    #[tokio::test]
    async fn test_transport_error_is_failed_outcome() {
        let server = MockServer::start().await;
        let uri = server.uri();
        drop(server);

        let notifier = TelegramNotifier::new(&uri, &SecretString::from(TOKEN)).unwrap();
        let outcome = notifier.send_message("42", "hello").await;

        assert!(matches!(outcome, DeliveryOutcome::Failed(ref reason) if !reason.contains(TOKEN)));
    }

    #[tokio::test]
    async fn test_set_webhook_with_secret() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bot123:TEST/setWebhook"))
            .and(body_json(json!({"url": "https://example.com/webhook", "secret_token": "s3cret"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": true})))
            .expect(1)
            .mount(&server)
            .await;

        notifier(&server)
            .set_webhook("https://example.com/webhook", Some("s3cret"))
            .await
            .unwrap();
    }
}
