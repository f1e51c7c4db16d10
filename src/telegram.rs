//! Outbound calls to the Telegram Bot API.
//!
//! API endpoint: `<api_base>/bot<token>/<method>`

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::config::TelegramConfig;

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Telegram returned HTTP {status}: {body}")]
    Api { status: u16, body: String },
    #[error("Telegram rejected the request: {0}")]
    Rejected(String),
}

/// Delivers a chat reply. The webhook handler only sees this trait.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TelegramError>;
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

pub struct TelegramClient {
    client: reqwest::Client,
    api_base: String,
    token: String,
}

impl TelegramClient {
    pub fn new(config: &TelegramConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    /// The address Telegram should POST updates to, given the server's public base URL.
    pub fn webhook_url(&self, public_url: &str) -> String {
        format!("{}/webhook/{}", public_url.trim_end_matches('/'), self.token)
    }

    pub async fn set_webhook(&self, public_url: &str) -> Result<(), TelegramError> {
        let body = serde_json::json!({ "url": self.webhook_url(public_url) });
        self.call("setWebhook", &body).await
    }

    async fn call(&self, method: &str, body: &serde_json::Value) -> Result<(), TelegramError> {
        let response = self
            .client
            .post(self.method_url(method))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TelegramError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ApiResponse = response.json().await?;
        if !parsed.ok {
            return Err(TelegramError::Rejected(
                parsed.description.unwrap_or_else(|| method.to_string()),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl MessageSender for TelegramClient {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });
        self.call("sendMessage", &body).await
    }
}
