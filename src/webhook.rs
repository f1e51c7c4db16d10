use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use metrics::increment_counter;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use serde_json::json;
use subtle::ConstantTimeEq;

use crate::{
    bot::Bot,
    command,
    telemetry::{BOT_COMMANDS, WEBHOOK_UPDATES},
    telegram::MessageSender,
};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct WebhookState {
    pub bot: Arc<Bot>,
    pub sender: Arc<dyn MessageSender>,
    /// The bot token; doubles as the secret path segment Telegram posts to.
    pub token: Arc<str>,
    pub metrics_handle: Option<PrometheusHandle>,
}

impl WebhookState {
    pub fn new(bot: Arc<Bot>, sender: Arc<dyn MessageSender>, token: &str) -> Self {
        Self {
            bot,
            sender,
            token: Arc::from(token),
            metrics_handle: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics_handle = Some(handle);
        self
    }
}

// Only the parts of a Telegram update the bot reads.
#[derive(Debug, Deserialize)]
pub struct Update {
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub chat: Option<Chat>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

pub fn create_router(state: WebhookState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_endpoint))
        .route("/webhook/:token", post(telegram_webhook))
        .with_state(state)
}

async fn home() -> &'static str {
    "API do Bot Finanza está no ar!"
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn metrics_endpoint(State(state): State<WebhookState>) -> Response {
    match state.metrics_handle {
        Some(handle) => handle.render().into_response(),
        None => (StatusCode::NOT_FOUND, "metrics disabled").into_response(),
    }
}

fn token_matches(given: &str, expected: &str) -> bool {
    !expected.is_empty() && bool::from(given.as_bytes().ct_eq(expected.as_bytes()))
}

fn status(code: StatusCode, status: &str) -> Response {
    (code, Json(json!({ "status": status }))).into_response()
}

async fn telegram_webhook(
    State(state): State<WebhookState>,
    Path(token): Path<String>,
    payload: Result<Json<Update>, JsonRejection>,
) -> Response {
    if !token_matches(&token, &state.token) {
        tracing::warn!("Webhook called with an unknown token");
        return StatusCode::NOT_FOUND.into_response();
    }

    let Json(update) = match payload {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!("Unreadable update: {}", e);
            increment_counter!(WEBHOOK_UPDATES, "outcome" => "rejected");
            return status(StatusCode::BAD_REQUEST, "erro");
        }
    };

    let Some(message) = update.message else {
        tracing::info!("Update ignored (not a text message)");
        increment_counter!(WEBHOOK_UPDATES, "outcome" => "ignored");
        return status(StatusCode::OK, "ok");
    };
    let Some(text) = message.text else {
        tracing::info!("Update ignored (not a text message)");
        increment_counter!(WEBHOOK_UPDATES, "outcome" => "ignored");
        return status(StatusCode::OK, "ok");
    };
    let Some(chat) = message.chat else {
        tracing::error!("Text message without a chat");
        increment_counter!(WEBHOOK_UPDATES, "outcome" => "rejected");
        return status(StatusCode::BAD_REQUEST, "erro");
    };

    let command = command::parse(&text);
    tracing::info!(chat_id = chat.id, command = command.name(), "Message received");
    increment_counter!(BOT_COMMANDS, "command" => command.name());

    let bot = state.bot.clone();
    let reply = match tokio::task::spawn_blocking(move || bot.reply(&command)).await {
        Ok(reply) => reply,
        Err(e) => {
            tracing::error!("Command task failed: {}", e);
            increment_counter!(WEBHOOK_UPDATES, "outcome" => "failed");
            return status(StatusCode::INTERNAL_SERVER_ERROR, "erro");
        }
    };

    match state.sender.send_message(chat.id, &reply).await {
        Ok(()) => tracing::info!(chat_id = chat.id, "Reply sent"),
        Err(e) => tracing::error!(chat_id = chat.id, "Failed to send reply: {}", e),
    }
    increment_counter!(WEBHOOK_UPDATES, "outcome" => "handled");

    status(StatusCode::OK, "ok")
}
