use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use finanza::{
    bot::Bot,
    storage::StorageBackend,
    telegram::{MessageSender, TelegramError},
    webhook::{create_router, WebhookState},
};
use finanza_core::{AmountPolicy, IsoDate};
use finanza_memory::InMemoryStorage;
use tower::ServiceExt;

const TOKEN: &str = "123:abc";

#[derive(Default)]
struct RecordingSender {
    sent: Mutex<Vec<(i64, String)>>,
    fail: bool,
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        if self.fail {
            return Err(TelegramError::Rejected("chat not found".to_string()));
        }
        Ok(())
    }
}

fn fixed_day() -> IsoDate {
    IsoDate::parse("2024-01-05").unwrap()
}

fn app(sender: Arc<RecordingSender>) -> (Router, Arc<InMemoryStorage>) {
    let storage = Arc::new(InMemoryStorage::new());
    let bot = Arc::new(Bot::with_clock(storage.clone(), AmountPolicy::default(), fixed_day));
    let state = WebhookState::new(bot, sender, TOKEN);
    (create_router(state), storage)
}

fn update(json: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/webhook/{}", TOKEN))
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

fn text_update(chat_id: i64, text: &str) -> Request<Body> {
    let body = serde_json::json!({
        "update_id": 1,
        "message": { "message_id": 10, "chat": { "id": chat_id }, "text": text }
    });
    update(&body.to_string())
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_home_and_health() {
    let (app, _) = app(Arc::default());

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    assert_eq!(&bytes[..], "API do Bot Finanza está no ar!".as_bytes());

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_text_update_is_answered() {
    let sender = Arc::new(RecordingSender::default());
    let (app, storage) = app(sender.clone());

    let response = app
        .clone()
        .oneshot(text_update(42, "/add despesa 50 mercado"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!({ "status": "ok" }));

    let response = app.oneshot(text_update(42, "  /saldo  ")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let sent = sender.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].0, 42);
    assert!(sent[0].1.contains("Adicionado com ID 1"));
    assert!(sent[1].1.ends_with("💰 Saldo: R$ -50.00"));

    let rows = storage.list_all().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].date.as_str(), "2024-01-05");
}

#[tokio::test]
async fn test_non_text_updates_are_ignored() {
    let sender = Arc::new(RecordingSender::default());
    let (app, _) = app(sender.clone());

    let response = app
        .clone()
        .oneshot(update(r#"{"update_id": 2, "edited_message": {"chat": {"id": 1}, "text": "/saldo"}}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(update(r#"{"update_id": 3, "message": {"chat": {"id": 1}, "sticker": {}}}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!({ "status": "ok" }));

    assert!(sender.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let sender = Arc::new(RecordingSender::default());
    let (app, _) = app(sender.clone());

    let response = app.clone().oneshot(update("not json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, serde_json::json!({ "status": "erro" }));

    let response = app
        .oneshot(update(r#"{"message": {"text": "/saldo"}}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert!(sender.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_wrong_token_is_not_found() {
    let sender = Arc::new(RecordingSender::default());
    let (app, storage) = app(sender.clone());

    let request = Request::builder()
        .method("POST")
        .uri("/webhook/999:zzz")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"message": {"chat": {"id": 1}, "text": "/add receita 10 x"}}"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(sender.sent.lock().unwrap().is_empty());
    assert!(storage.list_all().unwrap().is_empty());
}

#[tokio::test]
async fn test_send_failure_still_acknowledges() {
    let sender = Arc::new(RecordingSender {
        fail: true,
        ..Default::default()
    });
    let (app, _) = app(sender.clone());

    let response = app.oneshot(text_update(7, "/ajuda")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(sender.sent.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_metrics_disabled_without_recorder() {
    let (app, _) = app(Arc::default());
    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
