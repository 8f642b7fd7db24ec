//! Integration tests for `TelegramClient` against a mock Bot API.

use std::time::Duration;

use critics_core::transport::{Button, ChatTransport};
use critics_telegram::client::TelegramClient;
use critics_telegram::error::TelegramError;
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "123:TEST";

fn client_for(server: &MockServer) -> TelegramClient {
    TelegramClient::new(&server.uri(), TOKEN, Duration::from_secs(1)).unwrap()
}

fn ok(result: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "result": result }))
}

fn sent_message() -> serde_json::Value {
    json!({ "message_id": 5, "chat": { "id": 70, "type": "private" }, "text": "hi" })
}

#[tokio::test]
async fn test_send_message_posts_text_and_keyboard() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{TOKEN}/sendMessage")))
        .and(body_json(json!({
            "chat_id": 70,
            "text": "Pick one",
            "reply_markup": {
                "inline_keyboard": [[{ "text": "Cancel", "callback_data": "cancel" }]]
            }
        })))
        .respond_with(ok(sent_message()))
        .expect(1)
        .mount(&server)
        .await;
    let client = client_for(&server);

    client
        .send_message(70, "Pick one", &[Button::new("Cancel", "cancel")])
        .await
        .unwrap();
}

#[tokio::test]
async fn test_rejected_edit_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{TOKEN}/editMessageText")))
        .and(body_partial_json(json!({ "chat_id": 70, "message_id": 99 })))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: message to edit not found"
        })))
        .mount(&server)
        .await;
    let client = client_for(&server);

    let result = client.edit_message(70, 99, "Updated", &[]).await;

    let err = result.unwrap_err();
    assert!(err.to_string().contains("message to edit not found"));
}

#[tokio::test]
async fn test_answer_callback_acknowledges_query() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{TOKEN}/answerCallbackQuery")))
        .and(body_json(json!({ "callback_query_id": "cb-1" })))
        .respond_with(ok(json!(true)))
        .expect(1)
        .mount(&server)
        .await;
    let client = client_for(&server);

    client.answer_callback("cb-1").await.unwrap();
}

#[tokio::test]
async fn test_get_updates_sends_offset_and_parses_updates() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{TOKEN}/getUpdates")))
        .and(body_partial_json(json!({
            "offset": 41,
            "timeout": 30,
            "allowed_updates": ["message", "callback_query"]
        })))
        .respond_with(ok(json!([
            {
                "update_id": 41,
                "message": {
                    "message_id": 1,
                    "from": { "id": 7, "is_bot": false, "first_name": "Ana" },
                    "chat": { "id": 7, "type": "private" },
                    "text": "/start"
                }
            }
        ])))
        .mount(&server)
        .await;
    let client = client_for(&server);

    let updates = client.get_updates(Some(41), 30).await.unwrap();

    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].update_id, 41);
    assert_eq!(
        updates[0].message.as_ref().and_then(|m| m.text.as_deref()),
        Some("/start")
    );
}

#[tokio::test]
async fn test_download_file_resolves_path_then_fetches_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{TOKEN}/getFile")))
        .and(body_json(json!({ "file_id": "AwADBAAD" })))
        .respond_with(ok(json!({
            "file_id": "AwADBAAD",
            "file_unique_id": "u",
            "file_size": 3,
            "file_path": "voice/file_1.oga"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/file/bot{TOKEN}/voice/file_1.oga")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x4F, 0x67, 0x67]))
        .mount(&server)
        .await;
    let client = client_for(&server);

    let bytes = client.download_file("AwADBAAD").await.unwrap();

    assert_eq!(bytes, vec![0x4F, 0x67, 0x67]);
}

#[tokio::test]
async fn test_download_without_file_path_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{TOKEN}/getFile")))
        .respond_with(ok(json!({ "file_id": "big", "file_unique_id": "u" })))
        .mount(&server)
        .await;
    let client = client_for(&server);

    let result = client.download_file("big").await;

    assert!(matches!(result, Err(TelegramError::MissingFilePath(id)) if id == "big"));
}

#[tokio::test]
async fn test_transport_errors_do_not_leak_the_token() {
    let client =
        TelegramClient::new("http://127.0.0.1:1", "999:SECRET", Duration::from_secs(1)).unwrap();

    let err = client.get_me().await.unwrap_err();

    assert!(matches!(err, TelegramError::Transport(_)));
    assert!(!err.to_string().contains("SECRET"));
}
