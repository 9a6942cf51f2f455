//! # Telegram Client Tests
//!
//! Runs `TelegramClient` against a `wiremock` stand-in for the Bot API.

mod common;

use adwise::{errors::TransportError, providers::document::DocumentSource, DocumentRef};
use adwise_bot::announce;
use anyhow::Result;
use common::{api_path, document_update, ok, sent_message, telegram_client, text_update, TOKEN};
use serde_json::{json, Value};
use wiremock::{
    matchers::{body_partial_json, method, path},
    Mock, MockServer, ResponseTemplate,
};

#[tokio::test]
async fn test_get_updates_sends_offset_and_parses_result() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(api_path("getUpdates")))
        .and(body_partial_json(json!({"offset": 41, "timeout": 0})))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok(json!([
            text_update(41, 7, "/start"),
            document_update(42, 7, "file-9", "application/pdf"),
            {"update_id": 43, "my_chat_member": {}}
        ]))))
        .expect(1)
        .mount(&server)
        .await;

    let updates = telegram_client(&server).get_updates(Some(41), 0).await?;

    assert_eq!(updates.len(), 3);
    let first = updates[0].message.as_ref().unwrap();
    assert_eq!(first.chat.id, 7);
    assert_eq!(first.text.as_deref(), Some("/start"));
    let document = updates[1].message.as_ref().unwrap().document.as_ref().unwrap();
    assert_eq!(document.file_id, "file-9");
    assert!(updates[2].message.is_none());
    Ok(())
}

#[tokio::test]
async fn test_send_message_splits_long_text_in_order() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(api_path("sendMessage")))
        .respond_with(ResponseTemplate::new(200).set_body_json(sent_message(7)))
        .expect(3)
        .mount(&server)
        .await;

    let first = format!("{}\n", "a".repeat(3000));
    let second = format!("{}\n", "b".repeat(3000));
    let third = "c".repeat(1500);
    let text = format!("{first}{second}{third}");

    telegram_client(&server).send_message(7, &text).await?;

    let requests = server.received_requests().await.unwrap_or_default();
    let bodies: Vec<Value> = requests
        .iter()
        .map(|r| serde_json::from_slice(&r.body))
        .collect::<Result<_, _>>()?;
    assert_eq!(bodies.len(), 3);
    assert!(bodies.iter().all(|b| b["chat_id"] == 7));
    assert_eq!(bodies[0]["text"], first);
    assert_eq!(bodies[1]["text"], second);
    assert_eq!(bodies[2]["text"], third);
    Ok(())
}

#[tokio::test]
async fn test_api_error_carries_description() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(api_path("sendMessage")))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "ok": false,
            "error_code": 403,
            "description": "Forbidden: bot was blocked by the user"
        })))
        .mount(&server)
        .await;

    let result = telegram_client(&server).send_message(7, "hello").await;

    match result {
        Err(TransportError::Api(description)) => {
            assert_eq!(description, "Forbidden: bot was blocked by the user")
        }
        other => panic!("expected an API error, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn test_non_json_reply_is_deserialization_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let result = telegram_client(&server).get_updates(None, 0).await;

    assert!(matches!(result, Err(TransportError::Deserialization(_))));
}

#[tokio::test]
async fn test_document_download_resolves_file_path() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(api_path("getFile")))
        .and(body_partial_json(json!({"file_id": "file-9"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok(json!({
            "file_id": "file-9",
            "file_unique_id": "u9",
            "file_size": 9,
            "file_path": "documents/file_9.pdf"
        }))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/file/bot{TOKEN}/documents/file_9.pdf")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.4 ".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let client = telegram_client(&server);
    let bytes = client
        .download(&DocumentRef::new("file-9").with_mime_type("application/pdf"))
        .await?;

    assert_eq!(bytes, b"%PDF-1.4 ");
    Ok(())
}

#[tokio::test]
async fn test_document_without_path_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(api_path("getFile")))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok(json!({"file_id": "big"}))))
        .mount(&server)
        .await;

    let result = telegram_client(&server)
        .download(&DocumentRef::new("big"))
        .await;

    assert!(matches!(result, Err(TransportError::Api(_))));
}

#[tokio::test]
async fn test_set_and_delete_webhook() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(api_path("setWebhook")))
        .and(body_partial_json(json!({
            "url": "https://bot.example/telegram/webhook",
            "secret_token": "s3cret"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok(json!(true))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(api_path("deleteWebhook")))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok(json!(true))))
        .expect(1)
        .mount(&server)
        .await;

    let client = telegram_client(&server);
    assert!(
        client
            .set_webhook("https://bot.example/telegram/webhook", Some("s3cret"))
            .await?
    );
    assert!(client.delete_webhook().await?);
    Ok(())
}

#[tokio::test]
async fn test_announce_greets_each_pending_chat_once() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(api_path("getUpdates")))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok(json!([
            text_update(1, 300, "hi"),
            text_update(2, 100, "hello"),
            text_update(3, 300, "anyone?")
        ]))))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(api_path("sendMessage")))
        .respond_with(ResponseTemplate::new(200).set_body_json(sent_message(0)))
        .expect(2)
        .mount(&server)
        .await;

    let greeted = announce(&telegram_client(&server)).await?;

    assert_eq!(greeted, 2);
    let requests = server.received_requests().await.unwrap_or_default();
    let chats: Vec<i64> = requests
        .iter()
        .filter(|r| r.url.path().ends_with("/sendMessage"))
        .map(|r| serde_json::from_slice::<Value>(&r.body).map(|b| b["chat_id"].as_i64()))
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .flatten()
        .collect();
    assert_eq!(chats, vec![100, 300]);
    Ok(())
}
