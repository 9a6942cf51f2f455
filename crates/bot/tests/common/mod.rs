//! # Common Test Utilities
//!
//! Harness pieces shared by the `adwise-bot` integration tests: a recording
//! message sink, Telegram update fixtures and a handler wired to mocks.

// Not every test file uses every helper.
#![allow(unused)]

use adwise::{errors::TransportError, Conversation};
use adwise_bot::{
    dispatcher::{Dispatcher, UpdateHandler},
    telegram::{MessageSink, TelegramClient},
};
use adwise_test_utils::{MockAiProvider, MockBenchmarkSource, MockDocumentSource, MockTextExtractor};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};
use wiremock::MockServer;

pub const TOKEN: &str = "TEST";

pub fn init_tracing() {
    // `try_init` is used to prevent panic if the logger is already initialized.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .try_init();
}

// --- Recording sink ---

#[derive(Clone, Default)]
pub struct RecordingSink {
    sent: Arc<Mutex<Vec<(i64, String)>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<(i64, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn for_chat(&self, chat_id: i64) -> Vec<String> {
        self.all()
            .into_iter()
            .filter(|(id, _)| *id == chat_id)
            .map(|(_, text)| text)
            .collect()
    }

    /// Waits until at least `count` messages were sent, or panics after two seconds.
    pub async fn wait_for(&self, count: usize) -> Vec<(i64, String)> {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        loop {
            let sent = self.all();
            if sent.len() >= count {
                return sent;
            }
            if tokio::time::Instant::now() > deadline {
                panic!("expected {count} messages, got {}: {sent:?}", sent.len());
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

#[async_trait]
impl MessageSink for RecordingSink {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TransportError> {
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }
}

// --- Handler harness ---

pub struct Mocks {
    pub ai: MockAiProvider,
    pub documents: MockDocumentSource,
    pub extractor: MockTextExtractor,
}

impl Mocks {
    pub fn new() -> Self {
        Self {
            ai: MockAiProvider::new(),
            documents: MockDocumentSource::new(),
            extractor: MockTextExtractor::new(),
        }
    }

    pub fn handler(&self, upload_branch: bool, benchmarks: MockBenchmarkSource) -> UpdateHandler {
        let conversation = Conversation::builder()
            .ai_provider(Arc::new(self.ai.clone()))
            .document_source(Arc::new(self.documents.clone()))
            .text_extractor(Arc::new(self.extractor.clone()))
            .upload_branch(upload_branch)
            .build()
            .expect("conversation should build");
        UpdateHandler::new(
            Arc::new(conversation),
            Arc::new(self.ai.clone()),
            Arc::new(benchmarks),
        )
    }

    pub fn dispatcher(&self, sink: &RecordingSink, idle_timeout: Duration) -> Dispatcher {
        Dispatcher::new(
            self.handler(true, MockBenchmarkSource::with_content("CPC: $2.69")),
            Arc::new(sink.clone()),
            idle_timeout,
        )
    }
}

// --- Telegram fixtures ---

pub fn telegram_client(server: &MockServer) -> TelegramClient {
    TelegramClient::new(&server.uri(), TOKEN, Some(Duration::from_secs(5)))
        .expect("client should build")
}

pub fn api_path(method: &str) -> String {
    format!("/bot{TOKEN}/{method}")
}

pub fn ok(result: Value) -> Value {
    json!({ "ok": true, "result": result })
}

pub fn text_update(update_id: i64, chat_id: i64, text: &str) -> Value {
    json!({
        "update_id": update_id,
        "message": {
            "message_id": update_id,
            "date": 1_700_000_000,
            "chat": {"id": chat_id, "type": "private"},
            "text": text
        }
    })
}

pub fn document_update(update_id: i64, chat_id: i64, file_id: &str, mime_type: &str) -> Value {
    json!({
        "update_id": update_id,
        "message": {
            "message_id": update_id,
            "date": 1_700_000_000,
            "chat": {"id": chat_id, "type": "private"},
            "document": {"file_id": file_id, "file_name": "profile.pdf", "mime_type": mime_type}
        }
    })
}

pub fn sent_message(chat_id: i64) -> Value {
    ok(json!({"message_id": 1, "date": 1_700_000_000, "chat": {"id": chat_id}}))
}
