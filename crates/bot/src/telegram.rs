//! # Telegram Bot API Client
//!
//! A thin client for the handful of Bot API methods the bot uses: long polling,
//! sending messages, downloading uploaded files and managing the webhook.

use adwise::{
    chunk::split_message, constants::MESSAGE_CHUNK_LIMIT, errors::TransportError,
    providers::document::DocumentSource, DocumentRef,
};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use std::{fmt, time::Duration};
use tracing::{debug, instrument};

/// Extra time allowed on top of a long-poll wait before the request is abandoned.
const LONG_POLL_GRACE: Duration = Duration::from_secs(10);

// --- Bot API types ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<Document>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub file_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl From<Document> for DocumentRef {
    fn from(document: Document) -> Self {
        DocumentRef {
            file_id: document.file_id,
            file_name: document.file_name,
            mime_type: document.mime_type,
        }
    }
}

/// The result of `getFile`.
#[derive(Debug, Clone, Deserialize)]
pub struct File {
    pub file_id: String,
    #[serde(default)]
    pub file_path: Option<String>,
}

#[derive(Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    #[serde(default = "Option::default")]
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

// --- Outbound seam ---

/// Delivers text to a chat.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TransportError>;
}

// --- Client ---

#[derive(Clone)]
pub struct TelegramClient {
    client: ReqwestClient,
    api_base: String,
    file_base: String,
    timeout: Option<Duration>,
}

impl fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The token is part of both base URLs.
        f.debug_struct("TelegramClient")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl TelegramClient {
    /// Creates a client for `base_url` (normally `https://api.telegram.org`).
    ///
    /// `timeout` bounds ordinary calls; long polls get their own deadline.
    pub fn new(
        base_url: &str,
        token: &str,
        timeout: Option<Duration>,
    ) -> Result<Self, TransportError> {
        let base_url = base_url.trim_end_matches('/');
        Ok(Self {
            client: ReqwestClient::builder().build()?,
            api_base: format!("{base_url}/bot{token}"),
            file_base: format!("{base_url}/file/bot{token}"),
            timeout,
        })
    }

    async fn call<P, T>(
        &self,
        method: &str,
        params: &P,
        timeout: Option<Duration>,
    ) -> Result<T, TransportError>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self
            .client
            .post(format!("{}/{method}", self.api_base))
            .json(params);
        if let Some(timeout) = timeout.or(self.timeout) {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        let parsed: ApiResponse<T> = serde_json::from_str(&body)
            .map_err(|e| TransportError::Deserialization(format!("{method} ({status}): {e}")))?;

        if !parsed.ok {
            return Err(TransportError::Api(
                parsed
                    .description
                    .unwrap_or_else(|| format!("{method} failed with status {status}")),
            ));
        }
        parsed
            .result
            .ok_or_else(|| TransportError::Deserialization(format!("{method}: missing result")))
    }

    /// Fetches pending updates, waiting up to `timeout_secs` for new ones.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TransportError> {
        let params = json!({
            "offset": offset,
            "timeout": timeout_secs,
            "allowed_updates": ["message"],
        });
        let deadline = Duration::from_secs(timeout_secs) + LONG_POLL_GRACE;
        self.call("getUpdates", &params, Some(deadline)).await
    }

    /// Sends `text`, split into as many messages as the length limit requires.
    #[instrument(skip(self, text), fields(chars = text.chars().count()))]
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TransportError> {
        for chunk in split_message(text, MESSAGE_CHUNK_LIMIT) {
            let params = json!({ "chat_id": chat_id, "text": chunk });
            let _: serde_json::Value = self.call("sendMessage", &params, None).await?;
        }
        Ok(())
    }

    pub async fn get_file(&self, file_id: &str) -> Result<File, TransportError> {
        self.call("getFile", &json!({ "file_id": file_id }), None)
            .await
    }

    /// Downloads a file by the `file_path` that `getFile` returned.
    pub async fn download_file(&self, file_path: &str) -> Result<Vec<u8>, TransportError> {
        let mut request = self
            .client
            .get(format!("{}/{file_path}", self.file_base));
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(TransportError::Api(format!(
                "file download failed with status {}",
                response.status()
            )));
        }
        Ok(response.bytes().await?.to_vec())
    }

    /// Registers `url` as the webhook. Telegram echoes `secret_token` back in the
    /// `X-Telegram-Bot-Api-Secret-Token` header of every delivery.
    pub async fn set_webhook(
        &self,
        url: &str,
        secret_token: Option<&str>,
    ) -> Result<bool, TransportError> {
        let mut params = json!({ "url": url, "allowed_updates": ["message"] });
        if let Some(secret) = secret_token {
            params["secret_token"] = json!(secret);
        }
        self.call("setWebhook", &params, None).await
    }

    pub async fn delete_webhook(&self) -> Result<bool, TransportError> {
        self.call("deleteWebhook", &json!({}), None).await
    }
}

#[async_trait]
impl MessageSink for TelegramClient {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TransportError> {
        TelegramClient::send_message(self, chat_id, text).await
    }
}

#[async_trait]
impl DocumentSource for TelegramClient {
    #[instrument(skip_all, fields(file_id = %document.file_id))]
    async fn download(&self, document: &DocumentRef) -> Result<Vec<u8>, TransportError> {
        let file = self.get_file(&document.file_id).await?;
        let file_path = file
            .file_path
            .ok_or_else(|| TransportError::Api(format!("file {} has no path", file.file_id)))?;
        debug!(%file_path, "Downloading document");
        self.download_file(&file_path).await
    }
}
