//! # Update Dispatcher
//!
//! Classifies inbound Telegram updates and runs them through the conversation
//! controller or the stateless commands.
//!
//! Every chat gets its own queue drained by a single worker task, so a chat's
//! updates are handled strictly in arrival order while different chats proceed
//! in parallel. A worker that sits idle for `idle_timeout` removes itself.

use crate::telegram::{MessageSink, Update};
use adwise::{
    commands::{self, parse_command, Command},
    providers::{ai::AiProvider, benchmark::BenchmarkSource},
    Conversation, DocumentRef, SessionId,
};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, instrument, Instrument};

/// How long a chat worker waits for its next update before exiting.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(300);

/// What the user sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Text(String),
    Document(DocumentRef),
}

/// An inbound message addressed to one chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatUpdate {
    pub chat_id: i64,
    pub inbound: Inbound,
}

impl ChatUpdate {
    /// Extracts the part of an update the bot reacts to.
    ///
    /// Returns `None` for updates without a message, or with neither text nor a
    /// document (stickers, photos, service messages).
    pub fn from_update(update: Update) -> Option<Self> {
        let message = update.message?;
        let inbound = match (message.document, message.text) {
            (Some(document), _) => Inbound::Document(document.into()),
            (None, Some(text)) => Inbound::Text(text),
            (None, None) => return None,
        };
        Some(Self {
            chat_id: message.chat.id,
            inbound,
        })
    }
}

/// Turns one inbound message into the messages to send back.
#[derive(Clone)]
pub struct UpdateHandler {
    conversation: Arc<Conversation>,
    ai_provider: Arc<dyn AiProvider>,
    benchmarks: Arc<dyn BenchmarkSource>,
}

impl UpdateHandler {
    pub fn new(
        conversation: Arc<Conversation>,
        ai_provider: Arc<dyn AiProvider>,
        benchmarks: Arc<dyn BenchmarkSource>,
    ) -> Self {
        Self {
            conversation,
            ai_provider,
            benchmarks,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    #[instrument(skip_all, fields(chat_id = update.chat_id))]
    pub async fn handle(&self, update: ChatUpdate) -> Vec<String> {
        let session = SessionId::from(update.chat_id);
        match update.inbound {
            Inbound::Document(document) => {
                self.conversation
                    .submit_document(&session, document)
                    .await
                    .messages
            }
            Inbound::Text(text) => match parse_command(&text) {
                Some((Command::Start, _)) => {
                    self.conversation.begin_session(&session).await.messages
                }
                Some((Command::Cancel, _)) => self.conversation.cancel(&session).await.messages,
                Some((Command::Trends, _)) => commands::trends(self.benchmarks.as_ref()).await,
                Some((Command::Faq, question)) => {
                    commands::faq(self.ai_provider.as_ref(), question).await
                }
                Some((Command::Help, _)) => vec![commands::help()],
                Some((Command::Unknown(name), _)) => {
                    debug!(command = %name, "Ignoring unknown command");
                    Vec::new()
                }
                None => self.conversation.advance(&session, &text).await.messages,
            },
        }
    }
}

type WorkerMap = Arc<Mutex<HashMap<i64, UnboundedSender<ChatUpdate>>>>;

/// Routes updates to per-chat workers.
#[derive(Clone)]
pub struct Dispatcher {
    handler: UpdateHandler,
    sink: Arc<dyn MessageSink>,
    workers: WorkerMap,
    idle_timeout: Duration,
}

impl Dispatcher {
    pub fn new(
        handler: UpdateHandler,
        sink: Arc<dyn MessageSink>,
        idle_timeout: Duration,
    ) -> Self {
        Self {
            handler,
            sink,
            workers: Arc::new(Mutex::new(HashMap::new())),
            idle_timeout,
        }
    }

    /// Queues `update` behind any earlier updates for the same chat.
    pub fn dispatch(&self, update: ChatUpdate) {
        let mut workers = self.workers.lock().unwrap_or_else(|e| e.into_inner());
        let chat_id = update.chat_id;

        let update = match workers.get(&chat_id) {
            Some(tx) => match tx.send(update) {
                Ok(()) => return,
                // The worker is gone (it panicked); start a fresh one.
                Err(mpsc::error::SendError(update)) => update,
            },
            None => update,
        };

        let (tx, rx) = mpsc::unbounded_channel();
        // The receiver is still alive at this point.
        let _ = tx.send(update);
        workers.insert(chat_id, tx.clone());
        debug!(chat_id, "Spawning chat worker");

        let worker = ChatWorker {
            chat_id,
            handler: self.handler.clone(),
            sink: Arc::clone(&self.sink),
            workers: Arc::clone(&self.workers),
            idle_timeout: self.idle_timeout,
            own_sender: tx,
        };
        tokio::spawn(
            worker
                .run(rx)
                .instrument(tracing::info_span!("chat_worker", chat_id)),
        );
    }

    /// Number of chats with a live worker.
    pub fn active_chats(&self) -> usize {
        self.workers.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

struct ChatWorker {
    chat_id: i64,
    handler: UpdateHandler,
    sink: Arc<dyn MessageSink>,
    workers: WorkerMap,
    idle_timeout: Duration,
    own_sender: UnboundedSender<ChatUpdate>,
}

impl ChatWorker {
    async fn run(self, mut rx: UnboundedReceiver<ChatUpdate>) {
        loop {
            match tokio::time::timeout(self.idle_timeout, rx.recv()).await {
                Ok(Some(update)) => self.process(update).await,
                Ok(None) => break,
                Err(_) => {
                    // Retire under the map lock so no update can slip in between
                    // the emptiness check and the removal.
                    let mut workers = self.workers.lock().unwrap_or_else(|e| e.into_inner());
                    if !rx.is_empty() {
                        continue;
                    }
                    if workers
                        .get(&self.chat_id)
                        .is_some_and(|tx| tx.same_channel(&self.own_sender))
                    {
                        workers.remove(&self.chat_id);
                    }
                    debug!("Chat worker idle; exiting");
                    break;
                }
            }
        }
    }

    async fn process(&self, update: ChatUpdate) {
        for message in self.handler.handle(update).await {
            if let Err(e) = self.sink.send_message(self.chat_id, &message).await {
                error!("Failed to send message: {e}");
            }
        }
    }
}
