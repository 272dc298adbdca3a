//! Message dispatch
//!
//! Every chat gets one long-lived worker task fed by an unbounded channel, so
//! a chat's messages are handled and answered strictly in arrival order, even
//! across poll batches. Different chats run concurrently. The poll loop keeps
//! going no matter what a single handler does: errors and panics turn into an
//! "Unexpected error." reply for that chat and put its session back to idle.

use crate::api::TodoApi;
use crate::flow::{self, Reply};
use crate::sessions::SessionRegistry;
use crate::telegram::TelegramClient;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};

const POLL_ERROR_BACKOFF: Duration = Duration::from_secs(3);

/// Where a chat worker delivers its replies
#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn send_reply(&self, chat_id: i64, reply: &Reply) -> anyhow::Result<()>;
}

#[async_trait]
impl ReplySink for TelegramClient {
    async fn send_reply(&self, chat_id: i64, reply: &Reply) -> anyhow::Result<()> {
        self.send_message(chat_id, reply).await
    }
}

pub struct Bot {
    api: Arc<dyn TodoApi>,
    sessions: SessionRegistry,
    workers: Mutex<HashMap<i64, mpsc::UnboundedSender<String>>>,
}

impl Bot {
    pub fn new(api: Arc<dyn TodoApi>) -> Self {
        Self {
            api,
            sessions: SessionRegistry::new(),
            workers: Mutex::new(HashMap::new()),
        }
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Handle one message from `chat_id` and produce the reply.
    pub async fn handle_text(&self, chat_id: i64, text: &str) -> Reply {
        let session = self.sessions.get_or_create(chat_id).await;
        let reply = {
            let mut session = session.lock().await;
            flow::handle(self.api.as_ref(), &mut session, text).await
        };

        if reply.end_session {
            self.sessions.remove(chat_id).await;
        }
        reply
    }

    /// Like [`Bot::handle_text`], but a panic inside the flow is contained.
    ///
    /// After a panic the chat is back to idle with its scratch cleared; the
    /// login token is kept.
    pub async fn handle_text_guarded(self: &Arc<Self>, chat_id: i64, text: String) -> Reply {
        let bot = Arc::clone(self);
        match tokio::spawn(async move { bot.handle_text(chat_id, &text).await }).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("[Bot] Handler for chat {} failed: {}", chat_id, e);
                // tokio's Mutex is not poisoned by the panic
                let session = self.sessions.get_or_create(chat_id).await;
                session.lock().await.finish();
                Reply::menu("Unexpected error.")
            }
        }
    }

    /// Queue `text` on the worker for `chat_id`, starting one if needed.
    ///
    /// Replies go to `sink` in the order messages were queued.
    pub async fn dispatch(self: &Arc<Self>, chat_id: i64, text: String, sink: Arc<dyn ReplySink>) {
        let mut workers = self.workers.lock().await;

        let text = match workers.get(&chat_id) {
            Some(tx) => match tx.send(text) {
                Ok(()) => return,
                Err(mpsc::error::SendError(text)) => text,
            },
            None => text,
        };

        let (tx, rx) = mpsc::unbounded_channel();
        // Cannot fail: `rx` is alive until the worker below exits.
        let _ = tx.send(text);
        workers.insert(chat_id, tx);
        tokio::spawn(Arc::clone(self).chat_worker(chat_id, rx, sink));
        debug!("[Bot] Started worker for chat {}", chat_id);
    }

    async fn chat_worker(
        self: Arc<Self>,
        chat_id: i64,
        mut rx: mpsc::UnboundedReceiver<String>,
        sink: Arc<dyn ReplySink>,
    ) {
        while let Some(text) = rx.recv().await {
            let reply = self.handle_text_guarded(chat_id, text).await;
            if let Err(e) = sink.send_reply(chat_id, &reply).await {
                warn!("[Bot] Failed to reply to chat {}: {:#}", chat_id, e);
            }
        }
    }

    /// Poll Telegram forever, answering every text message.
    pub async fn run(self: Arc<Self>, telegram: TelegramClient, poll_timeout_secs: u64) {
        info!("[Bot] Polling for updates");
        let sink: Arc<dyn ReplySink> = Arc::new(telegram.clone());
        let mut offset = 0;

        loop {
            let updates = match telegram.get_updates(offset, poll_timeout_secs).await {
                Ok(updates) => updates,
                Err(e) => {
                    warn!("[Bot] Polling failed: {:#}", e);
                    tokio::time::sleep(POLL_ERROR_BACKOFF).await;
                    continue;
                }
            };

            for update in updates {
                offset = offset.max(update.update_id + 1);
                if let Some(message) = update.message {
                    if let Some(text) = message.text {
                        self.dispatch(message.chat.id, text, Arc::clone(&sink)).await;
                    }
                }
            }
        }
    }
}
