//! Minimal Telegram Bot API client
//!
//! Only the two calls the bot needs: `getUpdates` (long polling) and
//! `sendMessage` with the main menu as a reply keyboard.

use crate::flow::{Command, Reply};
use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<Value>,
}

/// Reply keyboard built from [`Command::MENU`]
pub fn main_keyboard() -> Value {
    let rows: Vec<Vec<Value>> = Command::MENU
        .iter()
        .map(|row| row.iter().map(|cmd| json!({ "text": cmd.label() })).collect())
        .collect();

    json!({ "keyboard": rows, "resize_keyboard": true })
}

#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    base_url: String,
}

impl TelegramClient {
    pub fn new(api_url: &str, bot_token: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: format!("{}/bot{}", api_url.trim_end_matches('/'), bot_token),
        }
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: for<'de> Deserialize<'de>,
    {
        let envelope: Envelope<T> = self
            .client
            .post(format!("{}/{}", self.base_url, method))
            .json(body)
            .send()
            .await
            .with_context(|| format!("Telegram {} request failed", method))?
            .json()
            .await
            .with_context(|| format!("Telegram {} returned an unreadable body", method))?;

        if !envelope.ok {
            anyhow::bail!(
                "Telegram {} failed: {}",
                method,
                envelope.description.unwrap_or_default()
            );
        }
        envelope
            .result
            .with_context(|| format!("Telegram {} returned no result", method))
    }

    /// Long-poll for updates after `offset`
    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>> {
        let updates: Vec<Update> = self
            .call(
                "getUpdates",
                &json!({
                    "offset": offset,
                    "timeout": timeout_secs,
                    "allowed_updates": ["message"],
                }),
            )
            .await?;
        if !updates.is_empty() {
            debug!("[Telegram] {} update(s)", updates.len());
        }
        Ok(updates)
    }

    pub async fn send_message(&self, chat_id: i64, reply: &Reply) -> Result<()> {
        let body = SendMessage {
            chat_id,
            text: &reply.text,
            reply_markup: reply.show_menu.then(main_keyboard),
        };
        let _: Value = self.call("sendMessage", &body).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyboard_layout() {
        let keyboard = main_keyboard();
        let rows = keyboard["keyboard"].as_array().unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0][0]["text"], "📋 My To-Do List");
        assert_eq!(rows[3][0]["text"], "🚪 Logout");
        assert_eq!(keyboard["resize_keyboard"], true);
    }

    #[test]
    fn test_prompt_omits_keyboard() {
        let reply = Reply::prompt("Enter username:");
        let body = SendMessage {
            chat_id: 5,
            text: &reply.text,
            reply_markup: reply.show_menu.then(main_keyboard),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("reply_markup").is_none());
        assert_eq!(json["chat_id"], 5);
    }

    #[test]
    fn test_update_without_text_parses() {
        let update: Update = serde_json::from_str(
            r#"{"update_id": 9, "message": {"message_id": 1, "chat": {"id": 42, "type": "private"}, "sticker": {}}}"#,
        )
        .unwrap();
        let message = update.message.unwrap();
        assert_eq!(message.chat.id, 42);
        assert!(message.text.is_none());
    }
}
