//! Bot configuration

use anyhow::Result;
use todo_common::env;

#[derive(Clone, Debug)]
pub struct BotConfig {
    /// Telegram bot token
    pub bot_token: String,
    /// Base URL of the To-Do REST API
    pub api_base_url: String,
    /// Base URL of the Telegram Bot API
    pub telegram_api_url: String,
    /// Long-poll timeout for `getUpdates`, in seconds
    pub poll_timeout_secs: u64,
}

impl BotConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bot_token: env::required("BOT_TOKEN")?,
            api_base_url: env::var_or("API_BASE_URL", "http://localhost:3000"),
            telegram_api_url: env::var_or("TELEGRAM_API_URL", "https://api.telegram.org"),
            poll_timeout_secs: env::parse_or("POLL_TIMEOUT_SECS", 30)?,
        })
    }
}
