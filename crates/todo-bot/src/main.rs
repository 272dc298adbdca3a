use std::sync::Arc;

use todo_bot::telegram::TelegramClient;
use todo_bot::{Bot, BotConfig, HttpApi};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "todo_bot=debug,info".into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = BotConfig::from_env()?;
    info!("=== To-Do Bot ===");
    info!("API: {}", config.api_base_url);

    let api = Arc::new(HttpApi::new(&config.api_base_url));
    let telegram = TelegramClient::new(&config.telegram_api_url, &config.bot_token);
    let bot = Arc::new(Bot::new(api));

    tokio::select! {
        _ = bot.run(telegram, config.poll_timeout_secs) => {}
        _ = tokio::signal::ctrl_c() => info!("Shutdown signal received"),
    }

    Ok(())
}
