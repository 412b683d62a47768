mod commands;
mod config;
mod dispatcher;
mod handlers;
mod memory;
mod platform;
mod scheduler;
#[cfg(test)]
mod testing;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::dispatcher::Dispatcher;
use crate::handlers::Handlers;
use crate::memory::MemoryStore;
use crate::platform::telegram::{self, TelegramOutbound};
use crate::scheduler::{JobZone, Scheduler};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,weightbot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    info!("Loading configuration from: {}", config_path.display());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    info!("Configuration loaded successfully");
    info!("  Chat target: {}", config.telegram.chat_target);
    info!("  Time zone: {}", config.scheduler.timezone);
    info!("  Database: {}", config.memory.database_path.display());

    let store = Arc::new(MemoryStore::open(&config.memory.database_path)?);

    let bot = teloxide::Bot::new(&config.telegram.bot_token);
    let username = telegram::authorize(&bot).await?;
    info!("Authorized on account {}", username);

    let outbound = Arc::new(TelegramOutbound::new(bot.clone()));

    // Scheduler runs on its own task so it never delays message dispatch
    let scheduler = Scheduler::new(JobZone::resolve(&config.scheduler.timezone)).await?;
    scheduler::jobs::register_builtin_jobs(&scheduler, Arc::clone(&outbound), &config).await?;
    let scheduler_task = tokio::spawn(scheduler.run(shutdown_signal()));

    let handlers = Handlers::new(
        store,
        outbound,
        config.telegram.chat_target,
        config.telegram.invite_link.clone(),
    );
    let dispatcher = Arc::new(Dispatcher::new(handlers));

    info!("Bot is starting...");
    telegram::run(bot, dispatcher).await?;

    match scheduler_task.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!("Scheduler error: {:#}", e),
        Err(e) => error!("Scheduler task failed: {}", e),
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
