use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, error, warn};

use crate::config::Config;
use crate::handlers::texts;
use crate::platform::{OutgoingMessage, Outbound};
use crate::scheduler::Scheduler;

/// Send the weigh-in reminder to the group. It goes to everyone in the group
/// regardless of individual /on and /off preferences.
pub async fn send_weekly_reminder<O: Outbound>(outbound: &O, chat_target: i64) -> Result<()> {
    outbound
        .send(OutgoingMessage::new(chat_target, texts::WEEKLY_REMINDER))
        .await
        .context("Failed to send weekly reminder")
}

/// Ping `url` so hosting platforms that idle inactive apps keep the process
/// awake. Without a URL this only logs a heartbeat.
pub async fn keep_alive(client: &reqwest::Client, url: Option<&str>) -> Result<()> {
    let Some(url) = url else {
        debug!("Keep-alive: bot is alive");
        return Ok(());
    };

    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Keep-alive request to {} failed", url))?;
    debug!("Keep-alive ping to {} returned {}", url, response.status());
    Ok(())
}

/// Register the weekly reminder and keep-alive jobs
pub async fn register_builtin_jobs<O: Outbound>(
    scheduler: &Scheduler,
    outbound: Arc<O>,
    config: &Config,
) -> Result<()> {
    let chat_target = config.telegram.chat_target;
    scheduler
        .add_job(
            "weekly-reminder",
            &config.scheduler.weekly_reminder()?,
            move || {
                let outbound = Arc::clone(&outbound);
                Box::pin(async move {
                    if let Err(e) = send_weekly_reminder(outbound.as_ref(), chat_target).await {
                        error!("{:#}", e);
                    }
                })
            },
        )
        .await?;

    let client = reqwest::Client::new();
    let url = config.scheduler.keepalive_url.clone();
    scheduler
        .add_job("keep-alive", &config.scheduler.keepalive()?, move || {
            let client = client.clone();
            let url = url.clone();
            Box::pin(async move {
                if let Err(e) = keep_alive(&client, url.as_deref()).await {
                    warn!("{:#}", e);
                }
            })
        })
        .await?;

    Ok(())
}
