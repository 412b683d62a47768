use anyhow::{bail, Context, Result};
use chrono::{NaiveTime, Weekday};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::scheduler::Recurrence;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    /// Group chat that receives scheduled reminders
    pub chat_target: i64,
    /// Static invite link; exported from Telegram when missing
    #[serde(default)]
    pub invite_link: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SchedulerConfig {
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_reminder_weekday")]
    pub reminder_weekday: String,
    /// Local time as HH:MM
    #[serde(default = "default_reminder_time")]
    pub reminder_time: String,
    #[serde(default = "default_keepalive_minutes")]
    pub keepalive_minutes: u64,
    /// URL pinged by the keep-alive job, usually the bot's own public address
    #[serde(default)]
    pub keepalive_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MemoryConfig {
    #[serde(default = "default_db_path")]
    pub database_path: PathBuf,
}

fn default_timezone() -> String {
    "Europe/Moscow".to_string()
}

fn default_reminder_weekday() -> String {
    "Sun".to_string()
}

fn default_reminder_time() -> String {
    "11:00".to_string()
}

fn default_keepalive_minutes() -> u64 {
    15
}

fn default_db_path() -> PathBuf {
    PathBuf::from("weightbot.db")
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            reminder_weekday: default_reminder_weekday(),
            reminder_time: default_reminder_time(),
            keepalive_minutes: default_keepalive_minutes(),
            keepalive_url: None,
        }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            database_path: default_db_path(),
        }
    }
}

impl SchedulerConfig {
    /// Recurrence of the weekly weigh-in reminder
    pub fn weekly_reminder(&self) -> Result<Recurrence> {
        let weekday: Weekday = self
            .reminder_weekday
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid reminder_weekday: {}", self.reminder_weekday))?;
        let time = NaiveTime::parse_from_str(&self.reminder_time, "%H:%M")
            .with_context(|| format!("Invalid reminder_time (expected HH:MM): {}", self.reminder_time))?;
        Ok(Recurrence::Weekly { weekday, time })
    }

    /// Recurrence of the keep-alive ping
    pub fn keepalive(&self) -> Result<Recurrence> {
        if self.keepalive_minutes == 0 {
            bail!("keepalive_minutes must be greater than 0");
        }
        Ok(Recurrence::Every {
            interval: Duration::from_secs(self.keepalive_minutes * 60),
        })
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config file")?;

        if config.telegram.bot_token.trim().is_empty() {
            bail!("telegram.bot_token must not be empty");
        }
        config.scheduler.weekly_reminder()?;
        config.scheduler.keepalive()?;

        Ok(config)
    }
}
