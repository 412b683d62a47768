pub mod texts;
pub mod weight;

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use tracing::{debug, error, info};

use crate::commands::Command;
use crate::memory::WeightStore;
use crate::platform::{InboundEvent, OutgoingMessage, Outbound};
use weight::parse_weight;

/// Command and freeform-text handlers.
///
/// Handlers reply in the chat the event came from. Store failures are logged
/// and answered with a generic failure reply; send failures are returned to
/// the caller, which logs them.
pub struct Handlers<S, O> {
    store: Arc<S>,
    outbound: Arc<O>,
    /// Group the invite link points to
    chat_target: i64,
    invite_link: Option<String>,
}

impl<S: WeightStore, O: Outbound> Handlers<S, O> {
    pub fn new(
        store: Arc<S>,
        outbound: Arc<O>,
        chat_target: i64,
        invite_link: Option<String>,
    ) -> Self {
        Self {
            store,
            outbound,
            chat_target,
            invite_link,
        }
    }

    /// Run the handler for a command. `Unknown` always answers; the caller
    /// decides whether unknown commands deserve a reply in the first place.
    pub async fn handle_command(
        &self,
        command: &Command,
        args: &str,
        event: &InboundEvent,
    ) -> Result<()> {
        match command {
            Command::Faq => self.reply(event, texts::FAQ).await,
            Command::Start => self.reply(event, texts::START).await,
            Command::Help => self.reply(event, texts::HELP).await,
            Command::SetWeight => self.set_weight(event, args).await,
            Command::GetWeight => self.get_weight(event).await,
            Command::Invite => self.invite(event).await,
            Command::On => self.set_notifications(event, true).await,
            Command::Off => self.set_notifications(event, false).await,
            Command::Unknown(_) => self.reply(event, texts::UNKNOWN_COMMAND).await,
        }
    }

    pub async fn set_weight(&self, event: &InboundEvent, args: &str) -> Result<()> {
        match parse_weight(args) {
            Ok(value) => self.record_weight(event, value).await,
            Err(e) => {
                debug!("Rejected /setweight input from {}: {}", event.sender.id, e);
                self.reply(event, texts::SETWEIGHT_USAGE).await
            }
        }
    }

    /// Plain text in a private chat: record it if it is a weight, otherwise
    /// nudge the user towards the expected format.
    pub async fn freeform(&self, event: &InboundEvent, text: &str) -> Result<()> {
        match parse_weight(text) {
            Ok(value) => self.record_weight(event, value).await,
            Err(e) => {
                debug!("Freeform text from {} is not a weight: {}", event.sender.id, e);
                self.reply(event, texts::FREEFORM_PROMPT).await
            }
        }
    }

    pub async fn get_weight(&self, event: &InboundEvent) -> Result<()> {
        let history = match self.store.recent_weights(event.sender.id, 2).await {
            Ok(history) => history,
            Err(e) => {
                error!("Failed to load weight for {}: {:#}", event.sender.id, e);
                return self.reply(event, texts::GENERIC_FAILURE).await;
            }
        };

        let text = match history.as_slice() {
            [] => texts::NO_DATA.to_string(),
            [latest] => texts::current_weight(latest.value, &date_of(latest), None),
            [latest, previous, ..] => texts::current_weight(
                latest.value,
                &date_of(latest),
                Some(latest.value - previous.value),
            ),
        };
        self.reply(event, &text).await
    }

    pub async fn invite(&self, event: &InboundEvent) -> Result<()> {
        let link = match &self.invite_link {
            Some(link) => link.clone(),
            None => match self.outbound.invite_link(self.chat_target).await {
                Ok(link) => link,
                Err(e) => {
                    error!("Failed to export invite link: {:#}", e);
                    return self.reply(event, texts::GENERIC_FAILURE).await;
                }
            },
        };
        self.reply(event, &texts::invite(&link)).await
    }

    pub async fn set_notifications(&self, event: &InboundEvent, enabled: bool) -> Result<()> {
        let user_id = event.sender.id;
        let result = async {
            let was_enabled = self.store.notifications_enabled(user_id).await?;
            if was_enabled != enabled {
                self.store.set_notifications(user_id, enabled).await?;
            }
            anyhow::Ok(was_enabled)
        }
        .await;

        let text = match result {
            Ok(was_enabled) if was_enabled == enabled => {
                if enabled {
                    texts::NOTIFY_ALREADY_ON
                } else {
                    texts::NOTIFY_ALREADY_OFF
                }
            }
            Ok(_) => {
                info!("User {} turned reminders {}", user_id, if enabled { "on" } else { "off" });
                if enabled {
                    texts::NOTIFY_ON
                } else {
                    texts::NOTIFY_OFF
                }
            }
            Err(e) => {
                error!("Failed to update notifications for {}: {:#}", user_id, e);
                texts::GENERIC_FAILURE
            }
        };
        self.reply(event, text).await
    }

    async fn record_weight(&self, event: &InboundEvent, value: f64) -> Result<()> {
        match self
            .store
            .set_weight(event.sender.id, value, Utc::now())
            .await
        {
            Ok(()) => {
                info!("Saved weight {} for user {}", value, event.sender.id);
                self.reply(event, &texts::weight_saved(value)).await
            }
            Err(e) => {
                error!("Failed to save weight for {}: {:#}", event.sender.id, e);
                self.reply(event, texts::GENERIC_FAILURE).await
            }
        }
    }

    async fn reply(&self, event: &InboundEvent, text: &str) -> Result<()> {
        self.outbound
            .send(OutgoingMessage::new(event.chat_id, text).reply_to(event.message_id))
            .await
    }
}

fn date_of(record: &crate::memory::WeightRecord) -> String {
    record.recorded_at.format("%Y-%m-%d").to_string()
}
