use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::*;
use teloxide::types::{MessageId, ReplyParameters};
use tracing::{info, warn};

use crate::dispatcher;
use crate::memory::MemoryStore;
use crate::platform::{ChatKind, InboundEvent, OutgoingMessage, Outbound, Sender};

/// Event dispatcher wired to the Telegram outbound
pub type BotDispatcher = dispatcher::Dispatcher<MemoryStore, TelegramOutbound>;

/// Sends messages through the Telegram Bot API
#[derive(Clone)]
pub struct TelegramOutbound {
    bot: Bot,
}

impl TelegramOutbound {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Outbound for TelegramOutbound {
    async fn send(&self, message: OutgoingMessage) -> Result<()> {
        let mut request = self.bot.send_message(ChatId(message.chat_id), message.text);
        if let Some(id) = message.reply_to {
            request = request.reply_parameters(ReplyParameters::new(MessageId(id)));
        }
        request
            .await
            .with_context(|| format!("Failed to send message to chat {}", message.chat_id))?;
        Ok(())
    }

    async fn invite_link(&self, chat_id: i64) -> Result<String> {
        self.bot
            .export_chat_invite_link(ChatId(chat_id))
            .await
            .with_context(|| format!("Failed to export invite link for chat {}", chat_id))
    }
}

/// Convert a Telegram message into an inbound event. Messages without a
/// sender (channel posts) are dropped.
pub fn event_from_message(msg: &Message) -> Option<InboundEvent> {
    let user = msg.from.as_ref()?;
    Some(InboundEvent {
        sender: Sender {
            id: user.id.0,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
        },
        chat_id: msg.chat.id.0,
        chat_kind: if msg.chat.is_private() {
            ChatKind::Private
        } else {
            ChatKind::Group
        },
        text: msg.text().map(str::to_string),
        message_id: Some(msg.id.0),
    })
}

/// Verify the token and return the bot's username. A rejected token is fatal.
pub async fn authorize(bot: &Bot) -> Result<String> {
    let me = bot
        .get_me()
        .await
        .context("Failed to authorize with Telegram, check telegram.bot_token")?;
    Ok(me.username().to_string())
}

/// Poll Telegram for updates and feed every message to the dispatcher.
/// Returns when polling stops (Ctrl-C).
pub async fn run(bot: Bot, dispatcher: Arc<BotDispatcher>) -> Result<()> {
    info!("Starting Telegram polling...");

    let handler = Update::filter_message().endpoint(handle_message);

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![dispatcher])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("telegram"))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

async fn handle_message(msg: Message, dispatcher: Arc<BotDispatcher>) -> ResponseResult<()> {
    if let Some(event) = event_from_message(&msg) {
        // Fire and forget, the handler task logs its own failures
        dispatcher.dispatch(event);
    }
    Ok(())
}
