pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;

/// Kind of conversation a message arrived in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatKind {
    Private,
    /// Groups, supergroups and channels
    Group,
}

/// Who sent a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub id: u64,
    pub username: Option<String>,
    pub first_name: String,
}

impl Sender {
    /// Name used in log lines: the @username when set, otherwise the first name
    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.first_name)
    }
}

/// A message received from the chat platform
#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub sender: Sender,
    pub chat_id: i64,
    pub chat_kind: ChatKind,
    /// The message text, `None` for stickers, photos and other non-text content
    pub text: Option<String>,
    /// Platform message id, used to thread replies
    pub message_id: Option<i32>,
}

impl InboundEvent {
    pub fn is_private(&self) -> bool {
        self.chat_kind == ChatKind::Private
    }

    /// The command token (without the leading `/` and any `@botname` suffix)
    /// if the text starts with a command marker.
    pub fn command_token(&self) -> Option<&str> {
        let rest = self.text.as_deref()?.trim_start().strip_prefix('/')?;
        let token = rest.split_whitespace().next().unwrap_or("");
        Some(token.split('@').next().unwrap_or(token))
    }
}

/// A message to deliver through the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub chat_id: i64,
    pub text: String,
    /// Message to reply to, for threaded replies
    pub reply_to: Option<i32>,
}

impl OutgoingMessage {
    pub fn new(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            reply_to: None,
        }
    }

    pub fn reply_to(mut self, message_id: Option<i32>) -> Self {
        self.reply_to = message_id;
        self
    }
}

/// Outbound capabilities of the chat platform
#[async_trait]
pub trait Outbound: Send + Sync + 'static {
    async fn send(&self, message: OutgoingMessage) -> Result<()>;

    /// Export an invite link for the given chat
    async fn invite_link(&self, chat_id: i64) -> Result<String>;
}
