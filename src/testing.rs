//! Fakes shared by unit tests.

use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::memory::{WeightRecord, WeightStore};
use crate::platform::{ChatKind, InboundEvent, OutgoingMessage, Outbound, Sender};

/// Build an event from `user_id`. Private chats use the user id as chat id,
/// groups use a fixed negative id.
pub fn event(user_id: u64, kind: ChatKind, text: &str) -> InboundEvent {
    InboundEvent {
        sender: Sender {
            id: user_id,
            username: Some(format!("user{}", user_id)),
            first_name: format!("User {}", user_id),
        },
        chat_id: match kind {
            ChatKind::Private => user_id as i64,
            ChatKind::Group => -555,
        },
        chat_kind: kind,
        text: Some(text.to_string()),
        message_id: Some(10),
    }
}

/// Records everything sent through it
#[derive(Default)]
pub struct RecordingOutbound {
    sent: Mutex<Vec<OutgoingMessage>>,
    invite_requests: Mutex<Vec<i64>>,
    fail_sends: bool,
}

impl RecordingOutbound {
    /// An outbound whose sends always fail, still recording the attempts
    pub fn failing() -> Self {
        Self {
            fail_sends: true,
            ..Self::default()
        }
    }

    pub fn invite_link_for(chat_id: i64) -> String {
        format!("https://t.me/+invite{}", chat_id)
    }

    pub fn sent(&self) -> Vec<OutgoingMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|m| m.text).collect()
    }

    pub fn invite_requests(&self) -> Vec<i64> {
        self.invite_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Outbound for RecordingOutbound {
    async fn send(&self, message: OutgoingMessage) -> Result<()> {
        self.sent.lock().unwrap().push(message);
        if self.fail_sends {
            bail!("send failed");
        }
        Ok(())
    }

    async fn invite_link(&self, chat_id: i64) -> Result<String> {
        self.invite_requests.lock().unwrap().push(chat_id);
        Ok(Self::invite_link_for(chat_id))
    }
}

/// A store that is always unavailable
pub struct FailingStore;

#[async_trait]
impl WeightStore for FailingStore {
    async fn latest_weight(&self, _user_id: u64) -> Result<Option<WeightRecord>> {
        bail!("store unavailable")
    }

    async fn recent_weights(&self, _user_id: u64, _limit: usize) -> Result<Vec<WeightRecord>> {
        bail!("store unavailable")
    }

    async fn set_weight(&self, _user_id: u64, _value: f64, _at: DateTime<Utc>) -> Result<()> {
        bail!("store unavailable")
    }

    async fn set_notifications(&self, _user_id: u64, _enabled: bool) -> Result<()> {
        bail!("store unavailable")
    }

    async fn notifications_enabled(&self, _user_id: u64) -> Result<bool> {
        bail!("store unavailable")
    }
}
