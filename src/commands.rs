use crate::platform::InboundEvent;

/// Bot commands, matched case-insensitively
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Faq,
    Start,
    Help,
    SetWeight,
    GetWeight,
    Invite,
    On,
    Off,
    /// Anything else that looks like a command, lowercased
    Unknown(String),
}

impl Command {
    pub fn from_token(token: &str) -> Self {
        let token = token.to_lowercase();
        match token.as_str() {
            "faq" => Command::Faq,
            "start" => Command::Start,
            "help" => Command::Help,
            "setweight" | "sw" => Command::SetWeight,
            "getweight" | "gw" => Command::GetWeight,
            "invite" => Command::Invite,
            "on" => Command::On,
            "off" => Command::Off,
            _ => Command::Unknown(token),
        }
    }
}

/// What to do with an inbound event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Command { command: Command, args: String },
    /// Plain text in a private chat, parsed as a weight entry
    FreeformText(String),
    Ignore,
}

/// Decide how an inbound event should be handled. Freeform text is only
/// considered in private chats so group conversation is left alone.
pub fn classify(event: &InboundEvent) -> Classification {
    let Some(text) = event.text.as_deref() else {
        return Classification::Ignore;
    };

    if let Some(token) = event.command_token() {
        let args = text
            .trim_start()
            .split_once(char::is_whitespace)
            .map(|(_, rest)| rest.trim())
            .unwrap_or("");
        return Classification::Command {
            command: Command::from_token(token),
            args: args.to_string(),
        };
    }

    if event.is_private() {
        Classification::FreeformText(text.to_string())
    } else {
        Classification::Ignore
    }
}
