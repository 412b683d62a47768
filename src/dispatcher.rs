use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::commands::{classify, Classification, Command};
use crate::handlers::Handlers;
use crate::memory::WeightStore;
use crate::platform::{InboundEvent, Outbound};

/// Routes inbound events to handlers, each on its own detached task.
///
/// A handler failing or hanging only affects its own task; errors are logged
/// there and never reach the ingestion loop.
pub struct Dispatcher<S, O> {
    handlers: Arc<Handlers<S, O>>,
}

impl<S: WeightStore, O: Outbound> Dispatcher<S, O> {
    pub fn new(handlers: Handlers<S, O>) -> Self {
        Self {
            handlers: Arc::new(handlers),
        }
    }

    /// Classify and dispatch an event without waiting for the handler.
    ///
    /// Returns the spawned task, if any. Callers are free to drop it.
    pub fn dispatch(&self, event: InboundEvent) -> Option<JoinHandle<()>> {
        let handle = match classify(&event) {
            Classification::Ignore => None,
            Classification::Command {
                command: Command::Unknown(token),
                ..
            } if !event.is_private() => {
                debug!("Ignoring unknown command /{} in group {}", token, event.chat_id);
                None
            }
            classification => Some(self.spawn(classification, event.clone())),
        };

        if let Some(text) = &event.text {
            info!("[{}] {}", event.sender.display_name(), text);
        }

        handle
    }

    fn spawn(&self, classification: Classification, event: InboundEvent) -> JoinHandle<()> {
        let handlers = Arc::clone(&self.handlers);
        tokio::spawn(async move {
            let result = match &classification {
                Classification::Command { command, args } => {
                    handlers.handle_command(command, args, &event).await
                }
                Classification::FreeformText(text) => handlers.freeform(&event, text).await,
                Classification::Ignore => Ok(()),
            };

            if let Err(e) = result {
                error!(
                    "Handler for message from {} in chat {} failed: {:#}",
                    event.sender.id, event.chat_id, e
                );
            }
        })
    }
}
