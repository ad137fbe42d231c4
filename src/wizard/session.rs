//! Transport handles stored in a conversation's meta.

use crate::core::Event;
use crate::engine::HookError;
use crate::wizard::WizardEvent;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Identity of an operator talking to the wizard.
pub type OperatorId = i64;
/// Conversation a reply is delivered to.
pub type ChatId = i64;

/// Separator between event label and data in an action payload.
pub const PAYLOAD_SEPARATOR: char = ':';

/// Inline button whose payload fires an event when pressed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub payload: String,
}

impl Button {
    pub fn new(label: impl Into<String>, event: WizardEvent, data: &str) -> Self {
        Self {
            label: label.into(),
            payload: format!("{}{}{}", event.name(), PAYLOAD_SEPARATOR, data),
        }
    }
}

/// Message sent back to an operator.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Vec<Vec<Button>>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: Vec::new(),
        }
    }

    /// Append a row of buttons.
    pub fn row(mut self, buttons: impl IntoIterator<Item = Button>) -> Self {
        self.keyboard.push(buttons.into_iter().collect());
        self
    }
}

/// Delivery failure reported by a transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("reply could not be delivered: {0}")]
pub struct ReplyError(pub String);

/// Outbound half of a chat transport.
pub trait ReplySink: Send + Sync {
    fn send(&self, chat: ChatId, reply: Reply) -> Result<(), ReplyError>;
}

/// Handles a hook needs to talk back to the operator.
///
/// Refreshed by the dispatcher before every trigger.
#[derive(Clone)]
pub struct Session {
    pub chat: ChatId,
    pub replies: Arc<dyn ReplySink>,
    /// Cancellation scope of the inbound request.
    pub cancel: CancellationToken,
}

impl Session {
    pub fn new(chat: ChatId, replies: Arc<dyn ReplySink>, cancel: CancellationToken) -> Self {
        Self {
            chat,
            replies,
            cancel,
        }
    }

    pub fn reply(&self, reply: Reply) -> Result<(), HookError> {
        self.replies
            .send(self.chat, reply)
            .map_err(|err| HookError::failed(err.to_string()))
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("chat", &self.chat)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}
