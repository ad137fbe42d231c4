//! Inbound event dispatch for the account wizard.
//!
//! Turns transport-neutral updates into registry operations and triggers.
//! Every failure is answered here: hook rejections are relayed verbatim,
//! anything else becomes a generic retry-later reply.

use crate::builder::UnknownLabel;
use crate::config::Messages;
use crate::core::Context;
use crate::engine::Template;
use crate::registry::Registry;
use crate::wizard::session::PAYLOAD_SEPARATOR;
use crate::wizard::{
    AccountWizard, ChatId, OperatorDirectory, OperatorId, Reply, ReplySink, Session, WizardEnv,
    WizardEvent, WizardState,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub const START_COMMAND: &str = "/start";
pub const CANCEL_COMMAND: &str = "/cancel";

/// An inbound event from the chat transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Update {
    /// Free text typed by the operator.
    Message {
        sender: OperatorId,
        chat: ChatId,
        text: String,
    },
    /// Button press carrying an `event:data` payload.
    Action {
        sender: OperatorId,
        chat: ChatId,
        payload: String,
    },
}

impl Update {
    pub fn sender(&self) -> OperatorId {
        match self {
            Self::Message { sender, .. } | Self::Action { sender, .. } => *sender,
        }
    }

    pub fn chat(&self) -> ChatId {
        match self {
            Self::Message { chat, .. } | Self::Action { chat, .. } => *chat,
        }
    }

    fn command(&self) -> Option<&str> {
        match self {
            Self::Message { text, .. } if text == START_COMMAND || text == CANCEL_COMMAND => {
                Some(text)
            }
            _ => None,
        }
    }

    /// Event and input this update fires.
    ///
    /// Text always continues the current step; an action names its event
    /// before the separator, or continues when that label is empty.
    pub fn route(&self) -> Result<(WizardEvent, String), UnknownLabel> {
        match self {
            Self::Message { text, .. } => Ok((WizardEvent::Continue, text.clone())),
            Self::Action { payload, .. } => {
                let (label, data) = payload
                    .split_once(PAYLOAD_SEPARATOR)
                    .unwrap_or((payload.as_str(), ""));
                let event = if label.is_empty() {
                    WizardEvent::Continue
                } else {
                    label.parse()?
                };
                Ok((event, data.to_string()))
            }
        }
    }
}

/// What happened to an update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dispatched {
    NotAllowed,
    NotStarted,
    Started,
    Removed,
    Advanced(WizardState),
    Rejected(String),
    Failed,
}

/// Routes updates from many operators into their conversations.
pub struct Dispatcher {
    registry: Registry<OperatorId, AccountWizard>,
    env: WizardEnv,
    operators: Arc<dyn OperatorDirectory>,
    replies: Arc<dyn ReplySink>,
    messages: Messages,
}

impl Dispatcher {
    pub fn new(
        template: Arc<Template<AccountWizard>>,
        env: WizardEnv,
        operators: Arc<dyn OperatorDirectory>,
        replies: Arc<dyn ReplySink>,
        messages: Messages,
    ) -> Self {
        Self {
            registry: Registry::new(template),
            env,
            operators,
            replies,
            messages,
        }
    }

    pub fn registry(&self) -> &Registry<OperatorId, AccountWizard> {
        &self.registry
    }

    /// Handle one update. `cancel` is the inbound request's scope.
    pub fn dispatch(&self, update: Update, cancel: CancellationToken) -> Dispatched {
        let sender = update.sender();
        let chat = update.chat();
        let _span = tracing::info_span!("dispatch", operator = sender, chat = chat).entered();

        if !self.operators.is_authorized(sender) {
            tracing::warn!("operator is not in the whitelist");
            self.notify(chat, &self.messages.not_allowed);
            return Dispatched::NotAllowed;
        }

        let session = Session::new(chat, Arc::clone(&self.replies), cancel);
        match update.command() {
            Some(START_COMMAND) => self.start(sender, session),
            Some(_) => self.remove(sender, chat),
            None => self.advance(&update, session),
        }
    }

    fn start(&self, sender: OperatorId, session: Session) -> Dispatched {
        let chat = session.chat;
        let instance = self.registry.get_or_add(sender);
        let initial = *self.registry.template().initial_state();

        match instance.restart(initial, &self.env, |ctx| ctx.meta = Some(session)) {
            Ok(()) => Dispatched::Started,
            Err(err) => {
                tracing::error!(error = %err, "could not render initial state");
                self.notify(chat, &self.messages.retry_later);
                Dispatched::Failed
            }
        }
    }

    fn remove(&self, sender: OperatorId, chat: ChatId) -> Dispatched {
        if self.registry.remove(&sender).is_none() {
            self.notify(chat, &self.messages.start_hint);
            return Dispatched::NotStarted;
        }
        self.notify(chat, &self.messages.removed);
        Dispatched::Removed
    }

    fn advance(&self, update: &Update, session: Session) -> Dispatched {
        let chat = session.chat;
        let Some(instance) = self.registry.get(&update.sender()) else {
            self.notify(chat, &self.messages.start_hint);
            return Dispatched::NotStarted;
        };

        let (event, input) = match update.route() {
            Ok(routed) => routed,
            Err(err) => {
                tracing::warn!(error = %err, "update does not name a known event");
                self.notify(chat, &self.messages.retry_later);
                return Dispatched::Failed;
            }
        };
        tracing::debug!(event = %event, input = %input, "routing update");

        let stash_session = |ctx: &mut Context<AccountWizard>| ctx.meta = Some(session);
        match instance.trigger_with(event, Some(input), &self.env, stash_session) {
            Ok(state) => Dispatched::Advanced(state),
            Err(err) => match err.rejection() {
                Some(text) => {
                    self.notify(chat, text);
                    Dispatched::Rejected(text.to_string())
                }
                None => {
                    tracing::error!(error = %err, "conversation did not advance");
                    self.notify(chat, &self.messages.retry_later);
                    Dispatched::Failed
                }
            },
        }
    }

    fn notify(&self, chat: ChatId, text: &str) {
        if let Err(err) = self.replies.send(chat, Reply::text(text)) {
            tracing::error!(error = %err, "could not deliver reply");
        }
    }
}
