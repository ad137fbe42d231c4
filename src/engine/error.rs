//! Errors raised by hooks and by the trigger protocol.

use thiserror::Error;

/// Failure reported by a hook body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookError {
    /// Input was refused; the message is meant for the end user verbatim.
    #[error("{0}")]
    Rejected(String),

    /// Any other failure, including collaborator and transport errors.
    #[error("hook failed: {0}")]
    Failed(String),
}

impl HookError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Errors that can occur while triggering an event on an instance.
///
/// Whatever the variant, a failed trigger never advances the instance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TriggerError {
    #[error("no transitions registered from state '{state}'")]
    NoOutgoingTransitions { state: String },

    #[error("no transition from state '{state}' matches event '{event}'")]
    NoMatchingTransition { state: String, event: String },

    #[error("ambiguous transitions from state '{state}' on event '{event}': must be 1, found {count}")]
    AmbiguousTransition {
        state: String,
        event: String,
        count: usize,
    },

    #[error(transparent)]
    Hook(#[from] HookError),
}

impl TriggerError {
    /// True when the event did not select exactly one transition.
    pub fn is_unmatched_event(&self) -> bool {
        matches!(
            self,
            Self::NoMatchingTransition { .. } | Self::AmbiguousTransition { .. }
        )
    }

    /// Text of a hook rejection, if this failure is one.
    pub fn rejection(&self) -> Option<&str> {
        match self {
            Self::Hook(HookError::Rejected(message)) => Some(message),
            _ => None,
        }
    }
}
