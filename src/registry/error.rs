//! Registry error types.

use crate::engine::TriggerError;
use thiserror::Error;

/// Errors that can occur when managing instances by identity
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// An instance is already registered for this identity
    #[error("instance for identity {identity} already exists")]
    AlreadyExists { identity: String },

    /// No instance is registered for this identity
    #[error("no instance for identity {identity}")]
    NotFound { identity: String },

    /// The instance was found but the trigger failed
    #[error(transparent)]
    Trigger(#[from] TriggerError),
}
