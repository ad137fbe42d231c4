//! State and event label traits.
//!
//! States and events are opaque labels as far as the engine is concerned:
//! it only compares them, hashes them, and prints their names. Any type
//! with those capabilities can drive a flow.

use std::fmt::Debug;
use std::hash::Hash;

/// Trait for state machine states.
///
/// The set of valid states is implicit in a template's transition table;
/// the engine never enumerates a state type.
///
/// # Example
///
/// ```rust
/// use stepflow::core::State;
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug)]
/// enum Step {
///     Idle,
///     Editing,
/// }
///
/// impl State for Step {
///     fn name(&self) -> &str {
///         match self {
///             Self::Idle => "Idle",
///             Self::Editing => "Editing",
///         }
///     }
/// }
///
/// assert_eq!(Step::Editing.name(), "Editing");
/// ```
pub trait State: Clone + Eq + Hash + Debug + Send + Sync + 'static {
    /// Get the state's name for display/logging.
    fn name(&self) -> &str;
}

/// Trait for events that fire transitions.
///
/// Events carry no payload; the optional input travels alongside them into
/// the context.
pub trait Event: Clone + Eq + Hash + Debug + Send + Sync + 'static {
    /// Get the event's label.
    fn name(&self) -> &str;
}

impl State for &'static str {
    fn name(&self) -> &str {
        self
    }
}

impl State for String {
    fn name(&self) -> &str {
        self.as_str()
    }
}

impl Event for &'static str {
    fn name(&self) -> &str {
        self
    }
}

impl Event for String {
    fn name(&self) -> &str {
        self.as_str()
    }
}
