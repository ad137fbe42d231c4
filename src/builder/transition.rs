//! Builder for constructing a single transition.

use crate::builder::error::BuildError;
use crate::core::{Context, Flow, Guard};
use crate::engine::Transition;

/// Builder for constructing transitions with a fluent API.
pub struct TransitionBuilder<F: Flow> {
    from: Option<F::State>,
    event: Option<F::Event>,
    to: Option<F::State>,
    guard: Option<Guard<F>>,
}

impl<F: Flow> TransitionBuilder<F> {
    /// Create a new transition builder.
    pub fn new() -> Self {
        Self {
            from: None,
            event: None,
            to: None,
            guard: None,
        }
    }

    /// Set the source state (required).
    pub fn from(mut self, state: F::State) -> Self {
        self.from = Some(state);
        self
    }

    /// Set the triggering event (required).
    pub fn on(mut self, event: F::Event) -> Self {
        self.event = Some(event);
        self
    }

    /// Set the target state (required).
    pub fn to(mut self, state: F::State) -> Self {
        self.to = Some(state);
        self
    }

    /// Add a guard predicate (optional).
    pub fn guard(mut self, guard: Guard<F>) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Add a guard using a closure (optional).
    pub fn when<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&Context<F>) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(Guard::new(predicate));
        self
    }

    /// Build the transition.
    pub fn build(self) -> Result<Transition<F>, BuildError> {
        let from = self.from.ok_or(BuildError::MissingFromState)?;
        let event = self.event.ok_or(BuildError::MissingEvent)?;
        let to = self.to.ok_or(BuildError::MissingToState)?;

        Ok(Transition {
            from,
            event,
            to,
            guard: self.guard,
        })
    }
}

impl<F: Flow> Default for TransitionBuilder<F> {
    fn default() -> Self {
        Self::new()
    }
}
