//! Per-instance mutable context.

use super::flow::Flow;

/// Mutable bag owned by one instance.
///
/// Holds the state label as seen by hooks, the input of the last trigger,
/// the flow's accumulated data and its out-of-band handles. Hooks receive it
/// while the owning instance's lock is held, so no further synchronization
/// is needed inside a hook body.
///
/// The state label is written only by the engine. During a trigger it
/// briefly names the target state before the transition commits.
pub struct Context<F: Flow> {
    state: F::State,
    input: Option<F::Input>,
    /// Data carried across the steps of one conversation.
    pub data: F::Data,
    /// Handles supplied by the caller before triggering.
    pub meta: F::Meta,
}

impl<F: Flow> Context<F> {
    pub(crate) fn new(initial: F::State) -> Self {
        Self {
            state: initial,
            input: None,
            data: F::Data::default(),
            meta: F::Meta::default(),
        }
    }

    /// State label as seen by the hook currently running.
    pub fn state(&self) -> &F::State {
        &self.state
    }

    /// Input supplied with the last trigger, if any.
    pub fn input(&self) -> Option<&F::Input> {
        self.input.as_ref()
    }

    pub(crate) fn set_state(&mut self, state: F::State) {
        self.state = state;
    }

    pub(crate) fn set_input(&mut self, input: Option<F::Input>) {
        self.input = input;
    }
}

impl<F: Flow> std::fmt::Debug for Context<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("state", &self.state)
            .field("input", &self.input)
            .finish_non_exhaustive()
    }
}
