//! Immutable flow definition shared by every instance.

use crate::core::{Context, Event, Flow, Guard, State};
use crate::engine::error::{HookError, TriggerError};
use crate::engine::hook::{run_state_hooks, StateHook, Step, TransitionHook};
use crate::engine::instance::Instance;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// A transition from one state to another on an event.
///
/// Several transitions may share a source state and event; their guards
/// decide at fire time which one applies.
pub struct Transition<F: Flow> {
    pub(crate) from: F::State,
    pub(crate) event: F::Event,
    pub(crate) to: F::State,
    pub(crate) guard: Option<Guard<F>>,
}

impl<F: Flow> Transition<F> {
    pub fn from(&self) -> &F::State {
        &self.from
    }

    pub fn event(&self) -> &F::Event {
        &self.event
    }

    pub fn to(&self) -> &F::State {
        &self.to
    }

    pub fn is_guarded(&self) -> bool {
        self.guard.is_some()
    }

    /// Check if this transition can fire on `event` for this context (pure)
    pub fn can_fire(&self, event: &F::Event, ctx: &Context<F>) -> bool {
        if *event != self.event {
            return false;
        }

        self.guard.as_ref().is_none_or(|g| g.check(ctx))
    }
}

/// Tables describing a flow: transitions, hooks and the initial state.
///
/// Built once through [`TemplateBuilder`](crate::builder::TemplateBuilder)
/// and never modified afterwards. Instances hold it through an `Arc`.
pub struct Template<F: Flow> {
    pub(crate) initial: F::State,
    pub(crate) transitions: HashMap<F::State, Vec<Transition<F>>>,
    pub(crate) on_enter: HashMap<F::State, Vec<StateHook<F>>>,
    pub(crate) on_exit: HashMap<F::State, Vec<StateHook<F>>>,
    pub(crate) on_transition: Vec<TransitionHook<F>>,
}

impl<F: Flow> Template<F> {
    /// Create a fresh instance positioned at the initial state.
    pub fn instantiate(self: &Arc<Self>) -> Instance<F> {
        Instance::new(Arc::clone(self))
    }

    pub fn initial_state(&self) -> &F::State {
        &self.initial
    }

    /// Transitions registered from `state`, in registration order.
    pub fn transitions_from(&self, state: &F::State) -> &[Transition<F>] {
        self.transitions
            .get(state)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn has_transitions(&self, state: &F::State) -> bool {
        self.transitions.contains_key(state)
    }

    /// Every state the template mentions as initial, source or target.
    pub fn states(&self) -> HashSet<&F::State> {
        let mut states = HashSet::new();
        states.insert(&self.initial);
        for (from, transitions) in &self.transitions {
            states.insert(from);
            states.extend(transitions.iter().map(|t| &t.to));
        }
        states
    }

    /// Pick the single transition `event` fires from `state`.
    pub(crate) fn select(
        &self,
        state: &F::State,
        event: &F::Event,
        ctx: &Context<F>,
    ) -> Result<&Transition<F>, TriggerError> {
        let transitions =
            self.transitions
                .get(state)
                .ok_or_else(|| TriggerError::NoOutgoingTransitions {
                    state: state.name().to_string(),
                })?;

        let mut candidates = transitions.iter().filter(|t| t.can_fire(event, ctx));
        match (candidates.next(), candidates.count()) {
            (Some(transition), 0) => Ok(transition),
            (None, _) => Err(TriggerError::NoMatchingTransition {
                state: state.name().to_string(),
                event: event.name().to_string(),
            }),
            (Some(_), rest) => Err(TriggerError::AmbiguousTransition {
                state: state.name().to_string(),
                event: event.name().to_string(),
                count: rest + 1,
            }),
        }
    }

    /// Run exit, transition and enter hooks for one step.
    ///
    /// Stops at the first failing hook; effects of hooks that already ran
    /// are not undone.
    pub(crate) fn run_hooks(
        &self,
        step: &Step<'_, F>,
        ctx: &mut Context<F>,
        env: &F::Env,
    ) -> Result<(), HookError> {
        ctx.set_state(step.from.clone());
        run_state_hooks(self.on_exit.get(step.from), ctx, env)?;

        ctx.set_state(step.to.clone());
        for hook in &self.on_transition {
            hook(step, ctx, env)?;
        }

        run_state_hooks(self.on_enter.get(step.to), ctx, env)
    }

    pub(crate) fn run_enter(
        &self,
        state: &F::State,
        ctx: &mut Context<F>,
        env: &F::Env,
    ) -> Result<(), HookError> {
        ctx.set_state(state.clone());
        run_state_hooks(self.on_enter.get(state), ctx, env)
    }
}

impl<F: Flow> std::fmt::Debug for Template<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Template")
            .field("initial", &self.initial)
            .field("states", &self.states().len())
            .field("transition_hooks", &self.on_transition.len())
            .finish_non_exhaustive()
    }
}
