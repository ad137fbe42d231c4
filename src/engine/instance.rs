//! Per-identity runtime instance and the trigger protocol.

use crate::core::{Context, Event, Flow, State, TransitionHistory, TransitionRecord};
use crate::engine::error::{HookError, TriggerError};
use crate::engine::hook::Step;
use crate::engine::template::Template;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use uuid::Uuid;

/// A live copy of a template tracking one identity's conversation.
///
/// The template's tables are shared; the context, the current-state cursor
/// and the history are private. Every operation takes the instance's own
/// lock, so operations on one instance are serialized while different
/// instances never contend.
pub struct Instance<F: Flow> {
    id: Uuid,
    created_at: DateTime<Utc>,
    template: Arc<Template<F>>,
    inner: Mutex<Inner<F>>,
}

struct Inner<F: Flow> {
    current: F::State,
    context: Context<F>,
    history: TransitionHistory<F::State, F::Event>,
    last_activity: DateTime<Utc>,
}

impl<F: Flow> Instance<F> {
    pub(crate) fn new(template: Arc<Template<F>>) -> Self {
        let initial = template.initial.clone();
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            inner: Mutex::new(Inner {
                current: initial.clone(),
                context: Context::new(initial),
                history: TransitionHistory::new(),
                last_activity: now,
            }),
            template,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn template(&self) -> &Arc<Template<F>> {
        &self.template
    }

    /// Committed current state.
    pub fn current_state(&self) -> F::State {
        self.inner.lock().current.clone()
    }

    /// Time of the last trigger, forced state or enter call.
    pub fn last_activity(&self) -> DateTime<Utc> {
        self.inner.lock().last_activity
    }

    /// Committed transitions, oldest first.
    pub fn history(&self) -> Vec<TransitionRecord<F::State, F::Event>> {
        self.inner.lock().history.iter().cloned().collect()
    }

    /// Run `f` against the context under the instance lock.
    pub fn with_context<R>(&self, f: impl FnOnce(&Context<F>) -> R) -> R {
        f(&self.inner.lock().context)
    }

    /// Run `f` against the mutable context under the instance lock.
    pub fn with_context_mut<R>(&self, f: impl FnOnce(&mut Context<F>) -> R) -> R {
        f(&mut self.inner.lock().context)
    }

    /// Move the cursor to `state` without running any hook.
    pub fn force_state(&self, state: F::State) {
        self.force_locked(&mut self.inner.lock(), state);
    }

    /// Run only the enter hooks of `state`.
    ///
    /// The cursor does not move and nothing is recorded; this renders a
    /// state's prompt after creation or after [`force_state`](Self::force_state).
    pub fn call_enter(&self, state: &F::State, env: &F::Env) -> Result<(), HookError> {
        self.enter_locked(&mut self.inner.lock(), state, env)
    }

    /// Prepare the context, force `state` and run its enter hooks under a
    /// single hold of the instance lock.
    ///
    /// No trigger can interleave between the three steps.
    pub fn restart(
        &self,
        state: F::State,
        env: &F::Env,
        prepare: impl FnOnce(&mut Context<F>),
    ) -> Result<(), HookError> {
        let mut inner = self.inner.lock();
        prepare(&mut inner.context);
        self.force_locked(&mut inner, state.clone());
        self.enter_locked(&mut inner, &state, env)
    }

    fn force_locked(&self, inner: &mut Inner<F>, state: F::State) {
        tracing::debug!(
            instance = %self.id,
            from = inner.current.name(),
            to = state.name(),
            "forcing state"
        );
        inner.context.set_state(state.clone());
        inner.current = state;
        inner.last_activity = Utc::now();
    }

    fn enter_locked(
        &self,
        inner: &mut Inner<F>,
        state: &F::State,
        env: &F::Env,
    ) -> Result<(), HookError> {
        inner.last_activity = Utc::now();
        self.template
            .run_enter(state, &mut inner.context, env)
            .inspect_err(|err| {
                tracing::warn!(
                    instance = %self.id,
                    state = state.name(),
                    error = %err,
                    "enter hook failed"
                );
            })
    }

    /// Consume `event` and transition if exactly one transition matches.
    ///
    /// Hooks run in order: exit hooks of the current state, global
    /// transition hooks, enter hooks of the target state. The cursor only
    /// advances once all of them succeed; the first failure is returned and
    /// leaves the instance at its current state.
    pub fn trigger(
        &self,
        event: F::Event,
        input: Option<F::Input>,
        env: &F::Env,
    ) -> Result<F::State, TriggerError> {
        self.trigger_with(event, input, env, |_| {})
    }

    /// Like [`trigger`](Self::trigger), running `prepare` against the
    /// context first under the same hold of the instance lock.
    ///
    /// Callers use it to attach per-request handles to `meta` that the
    /// triggered hooks are guaranteed to see.
    pub fn trigger_with(
        &self,
        event: F::Event,
        input: Option<F::Input>,
        env: &F::Env,
        prepare: impl FnOnce(&mut Context<F>),
    ) -> Result<F::State, TriggerError> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        prepare(&mut inner.context);
        inner.last_activity = Utc::now();
        inner.context.set_input(input);

        let from = inner.current.clone();
        let transition = self
            .template
            .select(&from, &event, &inner.context)
            .inspect_err(|err| {
                tracing::warn!(instance = %self.id, error = %err, "no transition selected");
            })?;
        let to = transition.to.clone();

        tracing::debug!(
            instance = %self.id,
            from = from.name(),
            to = to.name(),
            event = event.name(),
            "firing transition"
        );

        let step = Step {
            from: &from,
            to: &to,
            event: &event,
        };
        if let Err(err) = self.template.run_hooks(&step, &mut inner.context, env) {
            inner.context.set_state(from.clone());
            tracing::warn!(
                instance = %self.id,
                from = from.name(),
                to = to.name(),
                error = %err,
                "transition aborted by hook"
            );
            return Err(err.into());
        }

        inner.current = to.clone();
        inner.history.push(TransitionRecord {
            from,
            to: to.clone(),
            event,
            timestamp: Utc::now(),
        });
        Ok(to)
    }
}

impl<F: Flow> std::fmt::Debug for Instance<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance")
            .field("id", &self.id)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}
