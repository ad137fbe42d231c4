//! Hook signatures.
//!
//! Hooks are the only place a flow performs side effects. They receive the
//! context mutably and the flow's environment explicitly, so a hook never
//! needs to capture shared services.

use crate::core::{Context, Flow};
use crate::engine::error::HookError;

/// Hook run when a state is entered or exited.
pub type StateHook<F> =
    Box<dyn Fn(&mut Context<F>, &<F as Flow>::Env) -> Result<(), HookError> + Send + Sync>;

/// Hook run on every transition, between exit and enter hooks.
pub type TransitionHook<F> = Box<
    dyn Fn(&Step<'_, F>, &mut Context<F>, &<F as Flow>::Env) -> Result<(), HookError>
        + Send
        + Sync,
>;

/// The transition a global hook is being told about.
pub struct Step<'a, F: Flow> {
    pub from: &'a F::State,
    pub to: &'a F::State,
    pub event: &'a F::Event,
}

impl<F: Flow> Step<'_, F> {
    /// True when the step leaves `from` on `event`.
    pub fn is(&self, from: &F::State, event: &F::Event) -> bool {
        self.from == from && self.event == event
    }
}

pub(crate) fn run_state_hooks<F: Flow>(
    hooks: Option<&Vec<StateHook<F>>>,
    ctx: &mut Context<F>,
    env: &F::Env,
) -> Result<(), HookError> {
    for hook in hooks.into_iter().flatten() {
        hook(ctx, env)?;
    }
    Ok(())
}
