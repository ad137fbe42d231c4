//! Builder for constructing templates.

use crate::builder::error::BuildError;
use crate::builder::transition::TransitionBuilder;
use crate::core::{Context, Flow, Guard};
use crate::engine::{HookError, StateHook, Step, Template, Transition, TransitionHook};
use std::collections::HashMap;
use std::sync::Arc;

/// Builder for constructing templates with a fluent API.
///
/// Every registration is pure accumulation. Hooks and transitions sharing a
/// key keep their registration order, which is the order they run and are
/// matched in.
///
/// # Example
///
/// ```rust
/// use stepflow::builder::TemplateBuilder;
/// use stepflow::core::Flow;
///
/// enum Door {}
///
/// impl Flow for Door {
///     type State = &'static str;
///     type Event = &'static str;
///     type Input = String;
///     type Data = u32;
///     type Meta = ();
///     type Env = ();
/// }
///
/// let template = TemplateBuilder::<Door>::new()
///     .initial("closed")
///     .add_transition("closed", "open", "opened")
///     .add_transition("opened", "close", "closed")
///     .on_enter("opened", |ctx, _| {
///         ctx.data += 1;
///         Ok(())
///     })
///     .build()
///     .unwrap();
///
/// let door = template.instantiate();
/// door.trigger("open", None, &()).unwrap();
/// assert_eq!(door.current_state(), "opened");
/// ```
pub struct TemplateBuilder<F: Flow> {
    initial: Option<F::State>,
    transitions: HashMap<F::State, Vec<Transition<F>>>,
    on_enter: HashMap<F::State, Vec<StateHook<F>>>,
    on_exit: HashMap<F::State, Vec<StateHook<F>>>,
    on_transition: Vec<TransitionHook<F>>,
}

impl<F: Flow> TemplateBuilder<F> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            initial: None,
            transitions: HashMap::new(),
            on_enter: HashMap::new(),
            on_exit: HashMap::new(),
            on_transition: Vec::new(),
        }
    }

    /// Set the initial state (required).
    pub fn initial(mut self, state: F::State) -> Self {
        self.initial = Some(state);
        self
    }

    /// Add an unguarded transition.
    pub fn add_transition(self, from: F::State, event: F::Event, to: F::State) -> Self {
        self.push_transition(Transition {
            from,
            event,
            to,
            guard: None,
        })
    }

    /// Add a transition that only fires while `guard` holds.
    pub fn add_guarded_transition(
        self,
        from: F::State,
        event: F::Event,
        to: F::State,
        guard: Guard<F>,
    ) -> Self {
        self.push_transition(Transition {
            from,
            event,
            to,
            guard: Some(guard),
        })
    }

    /// Add a transition guarded by a closure.
    pub fn add_transition_when<P>(
        self,
        from: F::State,
        event: F::Event,
        to: F::State,
        predicate: P,
    ) -> Self
    where
        P: Fn(&Context<F>) -> bool + Send + Sync + 'static,
    {
        self.add_guarded_transition(from, event, to, Guard::new(predicate))
    }

    /// Add a transition using a builder.
    /// Returns an error if the builder fails validation.
    pub fn transition(self, builder: TransitionBuilder<F>) -> Result<Self, BuildError> {
        let transition = builder.build()?;
        Ok(self.push_transition(transition))
    }

    /// Run `hook` every time `state` is entered.
    pub fn on_enter<H>(mut self, state: F::State, hook: H) -> Self
    where
        H: Fn(&mut Context<F>, &F::Env) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.on_enter.entry(state).or_default().push(Box::new(hook));
        self
    }

    /// Run `hook` every time `state` is left.
    pub fn on_exit<H>(mut self, state: F::State, hook: H) -> Self
    where
        H: Fn(&mut Context<F>, &F::Env) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.on_exit.entry(state).or_default().push(Box::new(hook));
        self
    }

    /// Run `hook` on every transition.
    pub fn on_transition<H>(mut self, hook: H) -> Self
    where
        H: Fn(&Step<'_, F>, &mut Context<F>, &F::Env) -> Result<(), HookError>
            + Send
            + Sync
            + 'static,
    {
        self.on_transition.push(Box::new(hook));
        self
    }

    /// Build the template.
    /// Returns an error if no initial state was set.
    pub fn build(self) -> Result<Arc<Template<F>>, BuildError> {
        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;

        Ok(Arc::new(Template {
            initial,
            transitions: self.transitions,
            on_enter: self.on_enter,
            on_exit: self.on_exit,
            on_transition: self.on_transition,
        }))
    }

    fn push_transition(mut self, transition: Transition<F>) -> Self {
        self.transitions
            .entry(transition.from.clone())
            .or_default()
            .push(transition);
        self
    }
}

impl<F: Flow> Default for TemplateBuilder<F> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    enum TestFlow {}

    impl Flow for TestFlow {
        type State = &'static str;
        type Event = &'static str;
        type Input = String;
        type Data = Vec<&'static str>;
        type Meta = ();
        type Env = ();
    }

    #[test]
    fn builder_validates_required_fields() {
        let result = TemplateBuilder::<TestFlow>::new()
            .add_transition("A", "go", "B")
            .build();

        assert!(matches!(result, Err(BuildError::MissingInitialState)));
    }

    #[test]
    fn template_without_transitions_builds() {
        let template = TemplateBuilder::<TestFlow>::new().initial("A").build().unwrap();

        assert_eq!(*template.initial_state(), "A");
        assert!(!template.has_transitions(&"A"));
    }

    #[test]
    fn transitions_keep_registration_order() {
        let template = TemplateBuilder::<TestFlow>::new()
            .initial("A")
            .add_transition("A", "go", "B")
            .add_transition_when("A", "go", "C", |_| false)
            .transition(TransitionBuilder::new().from("A").on("stop").to("D"))
            .unwrap()
            .build()
            .unwrap();

        let targets: Vec<_> = template.transitions_from(&"A").iter().map(|t| *t.to()).collect();
        assert_eq!(targets, vec!["B", "C", "D"]);
    }

    #[test]
    fn hooks_keep_registration_order() {
        let template = TemplateBuilder::<TestFlow>::new()
            .initial("A")
            .add_transition("A", "go", "B")
            .on_enter("B", |ctx, _| {
                ctx.data.push("first");
                Ok(())
            })
            .on_enter("B", |ctx, _| {
                ctx.data.push("second");
                Ok(())
            })
            .build()
            .unwrap();

        let instance = template.instantiate();
        instance.trigger("go", None, &()).unwrap();

        instance.with_context(|ctx| assert_eq!(ctx.data, vec!["first", "second"]));
    }

    #[test]
    fn invalid_transition_builder_is_reported() {
        let result = TemplateBuilder::<TestFlow>::new()
            .initial("A")
            .transition(TransitionBuilder::new().from("A").to("B"));

        assert!(matches!(result, Err(BuildError::MissingEvent)));
    }
}
