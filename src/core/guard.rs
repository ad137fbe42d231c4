//! Guard predicates for controlling state transitions.
//!
//! Guards are pure boolean functions over the current context. They decide
//! which of several transitions sharing a source state and event is
//! eligible at fire time.

use super::context::Context;
use super::flow::Flow;

/// Pure predicate that determines if a transition can fire.
///
/// The predicate must be deterministic and free of side effects: the engine
/// may evaluate it any number of times while choosing a transition.
///
/// # Example
///
/// ```rust
/// use stepflow::core::{Flow, Guard};
///
/// enum Quiz {}
///
/// impl Flow for Quiz {
///     type State = &'static str;
///     type Event = &'static str;
///     type Input = String;
///     type Data = ();
///     type Meta = ();
///     type Env = ();
/// }
///
/// let says_yes = Guard::<Quiz>::new(|ctx| ctx.input().is_some_and(|i| i == "yes"));
/// ```
pub struct Guard<F: Flow> {
    predicate: Box<dyn Fn(&Context<F>) -> bool + Send + Sync>,
}

impl<F: Flow> Guard<F> {
    /// Create a guard from a pure predicate function.
    pub fn new<P>(predicate: P) -> Self
    where
        P: Fn(&Context<F>) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Box::new(predicate),
        }
    }

    /// Check if the guard allows the transition for this context.
    pub fn check(&self, ctx: &Context<F>) -> bool {
        (self.predicate)(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    enum TestFlow {}

    impl Flow for TestFlow {
        type State = &'static str;
        type Event = &'static str;
        type Input = u32;
        type Data = u32;
        type Meta = ();
        type Env = ();
    }

    #[test]
    fn guard_reads_input() {
        let guard = Guard::<TestFlow>::new(|ctx| ctx.input().is_some_and(|n| *n > 10));
        let mut ctx = Context::new("S");

        assert!(!guard.check(&ctx));

        ctx.set_input(Some(11));
        assert!(guard.check(&ctx));
    }

    #[test]
    fn guard_reads_data() {
        let guard = Guard::<TestFlow>::new(|ctx| ctx.data % 2 == 0);
        let mut ctx = Context::new("S");

        assert!(guard.check(&ctx));

        ctx.data = 3;
        assert!(!guard.check(&ctx));
    }

    #[test]
    fn guard_is_deterministic() {
        let guard = Guard::<TestFlow>::new(|ctx| ctx.data > 0);
        let mut ctx = Context::new("S");
        ctx.data = 5;

        assert_eq!(guard.check(&ctx), guard.check(&ctx));
    }
}
