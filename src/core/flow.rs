//! Type-level description of a flow.

use super::state::{Event, State};
use std::fmt::Debug;

/// Bundles the types a flow is made of.
///
/// Templates, instances and registries are generic over a single `Flow`
/// rather than over each of these types separately. Implementors are
/// usually uninhabited marker types.
///
/// - `Data` is the closed record a conversation accumulates across steps.
/// - `Meta` holds caller-supplied handles (reply channel, cancellation).
/// - `Env` is the dependency set handed to every hook invocation.
///
/// # Example
///
/// ```rust
/// use stepflow::core::Flow;
///
/// #[derive(Default)]
/// struct Survey {
///     answers: Vec<String>,
/// }
///
/// enum SurveyFlow {}
///
/// impl Flow for SurveyFlow {
///     type State = &'static str;
///     type Event = &'static str;
///     type Input = String;
///     type Data = Survey;
///     type Meta = ();
///     type Env = ();
/// }
/// ```
pub trait Flow: 'static {
    type State: State;
    type Event: Event;
    type Input: Clone + Debug + Send + Sync + 'static;
    type Data: Default + Send + 'static;
    type Meta: Default + Send + 'static;
    type Env: Send + Sync + 'static;
}
