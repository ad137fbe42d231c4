//! Runtime side of the engine.
//!
//! A [`Template`] holds a flow's immutable tables; an [`Instance`] is one
//! identity's live copy of it, carrying a private context and cursor.
//! [`Instance::trigger`] is the transition-firing protocol:
//!
//! 1. store the input in the context
//! 2. select exactly one transition for the current state and event
//! 3. run exit hooks, global transition hooks, then enter hooks
//! 4. advance the cursor only if every hook succeeded

mod error;
mod hook;
mod instance;
mod template;

pub use error::{HookError, TriggerError};
pub use hook::{StateHook, Step, TransitionHook};
pub use instance::Instance;
pub use template::{Template, Transition};
