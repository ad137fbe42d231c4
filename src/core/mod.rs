//! Core state machine types.
//!
//! This module contains the building blocks every flow is made of:
//! - State and event labels via the `State` and `Event` traits
//! - The `Flow` bundle naming a flow's types
//! - The per-instance `Context`
//! - Guard predicates for transition control
//! - Bounded history of committed transitions

mod context;
mod flow;
mod guard;
mod history;
mod state;

pub use context::Context;
pub use flow::Flow;
pub use guard::Guard;
pub use history::{RecordSummary, TransitionHistory, TransitionRecord, HISTORY_LIMIT};
pub use state::{Event, State};
