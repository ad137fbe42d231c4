//! Builder API for ergonomic template construction.
//!
//! Templates are assembled with fluent builders and then frozen: `build()`
//! consumes the builder and returns a shared, read-only
//! [`Template`](crate::engine::Template). The `state_enum!` and `event_enum!` macros
//! declare label enums with minimal boilerplate.

pub mod error;
pub mod macros;
pub mod template;
pub mod transition;

pub use error::{BuildError, UnknownLabel};
pub use template::TemplateBuilder;
pub use transition::TransitionBuilder;
