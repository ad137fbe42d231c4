//! Stepflow: a concurrent finite state machine engine for conversations
//!
//! Stepflow drives multi-step interactive flows, such as a guided "create
//! account" wizard, for many identities at once. Each identity progresses
//! through the same states under its own private data.
//!
//! # Core Concepts
//!
//! - **Template**: immutable states, transitions, guards and hooks, built once
//! - **Instance**: one identity's live copy with a private context and cursor
//! - **Registry**: identity → instance map, locked separately from instances
//! - **Trigger**: consume an event, run hooks, and commit only on success
//!
//! # Example
//!
//! ```rust
//! use stepflow::builder::TemplateBuilder;
//! use stepflow::core::Flow;
//! use stepflow::engine::HookError;
//! use stepflow::registry::Registry;
//!
//! #[derive(Default)]
//! struct Signup {
//!     username: Option<String>,
//! }
//!
//! enum SignupFlow {}
//!
//! impl Flow for SignupFlow {
//!     type State = &'static str;
//!     type Event = &'static str;
//!     type Input = String;
//!     type Data = Signup;
//!     type Meta = ();
//!     type Env = ();
//! }
//!
//! let template = TemplateBuilder::<SignupFlow>::new()
//!     .initial("DEFAULT")
//!     .add_transition("DEFAULT", "create", "NAME")
//!     .add_transition("NAME", "continue", "DONE")
//!     .on_exit("NAME", |ctx, _| {
//!         let name = ctx.input().cloned().unwrap_or_default();
//!         if name.len() < 3 {
//!             return Err(HookError::rejected("name too short"));
//!         }
//!         ctx.data.username = Some(name);
//!         Ok(())
//!     })
//!     .build()
//!     .unwrap();
//!
//! let registry = Registry::new(template);
//! registry.add("alice").unwrap();
//!
//! registry.trigger(&"alice", "create", None, &()).unwrap();
//! assert!(registry.trigger(&"alice", "continue", Some("al".into()), &()).is_err());
//! registry.trigger(&"alice", "continue", Some("alice".into()), &()).unwrap();
//!
//! assert_eq!(registry.get(&"alice").unwrap().current_state(), "DONE");
//! ```

pub mod builder;
pub mod config;
pub mod core;
pub mod dispatch;
pub mod engine;
pub mod registry;
pub mod wizard;

// Re-export commonly used types
pub use builder::{BuildError, TemplateBuilder};
pub use core::{Context, Event, Flow, Guard, State};
pub use engine::{HookError, Instance, Template, TriggerError};
pub use registry::{Registry, RegistryError};
