//! # Tome Framework
//!
//! Interaction routing for the Tome documentation bot.
//!
//! - [`Registry`]: four handler namespaces (command, button, select menu,
//!   autocomplete), filled from statically listed [`ModuleDescriptor`]s
//! - [`Gate`]: guild-only, permission and cooldown admission for commands
//! - [`Dispatcher`]: classifies, gates, runs, and contains handler failures
//! - [`InteractionContext`]: what a handler sees (interaction, responder,
//!   services)
//!
//! ```text
//! Interaction ──▶ Dispatcher ──▶ Gate ──▶ Registry lookup ──▶ handler
//!                     │                                          │
//!                     └──────── "An error has occurred" ◀── error/panic
//! ```

pub mod builtin;
pub mod context;
pub mod descriptor;
pub mod dispatcher;
pub mod error;
pub mod gate;
pub mod handler;
pub mod module;
pub mod registry;
pub mod services;

pub use context::InteractionContext;
pub use descriptor::{HandlerDescriptor, autocomplete_key};
pub use dispatcher::{Dispatcher, routing_key};
pub use error::{DispatchError, DispatchResult, ModuleError, PermissionSubject, ServiceNotFound};
pub use gate::{CooldownDecision, CooldownStore, Gate};
pub use handler::{BoxedExecutor, executor};
pub use module::{CommandModule, ModuleDescriptor};
pub use registry::{LoadReport, Registry};
pub use services::ServiceMap;

pub use tower::BoxError;
