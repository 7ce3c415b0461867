//! # Tome
//!
//! A documentation lookup bot for discord.js and MDN.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌────────────┐     ┌──────┐     ┌──────────────────┐
//! │   Adapter    │────▶│ Dispatcher │────▶│ Gate │────▶│ /djs  /mdn  ...  │──▶ DocsLibrary
//! │ (your code)  │     └────────────┘     └──────┘     └──────────────────┘    (SearchCache)
//! └──────────────┘            │
//!        ▲                    └──▶ StatusResponder (bare mentions)
//!        └──────────── Responder (replies, channel messages)
//! ```
//!
//! - **Runtime**: loads configuration, sets up logging, runs the event loop
//! - **Dispatcher**: routes commands, buttons, select menus and autocomplete
//! - **Gate**: guild-only, permission and cooldown checks for commands
//! - **DocsLibrary**: one TTL search cache per documentation set
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tome::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runtime = TomeBot::builder().build()?;
//!     let (tx, rx) = tokio::sync::mpsc::channel(256);
//!     // The platform adapter feeds `tx` with `InboundEvent`s.
//!     runtime.run(rx, responder).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config`: load `tome.toml` configuration files (default)
//! - `json-log`: JSON log output

pub mod bot;
pub mod commands;
pub mod present;

pub use tome_core as core;
pub use tome_docs as docs;
pub use tome_framework as framework;
pub use tome_runtime as runtime;

pub use bot::TomeBot;
pub use commands::MODULES;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use tome::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use crate::bot::TomeBot;
    pub use tome_runtime::{InboundEvent, RuntimeBuilder, TomeConfig, TomeRuntime};

    // Handlers - for adding commands of your own
    pub use tome_framework::{
        BoxError, CommandModule, HandlerDescriptor, InteractionContext, ModuleDescriptor,
    };

    // Outbound side - implemented by the platform adapter
    pub use tome_core::{BoxedResponder, Embed, Reply, Responder};

    // Documentation search
    pub use tome_docs::{DocsLibrary, SearchOptions, SearchOutcome};
}
