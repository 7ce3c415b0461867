//! Assembly of the documentation bot.

use tome_runtime::{RuntimeBuilder, TomeRuntime};

use crate::commands::MODULES;

/// Entry point that wires the lookup commands into a runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct TomeBot;

impl TomeBot {
    /// A runtime builder with every command module and this crate's version.
    ///
    /// ```rust,ignore
    /// let runtime = TomeBot::builder().profile("production").build()?;
    /// ```
    pub fn builder() -> RuntimeBuilder {
        TomeRuntime::builder()
            .modules(&MODULES)
            .version(env!("CARGO_PKG_VERSION"))
    }
}
