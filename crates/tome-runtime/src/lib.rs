//! Tome Runtime - configuration, logging and the event loop.
//!
//! This crate provides:
//! - Layered configuration (`TomeConfig`, `ConfigLoader`)
//! - Logging setup (`LoggingBuilder`)
//! - The status reply to bare mentions (`StatusResponder`)
//! - The event loop (`TomeRuntime`)
//!
//! ```ignore
//! use tome_runtime::TomeRuntime;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runtime = TomeRuntime::builder().modules(&tome::MODULES).build()?;
//!     let (tx, rx) = tokio::sync::mpsc::channel(256);
//!     // The platform adapter feeds `tx` and provides the responder.
//!     runtime.run(rx, responder).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod status;

// Re-exports
pub use config::{ConfigError, ConfigLoader, ConfigResult, TomeConfig, load_config};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::LoggingBuilder;
pub use runtime::{InboundEvent, RuntimeBuilder, TomeRuntime};
pub use status::StatusResponder;

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
