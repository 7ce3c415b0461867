//! Configuration for the Tome runtime.
//!
//! [`TomeConfig`] is assembled by [`ConfigLoader`] from built-in defaults,
//! TOML files and `TOME_*` environment variables, then checked by
//! [`validate_config`].

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigFiles, ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    ActivityKind, BotConfig, DispatchConfig, LogFormat, LogLevel, LogOutput, LoggingConfig,
    PresenceConfig, PresenceStatus, SpanEvents, TomeConfig,
};
pub use validation::validate_config;
