//! Configuration schema definitions.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tome_docs::DocsConfig;

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomeConfig {
    /// Bot identity and presence.
    #[serde(default)]
    pub bot: BotConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Documentation sources.
    #[serde(default)]
    pub docs: DocsConfig,

    /// Event loop settings.
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

// =============================================================================
// Bot
// =============================================================================

/// Bot identity and presence.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct BotConfig {
    /// Platform token. Consumed by the platform adapter, never logged.
    #[serde(default)]
    pub token: Option<String>,

    /// Name shown in the status message.
    #[serde(default = "default_bot_name")]
    pub name: String,

    /// Description shown in the status message.
    #[serde(default = "default_bot_description")]
    pub description: String,

    /// Repository linked from the status message.
    #[serde(default = "default_repository_url")]
    pub repository_url: String,

    #[serde(default)]
    pub presence: PresenceConfig,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: None,
            name: default_bot_name(),
            description: default_bot_description(),
            repository_url: default_repository_url(),
            presence: PresenceConfig::default(),
        }
    }
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("name", &self.name)
            .field("description", &self.description)
            .field("repository_url", &self.repository_url)
            .field("presence", &self.presence)
            .finish()
    }
}

fn default_bot_name() -> String {
    "Tome".to_string()
}

fn default_bot_description() -> String {
    "A documentation lookup bot for discord.js and MDN".to_string()
}

fn default_repository_url() -> String {
    "https://github.com/the-programmers-hangout/tome".to_string()
}

/// Presence advertised after login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceConfig {
    /// Activity text; `None` advertises no activity.
    #[serde(default = "default_activity")]
    pub activity: Option<String>,

    #[serde(default)]
    pub activity_kind: ActivityKind,

    #[serde(default)]
    pub status: PresenceStatus,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            activity: default_activity(),
            activity_kind: ActivityKind::default(),
            status: PresenceStatus::default(),
        }
    }
}

fn default_activity() -> Option<String> {
    Some("Read the docs".to_string())
}

/// Verb of the advertised activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    #[default]
    Playing,
    Listening,
    Watching,
    Competing,
}

/// Online status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    #[default]
    Online,
    Idle,
    Dnd,
    Invisible,
}

// =============================================================================
// Dispatch
// =============================================================================

/// Event loop settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Upper bound on events handled at the same time.
    #[serde(default = "default_max_concurrent_events")]
    pub max_concurrent_events: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent_events: default_max_concurrent_events(),
        }
    }
}

fn default_max_concurrent_events() -> usize {
    64
}

// =============================================================================
// Logging
// =============================================================================

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: LogLevel,

    #[serde(default)]
    pub format: LogFormat,

    #[serde(default)]
    pub output: LogOutput,

    /// Log file, used when `output = "file"`.
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    /// `lifecycle` logs when each `dispatch` span opens and closes.
    #[serde(default)]
    pub span_events: SpanEvents,

    #[serde(default)]
    pub thread_ids: bool,

    /// Include file names and line numbers.
    #[serde(default)]
    pub file_location: bool,

    /// Per-module levels, e.g. `tome_docs = "debug"`.
    #[serde(default)]
    pub filters: HashMap<String, LogLevel>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            format: LogFormat::default(),
            output: LogOutput::default(),
            file_path: None,
            span_events: SpanEvents::default(),
            thread_ids: false,
            file_location: false,
            filters: HashMap::new(),
        }
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    #[cfg(feature = "json-log")]
    Json,
}

/// Log destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

/// Span events written to the log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanEvents {
    #[default]
    None,
    /// Span creation and close, with the span's busy and idle time.
    Lifecycle,
}
