//! Logging setup for Tome.
//!
//! ```rust,ignore
//! use tome_runtime::logging;
//!
//! let config = tome_runtime::config::load_config()?;
//! logging::init_from_config(&config.logging);
//! ```
//!
//! `RUST_LOG`, when set, replaces the configured base level; per-module
//! filters from the configuration are added on top.

use std::ffi::OsStr;
use std::path::Path;

use tracing::warn;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LogFormat, LogLevel, LogOutput, LoggingConfig, SpanEvents};

/// Initializes logging from a [`LoggingConfig`].
///
/// Does nothing if a global subscriber is already installed.
pub fn init_from_config(config: &LoggingConfig) {
    let _ = LoggingBuilder::from_config(config).try_init();
}

/// Builds the global tracing subscriber out of a [`LoggingConfig`].
#[derive(Debug, Default)]
pub struct LoggingBuilder {
    config: LoggingConfig,
    /// `module=level` directives, sorted by module.
    directives: Vec<String>,
}

impl LoggingBuilder {
    /// Info level to stdout in the compact format.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &LoggingConfig) -> Self {
        let mut filters: Vec<_> = config.filters.iter().collect();
        filters.sort_by(|a, b| a.0.cmp(b.0));

        Self {
            config: config.clone(),
            directives: filters
                .into_iter()
                .map(|(module, level)| format!("{module}={level}"))
                .collect(),
        }
    }

    pub fn level(mut self, level: LogLevel) -> Self {
        self.config.level = level;
        self
    }

    /// Adds a filter directive such as `tome_docs=debug`.
    pub fn directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    pub fn span_events(mut self, events: SpanEvents) -> Self {
        self.config.span_events = events;
        self
    }

    fn filter(&self) -> EnvFilter {
        let mut filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.config.level.as_str()));
        for directive in &self.directives {
            match directive.parse() {
                Ok(d) => filter = filter.add_directive(d),
                Err(e) => warn!(%directive, error = %e, "Ignoring invalid log filter"),
            }
        }
        filter
    }

    fn fmt_span(&self) -> FmtSpan {
        match self.config.span_events {
            SpanEvents::None => FmtSpan::NONE,
            SpanEvents::Lifecycle => FmtSpan::NEW | FmtSpan::CLOSE,
        }
    }

    /// Installs the subscriber, ignoring an existing one.
    pub fn init(self) {
        let _ = self.try_init();
    }

    /// Installs the subscriber, failing if one is already installed.
    pub fn try_init(self) -> Result<(), TryInitError> {
        let filter = self.filter();
        let spans = self.fmt_span();
        let LoggingConfig {
            format,
            output,
            file_path,
            thread_ids,
            file_location,
            ..
        } = self.config;

        macro_rules! install {
            ($writer:expr) => {{
                let layer = fmt::layer()
                    .with_writer($writer)
                    .with_span_events(spans)
                    .with_thread_ids(thread_ids)
                    .with_file(file_location)
                    .with_line_number(file_location);
                let registry = tracing_subscriber::registry().with(filter);
                match format {
                    LogFormat::Compact => registry.with(layer.compact()).try_init(),
                    LogFormat::Full => registry.with(layer).try_init(),
                    LogFormat::Pretty => registry.with(layer.pretty()).try_init(),
                    #[cfg(feature = "json-log")]
                    LogFormat::Json => registry.with(layer.json()).try_init(),
                }
            }};
        }

        match (output, file_path) {
            (LogOutput::Stdout, _) => install!(std::io::stdout),
            (LogOutput::Stderr, _) => install!(std::io::stderr),
            (LogOutput::File, Some(path)) => install!(tracing_appender::rolling::never(
                path.parent().unwrap_or_else(|| Path::new(".")),
                path.file_name().unwrap_or_else(|| OsStr::new("tome.log")),
            )),
            (LogOutput::File, None) => {
                let result = install!(std::io::stdout);
                warn!("File output requested without a file path, logging to stdout");
                result
            }
        }
    }
}
