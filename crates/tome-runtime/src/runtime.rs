//! The Tome event loop.
//!
//! The platform adapter owns the connection. It turns gateway events into
//! [`InboundEvent`]s, pushes them into an mpsc channel and hands the
//! receiving end to [`TomeRuntime::run`] together with its [`Responder`]:
//!
//! ```rust,ignore
//! use tome_runtime::{InboundEvent, TomeRuntime};
//!
//! let runtime = TomeRuntime::builder()
//!     .config_file("tome.toml")
//!     .modules(&tome::MODULES)
//!     .build()?;
//!
//! let (tx, rx) = tokio::sync::mpsc::channel(256);
//! adapter.forward_events(tx);
//! runtime.run(rx, adapter.responder()).await?;
//! ```
//!
//! Every event runs in its own task; at most
//! `dispatch.max_concurrent_events` run at once. A failing event is logged
//! and never stops the loop.
//!
//! [`Responder`]: tome_core::Responder

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tokio::signal;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tome_core::{BoxedResponder, ChannelMessage, Interaction, ParseResult};
use tome_docs::DocsLibrary;
use tome_framework::builtin::delete_button_handler;
use tome_framework::{Dispatcher, LoadReport, ModuleDescriptor, Registry, ServiceMap};
use tracing::{debug, error, info, warn};

use crate::config::{ConfigLoader, PresenceConfig, TomeConfig, validate_config};
use crate::error::RuntimeResult;
use crate::logging;
use crate::status::StatusResponder;

// =============================================================================
// InboundEvent
// =============================================================================

/// An event the runtime reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// A command, component or autocomplete interaction.
    Interaction(Box<Interaction>),
    /// A message posted in a channel.
    Message(ChannelMessage),
}

impl InboundEvent {
    /// Converts a named gateway event.
    ///
    /// Returns `Ok(None)` for events the runtime does not handle.
    pub fn from_gateway(name: &str, payload: Value) -> ParseResult<Option<Self>> {
        match name {
            "INTERACTION_CREATE" => Interaction::from_value(payload).map(|i| Some(Self::Interaction(Box::new(i)))),
            "MESSAGE_CREATE" => ChannelMessage::from_value(payload).map(|m| Some(Self::Message(m))),
            _ => Ok(None),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Interaction(_) => "interaction",
            Self::Message(_) => "message",
        }
    }
}

impl From<Interaction> for InboundEvent {
    fn from(interaction: Interaction) -> Self {
        Self::Interaction(Box::new(interaction))
    }
}

impl From<ChannelMessage> for InboundEvent {
    fn from(message: ChannelMessage) -> Self {
        Self::Message(message)
    }
}

// =============================================================================
// TomeRuntime
// =============================================================================

/// Routes inbound events to the dispatcher and the status responder.
pub struct TomeRuntime {
    config: TomeConfig,
    dispatcher: Dispatcher,
    status: Arc<StatusResponder>,
    load_report: LoadReport,
    shutdown: CancellationToken,
}

impl TomeRuntime {
    /// Creates a runtime builder.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    pub fn config(&self) -> &TomeConfig {
        &self.config
    }

    /// Presence the adapter should advertise after login.
    pub fn presence(&self) -> &PresenceConfig {
        &self.config.bot.presence
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn status(&self) -> &StatusResponder {
        &self.status
    }

    /// Which command modules loaded and which were skipped.
    pub fn load_report(&self) -> &LoadReport {
        &self.load_report
    }

    /// Token that stops [`run`](Self::run) when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Handles a single event to completion.
    pub async fn handle(&self, event: InboundEvent, responder: BoxedResponder) {
        handle_event(self.dispatcher.clone(), Arc::clone(&self.status), event, responder).await;
    }

    /// Runs until Ctrl+C, SIGTERM, the shutdown token, or the event channel
    /// closing.
    pub async fn run(&self, events: mpsc::Receiver<InboundEvent>, responder: BoxedResponder) -> RuntimeResult<()> {
        info!("Tome runtime is now running. Press Ctrl+C to stop.");
        self.run_until(events, responder, wait_for_shutdown()).await
    }

    /// Runs until `shutdown` completes, the shutdown token is cancelled, or
    /// the event channel closes. In-flight events are awaited before
    /// returning.
    pub async fn run_until<F>(
        &self,
        mut events: mpsc::Receiver<InboundEvent>,
        responder: BoxedResponder,
        shutdown: F,
    ) -> RuntimeResult<()>
    where
        F: Future<Output = ()>,
    {
        let limit = Arc::new(Semaphore::new(self.config.dispatch.max_concurrent_events));
        let mut tasks = JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                () = &mut shutdown => break,
                () = self.shutdown.cancelled() => {
                    info!("Shutdown token cancelled");
                    break;
                }
                maybe_event = events.recv() => {
                    let Some(event) = maybe_event else {
                        info!("Event channel closed");
                        break;
                    };
                    let Ok(permit) = Arc::clone(&limit).acquire_owned().await else {
                        break;
                    };
                    let dispatcher = self.dispatcher.clone();
                    let status = Arc::clone(&self.status);
                    let responder = Arc::clone(&responder);
                    tasks.spawn(async move {
                        handle_event(dispatcher, status, event, responder).await;
                        drop(permit);
                    });
                }
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => log_join(joined),
            }
        }

        debug!(in_flight = tasks.len(), "Waiting for in-flight events");
        while let Some(joined) = tasks.join_next().await {
            log_join(joined);
        }
        info!("Runtime stopped");
        Ok(())
    }
}

impl std::fmt::Debug for TomeRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TomeRuntime")
            .field("dispatcher", &self.dispatcher)
            .field("load_report", &self.load_report)
            .finish_non_exhaustive()
    }
}

async fn handle_event(
    dispatcher: Dispatcher,
    status: Arc<StatusResponder>,
    event: InboundEvent,
    responder: BoxedResponder,
) {
    let kind = event.name();
    match event {
        // The dispatcher has already answered the user and logged the cause.
        InboundEvent::Interaction(interaction) => {
            let _ = dispatcher.dispatch(*interaction, responder).await;
        }
        InboundEvent::Message(message) => {
            if let Err(e) = status.handle(&message, responder.as_ref()).await {
                warn!(event = kind, channel_id = %message.channel_id, error = %e, "Failed to send status");
            }
        }
    }
}

fn log_join(joined: Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        error!(error = %e, "Event task failed");
    }
}

/// Waits for Ctrl+C or, on unix, SIGTERM.
async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(e) => {
                warn!(error = %e, "Failed to register SIGTERM handler, only Ctrl+C will stop the runtime");
                wait_for_ctrl_c().await;
                return;
            }
        };

        tokio::select! {
            () = wait_for_ctrl_c() => {}
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    wait_for_ctrl_c().await;
}

async fn wait_for_ctrl_c() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(e) => {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for [`TomeRuntime`].
///
/// ```rust,ignore
/// let runtime = TomeRuntime::builder()
///     .profile("production")
///     .modules(&tome::MODULES)
///     .build()?;
/// ```
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
    config: Option<TomeConfig>,
    modules: Vec<ModuleDescriptor>,
    services: ServiceMap,
    docs: Option<Arc<DocsLibrary>>,
    version: String,
    init_logging: bool,
}

impl RuntimeBuilder {
    /// Creates a builder that searches the current directory for config.
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new().with_current_dir(),
            config: None,
            modules: Vec::new(),
            services: ServiceMap::new(),
            docs: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
            init_logging: true,
        }
    }

    /// Sets a specific configuration file to load.
    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the configuration profile (e.g., "development", "production").
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Uses `config` as is instead of loading one.
    pub fn config(mut self, config: TomeConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Adds a command module.
    pub fn module(mut self, module: ModuleDescriptor) -> Self {
        self.modules.push(module);
        self
    }

    /// Adds command modules.
    pub fn modules(mut self, modules: &[ModuleDescriptor]) -> Self {
        self.modules.extend_from_slice(modules);
        self
    }

    /// Adds a shared service visible to every handler.
    pub fn service<T: Send + Sync + 'static>(mut self, service: Arc<T>) -> Self {
        self.services.insert(service);
        self
    }

    /// Uses `docs` instead of building HTTP-backed sources from config.
    pub fn docs(mut self, docs: Arc<DocsLibrary>) -> Self {
        self.docs = Some(docs);
        self
    }

    /// Version shown in the status message.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Leaves the global tracing subscriber alone.
    pub fn without_logging(mut self) -> Self {
        self.init_logging = false;
        self
    }

    /// Loads and validates configuration, then assembles the runtime.
    pub fn build(self) -> RuntimeResult<TomeRuntime> {
        let config = match self.config {
            Some(config) => config,
            None => self.config_loader.load()?,
        };
        validate_config(&config)?;

        if self.init_logging {
            logging::init_from_config(&config.logging);
        }

        let registry = Arc::new(Registry::new());
        let load_report = registry.load(&self.modules);
        registry.register(delete_button_handler());

        let docs = match self.docs {
            Some(docs) => docs,
            None => Arc::new(DocsLibrary::from_config(&config.docs)?),
        };
        let services = self.services.with(docs);

        let dispatcher = Dispatcher::new(registry, services);
        let status = Arc::new(StatusResponder::new(&config.bot, self.version));

        info!(
            modules = load_report.loaded.len(),
            failed = load_report.failed.len(),
            handlers = load_report.registered,
            log_level = %config.logging.level,
            "Runtime initialized from configuration"
        );

        Ok(TomeRuntime {
            config,
            dispatcher,
            status,
            load_report,
            shutdown: CancellationToken::new(),
        })
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
