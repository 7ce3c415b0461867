//! Handler registry.
//!
//! Four independent namespaces (command, button, select menu, autocomplete)
//! map keys to [`HandlerDescriptor`]s. The registry is filled once at startup
//! by [`Registry::load`]; the runtime may still register built-in handlers
//! later, so the maps sit behind read-write locks.
//!
//! Registering a key that already exists replaces the earlier descriptor.
//! The replacement is logged as a warning and the displaced descriptor is
//! returned to the caller.

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};

use parking_lot::RwLock;
use tome_core::InteractionKind;
use tracing::{debug, error, info, warn};

use crate::descriptor::HandlerDescriptor;
use crate::error::ModuleError;
use crate::module::ModuleDescriptor;

type Namespace = RwLock<HashMap<String, HandlerDescriptor>>;

/// Summary of a [`Registry::load`] call.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadReport {
    /// Modules whose descriptors were registered.
    pub loaded: Vec<&'static str>,
    /// Modules that failed and contributed nothing.
    pub failed: Vec<ModuleError>,
    /// Total descriptors registered.
    pub registered: usize,
}

/// Catalog of handler descriptors, one namespace per interaction kind.
#[derive(Default)]
pub struct Registry {
    commands: Namespace,
    buttons: Namespace,
    select_menus: Namespace,
    autocompletes: Namespace,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn namespace(&self, kind: InteractionKind) -> &Namespace {
        match kind {
            InteractionKind::Command => &self.commands,
            InteractionKind::Button => &self.buttons,
            InteractionKind::SelectMenu => &self.select_menus,
            InteractionKind::Autocomplete => &self.autocompletes,
        }
    }

    /// Inserts a descriptor into the namespace of its kind.
    ///
    /// Returns the descriptor previously registered under the same key.
    pub fn register(&self, descriptor: HandlerDescriptor) -> Option<HandlerDescriptor> {
        let kind = descriptor.kind();
        let key = descriptor.key().to_string();
        let previous = self.namespace(kind).write().insert(key.clone(), descriptor);
        if previous.is_some() {
            warn!(kind = %kind, key = %key, "Duplicate handler key, replacing earlier registration");
        } else {
            debug!(kind = %kind, key = %key, "Registered handler");
        }
        previous
    }

    /// Looks up the descriptor for `key` in `kind`'s namespace.
    pub fn lookup(&self, kind: InteractionKind, key: &str) -> Option<HandlerDescriptor> {
        self.namespace(kind).read().get(key).cloned()
    }

    /// Returns the number of descriptors in `kind`'s namespace.
    pub fn len(&self, kind: InteractionKind) -> usize {
        self.namespace(kind).read().len()
    }

    /// Returns `true` if no namespace holds a descriptor.
    pub fn is_empty(&self) -> bool {
        InteractionKind::ALL.iter().all(|k| self.len(*k) == 0)
    }

    /// Returns the registered keys of `kind`, sorted.
    pub fn keys(&self, kind: InteractionKind) -> Vec<String> {
        let mut keys: Vec<_> = self.namespace(kind).read().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Builds each module and registers its descriptors.
    ///
    /// A module that fails to build, panics, or is malformed is logged and
    /// skipped; the remaining modules still load.
    pub fn load(&self, modules: &[ModuleDescriptor]) -> LoadReport {
        let mut report = LoadReport::default();

        for module in modules {
            match build_module(module) {
                Ok(descriptors) => {
                    let count = descriptors.len();
                    for descriptor in descriptors {
                        self.register(descriptor);
                    }
                    debug!(module = module.name, handlers = count, "Loaded command module");
                    report.loaded.push(module.name);
                    report.registered += count;
                }
                Err(e) => {
                    error!(module = module.name, error = %e, "Failed to load command module, skipping");
                    report.failed.push(e);
                }
            }
        }

        info!(
            loaded = report.loaded.len(),
            failed = report.failed.len(),
            handlers = report.registered,
            "Command modules loaded"
        );
        report
    }
}

fn build_module(module: &ModuleDescriptor) -> Result<Vec<HandlerDescriptor>, ModuleError> {
    let built = catch_unwind(AssertUnwindSafe(module.build)).map_err(|payload| ModuleError::Panicked {
        module: module.name,
        reason: panic_message(payload.as_ref()),
    })?;
    let built = built.map_err(|e| ModuleError::Build {
        module: module.name,
        reason: e.to_string(),
    })?;
    built.into_descriptors()
}

/// Extracts the message of a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("commands", &self.len(InteractionKind::Command))
            .field("buttons", &self.len(InteractionKind::Button))
            .field("select_menus", &self.len(InteractionKind::SelectMenu))
            .field("autocompletes", &self.len(InteractionKind::Autocomplete))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tower::BoxError;

    use super::*;
    use crate::context::InteractionContext;
    use crate::module::CommandModule;

    async fn noop(_ctx: Arc<InteractionContext>) -> Result<(), BoxError> {
        Ok(())
    }

    fn good_module() -> Result<CommandModule, BoxError> {
        Ok(CommandModule::new()
            .command(HandlerDescriptor::command("good", noop))
            .button(HandlerDescriptor::button("goodbtn", noop)))
    }

    fn failing_module() -> Result<CommandModule, BoxError> {
        Err("missing data file".into())
    }

    fn panicking_module() -> Result<CommandModule, BoxError> {
        panic!("boom")
    }

    fn other_module() -> Result<CommandModule, BoxError> {
        Ok(CommandModule::new().command(HandlerDescriptor::command("other", noop)))
    }

    #[test]
    fn test_register_then_lookup() {
        let registry = Registry::new();
        registry.register(HandlerDescriptor::command("djs", noop));
        let found = registry.lookup(InteractionKind::Command, "djs").unwrap();
        assert_eq!(found.key(), "djs");
        assert!(registry.lookup(InteractionKind::Button, "djs").is_none());
        assert!(registry.lookup(InteractionKind::Command, "mdn").is_none());
    }

    #[test]
    fn test_last_registration_wins() {
        let registry = Registry::new();
        assert!(registry.register(HandlerDescriptor::command("djs", noop)).is_none());
        let displaced = registry.register(
            HandlerDescriptor::command("djs", noop).cooldown(Duration::from_secs(5)),
        );
        assert!(displaced.unwrap().cooldown_duration().is_none());
        let current = registry.lookup(InteractionKind::Command, "djs").unwrap();
        assert_eq!(current.cooldown_duration(), Some(Duration::from_secs(5)));
        assert_eq!(registry.len(InteractionKind::Command), 1);
    }

    #[test]
    fn test_namespaces_are_independent() {
        let registry = Registry::new();
        registry.register(HandlerDescriptor::command("same", noop));
        registry.register(HandlerDescriptor::button("same", noop));
        registry.register(HandlerDescriptor::select_menu("same", noop));
        assert_eq!(registry.len(InteractionKind::Command), 1);
        assert_eq!(registry.len(InteractionKind::Button), 1);
        assert_eq!(registry.len(InteractionKind::SelectMenu), 1);
        assert_eq!(registry.len(InteractionKind::Autocomplete), 0);
    }

    #[test]
    fn test_load_tolerates_bad_modules() {
        let registry = Registry::new();
        let modules = [
            ModuleDescriptor::new("good", good_module),
            ModuleDescriptor::new("failing", failing_module),
            ModuleDescriptor::new("panicking", panicking_module),
            ModuleDescriptor::new("other", other_module),
        ];
        let report = registry.load(&modules);

        assert_eq!(report.loaded, vec!["good", "other"]);
        assert_eq!(report.failed.len(), 2);
        assert!(matches!(report.failed[0], ModuleError::Build { module: "failing", .. }));
        assert!(matches!(report.failed[1], ModuleError::Panicked { module: "panicking", .. }));
        assert_eq!(report.registered, 3);
        assert_eq!(registry.keys(InteractionKind::Command), vec!["good", "other"]);
        assert!(registry.lookup(InteractionKind::Button, "goodbtn").is_some());
    }
}
