//! Command modules.
//!
//! A command module groups zero or one command with the buttons, select
//! menus and autocomplete handlers that belong to it. Modules are listed
//! statically as [`ModuleDescriptor`]s and built when the registry loads:
//!
//! ```rust,ignore
//! pub static PING: ModuleDescriptor = ModuleDescriptor::new("ping", build);
//!
//! fn build() -> Result<CommandModule, BoxError> {
//!     Ok(CommandModule::new().command(HandlerDescriptor::command("ping", ping)))
//! }
//! ```

use tome_core::InteractionKind;
use tower::BoxError;

use crate::descriptor::HandlerDescriptor;
use crate::error::ModuleError;

/// A static, `Copy` handle that builds a [`CommandModule`].
#[derive(Debug, Clone, Copy)]
pub struct ModuleDescriptor {
    /// Module name, used in logs.
    pub name: &'static str,
    /// Builds the module's descriptors.
    pub build: fn() -> Result<CommandModule, BoxError>,
}

impl ModuleDescriptor {
    pub const fn new(name: &'static str, build: fn() -> Result<CommandModule, BoxError>) -> Self {
        Self { name, build }
    }
}

/// The descriptors contributed by one module.
#[derive(Debug, Default, Clone)]
pub struct CommandModule {
    command: Option<HandlerDescriptor>,
    buttons: Vec<HandlerDescriptor>,
    select_menus: Vec<HandlerDescriptor>,
    autocompletes: Vec<HandlerDescriptor>,
}

impl CommandModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the module's command.
    pub fn command(mut self, descriptor: HandlerDescriptor) -> Self {
        self.command = Some(descriptor);
        self
    }

    pub fn button(mut self, descriptor: HandlerDescriptor) -> Self {
        self.buttons.push(descriptor);
        self
    }

    pub fn select_menu(mut self, descriptor: HandlerDescriptor) -> Self {
        self.select_menus.push(descriptor);
        self
    }

    pub fn autocomplete(mut self, descriptor: HandlerDescriptor) -> Self {
        self.autocompletes.push(descriptor);
        self
    }

    /// Validates the module and flattens it into descriptors.
    ///
    /// Every descriptor must sit in the slot of its own kind, and autocomplete
    /// keys must start with the module's command name when there is one.
    pub fn into_descriptors(self) -> Result<Vec<HandlerDescriptor>, ModuleError> {
        let command_name = self.command.as_ref().map(|c| c.key().to_string());

        let slots = self
            .command
            .into_iter()
            .map(|d| (InteractionKind::Command, d))
            .chain(self.buttons.into_iter().map(|d| (InteractionKind::Button, d)))
            .chain(
                self.select_menus
                    .into_iter()
                    .map(|d| (InteractionKind::SelectMenu, d)),
            )
            .chain(
                self.autocompletes
                    .into_iter()
                    .map(|d| (InteractionKind::Autocomplete, d)),
            );

        let mut out = Vec::new();
        for (expected, descriptor) in slots {
            if descriptor.kind() != expected {
                return Err(ModuleError::KindMismatch {
                    key: descriptor.key().to_string(),
                    expected,
                    found: descriptor.kind(),
                });
            }
            if expected == InteractionKind::Autocomplete {
                if let Some(command) = &command_name {
                    let owned = descriptor
                        .key()
                        .split_once('/')
                        .is_some_and(|(cmd, _)| cmd == command);
                    if !owned {
                        return Err(ModuleError::ForeignAutocomplete {
                            key: descriptor.key().to_string(),
                            command: command.clone(),
                        });
                    }
                }
            }
            out.push(descriptor);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::context::InteractionContext;

    async fn noop(_ctx: Arc<InteractionContext>) -> Result<(), BoxError> {
        Ok(())
    }

    #[test]
    fn test_flatten_module() {
        let descriptors = CommandModule::new()
            .command(HandlerDescriptor::command("djs", noop))
            .select_menu(HandlerDescriptor::select_menu("djsselect", noop))
            .autocomplete(HandlerDescriptor::autocomplete("djs", "query", noop))
            .into_descriptors()
            .unwrap();
        let keys: Vec<_> = descriptors.iter().map(|d| d.key()).collect();
        assert_eq!(keys, vec!["djs", "djsselect", "djs/query"]);
    }

    #[test]
    fn test_kind_mismatch_rejected() {
        let err = CommandModule::new()
            .button(HandlerDescriptor::select_menu("oops", noop))
            .into_descriptors()
            .unwrap_err();
        assert!(matches!(err, ModuleError::KindMismatch { .. }));
    }

    #[test]
    fn test_foreign_autocomplete_rejected() {
        let err = CommandModule::new()
            .command(HandlerDescriptor::command("mdn", noop))
            .autocomplete(HandlerDescriptor::autocomplete("djs", "query", noop))
            .into_descriptors()
            .unwrap_err();
        assert!(matches!(err, ModuleError::ForeignAutocomplete { .. }));
    }
}
