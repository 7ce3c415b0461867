//! Interaction dispatcher.
//!
//! The [`Dispatcher`] routes each classified interaction to its handler:
//!
//! ```text
//! Command       defer(ephemeral) → lookup(name) → Gate → run
//!                                    └─ absent: "Command not found"
//! Button        lookup(custom id key) → run
//!                   └─ absent: "Unknown Button"
//! SelectMenu    defer(update) → lookup(custom id key) → run
//!                   └─ absent: "Unknown menu"
//! Autocomplete  lookup("<command>/<focused option>") → run
//!                   └─ absent: no response
//! ```
//!
//! Handler errors and panics never escape [`Dispatcher::dispatch`]. A failing
//! command answers "An error has occurred"; failing component and
//! autocomplete handlers are only logged. The internal error text is logged
//! and never shown to users.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tome_core::{BoxedResponder, Defer, Interaction, InteractionData, InteractionKind, Reply, handler_key};
use tower::ServiceExt;
use tracing::{Instrument, debug, error, info_span, warn};

use crate::context::InteractionContext;
use crate::descriptor::{HandlerDescriptor, autocomplete_key};
use crate::error::{DispatchError, DispatchResult};
use crate::gate::Gate;
use crate::registry::{Registry, panic_message};
use crate::services::ServiceMap;

const COMMAND_NOT_FOUND: &str = "Command not found";
const UNKNOWN_BUTTON: &str = "Unknown Button";
const UNKNOWN_MENU: &str = "Unknown menu";
const GENERIC_FAILURE: &str = "An error has occurred";

/// Routes interactions to registered handlers.
///
/// Cheap to clone; clones share the registry, gate and services.
#[derive(Clone, Debug)]
pub struct Dispatcher {
    registry: Arc<Registry>,
    gate: Arc<Gate>,
    services: Arc<ServiceMap>,
}

impl Dispatcher {
    /// Creates a dispatcher over `registry` with a fresh gate.
    pub fn new(registry: Arc<Registry>, services: ServiceMap) -> Self {
        Self {
            registry,
            gate: Arc::new(Gate::new()),
            services: Arc::new(services),
        }
    }

    /// Replaces the gate.
    pub fn with_gate(mut self, gate: Arc<Gate>) -> Self {
        self.gate = gate;
        self
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn gate(&self) -> &Arc<Gate> {
        &self.gate
    }

    pub fn services(&self) -> &Arc<ServiceMap> {
        &self.services
    }

    /// Handles one interaction to completion.
    ///
    /// The returned error, if any, has already been reported to the user
    /// where that applies.
    pub async fn dispatch(&self, interaction: Interaction, responder: BoxedResponder) -> DispatchResult<()> {
        let kind = interaction.kind();
        let key = routing_key(&interaction);
        let span = info_span!(
            "dispatch",
            kind = %kind,
            key = %key,
            user_id = %interaction.user.id,
            interaction_id = %interaction.id,
        );

        let ctx = Arc::new(InteractionContext::new(
            interaction,
            responder,
            Arc::clone(&self.services),
        ));

        async move {
            let result = match kind {
                InteractionKind::Command => self.dispatch_command(&ctx, &key).await,
                InteractionKind::Button => self.dispatch_component(&ctx, kind, &key, UNKNOWN_BUTTON).await,
                InteractionKind::SelectMenu => {
                    if let Err(e) = ctx.defer(Defer::Update).await {
                        warn!(error = %e, "Failed to acknowledge select menu");
                    }
                    self.dispatch_component(&ctx, kind, &key, UNKNOWN_MENU).await
                }
                InteractionKind::Autocomplete => self.dispatch_autocomplete(&ctx, &key).await,
            };
            if let Err(e) = &result {
                debug!(error = %e, "Interaction not completed");
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn dispatch_command(&self, ctx: &Arc<InteractionContext>, name: &str) -> DispatchResult<()> {
        if let Err(e) = ctx.defer(Defer::Ephemeral).await {
            warn!(error = %e, "Failed to defer command reply");
        }

        let Some(descriptor) = self.registry.lookup(InteractionKind::Command, name) else {
            send(ctx, Reply::text(COMMAND_NOT_FOUND).ephemeral()).await;
            return Err(DispatchError::not_found(InteractionKind::Command, name));
        };

        self.gate.permission_check(ctx, &descriptor).await?;
        self.gate.cooldown_check(ctx, &descriptor).await?;

        if let Err(e) = run(ctx, &descriptor).await {
            send(ctx, Reply::text(GENERIC_FAILURE).ephemeral()).await;
            return Err(e);
        }
        Ok(())
    }

    async fn dispatch_component(
        &self,
        ctx: &Arc<InteractionContext>,
        kind: InteractionKind,
        key: &str,
        unknown: &str,
    ) -> DispatchResult<()> {
        match self.registry.lookup(kind, key) {
            Some(descriptor) => run(ctx, &descriptor).await,
            None => {
                send(ctx, Reply::text(unknown).ephemeral()).await;
                Err(DispatchError::not_found(kind, key))
            }
        }
    }

    async fn dispatch_autocomplete(&self, ctx: &Arc<InteractionContext>, key: &str) -> DispatchResult<()> {
        match self.registry.lookup(InteractionKind::Autocomplete, key) {
            Some(descriptor) => run(ctx, &descriptor).await,
            // The platform shows no suggestions when nothing answers.
            None => Err(DispatchError::not_found(InteractionKind::Autocomplete, key)),
        }
    }
}

/// Computes the registry key an interaction is routed by.
pub fn routing_key(interaction: &Interaction) -> String {
    match &interaction.data {
        InteractionData::Command(command) => command.name.clone(),
        InteractionData::Button(component) | InteractionData::SelectMenu(component) => {
            handler_key(&component.custom_id).to_string()
        }
        InteractionData::Autocomplete(autocomplete) => {
            autocomplete_key(&autocomplete.command_name, &autocomplete.focused.name)
        }
    }
}

/// Runs a handler, converting errors and panics into `HandlerExecution`.
async fn run(ctx: &Arc<InteractionContext>, descriptor: &HandlerDescriptor) -> DispatchResult<()> {
    let call = descriptor.executor().oneshot(Arc::clone(ctx));
    let reason = match AssertUnwindSafe(call).catch_unwind().await {
        Ok(Ok(())) => return Ok(()),
        Ok(Err(e)) => e.to_string(),
        Err(payload) => format!("panicked: {}", panic_message(payload.as_ref())),
    };

    error!(kind = %descriptor.kind(), key = descriptor.key(), error = %reason, "Handler failed");
    Err(DispatchError::HandlerExecution {
        kind: descriptor.kind(),
        key: descriptor.key().to_string(),
        reason,
    })
}

async fn send(ctx: &InteractionContext, reply: Reply) {
    if let Err(e) = ctx.respond(reply).await {
        warn!(error = %e, "Failed to send reply");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use tome_core::{
        AutocompleteData, ChannelId, CommandData, ComponentData, FocusedOption, InteractionId,
        Recorded, RecordingResponder, User,
    };
    use tower::BoxError;

    use super::*;
    use crate::module::{CommandModule, ModuleDescriptor};

    fn interaction(data: InteractionData) -> Interaction {
        Interaction {
            id: InteractionId(1),
            token: "tok".into(),
            user: User::new(7, "alice"),
            channel_id: Some(ChannelId(20)),
            guild: None,
            data,
        }
    }

    fn command(name: &str) -> Interaction {
        interaction(InteractionData::Command(CommandData {
            name: name.into(),
            options: vec![],
        }))
    }

    fn button(custom_id: &str) -> Interaction {
        interaction(InteractionData::Button(ComponentData {
            custom_id: custom_id.into(),
            ..Default::default()
        }))
    }

    fn select(custom_id: &str) -> Interaction {
        interaction(InteractionData::SelectMenu(ComponentData {
            custom_id: custom_id.into(),
            values: vec!["Client".into()],
            message_id: None,
        }))
    }

    fn autocomplete(command: &str, option: &str) -> Interaction {
        interaction(InteractionData::Autocomplete(AutocompleteData {
            command_name: command.into(),
            focused: FocusedOption {
                name: option.into(),
                value: "Cli".into(),
            },
            options: vec![],
        }))
    }

    async fn ok_reply(ctx: Arc<InteractionContext>) -> Result<(), BoxError> {
        ctx.respond(Reply::text("done")).await?;
        Ok(())
    }

    async fn fails(_ctx: Arc<InteractionContext>) -> Result<(), BoxError> {
        Err("database password is hunter2".into())
    }

    async fn panics(_ctx: Arc<InteractionContext>) -> Result<(), BoxError> {
        panic!("handler exploded")
    }

    fn dispatcher(descriptors: Vec<HandlerDescriptor>) -> Dispatcher {
        let registry = Arc::new(Registry::new());
        for descriptor in descriptors {
            registry.register(descriptor);
        }
        Dispatcher::new(registry, ServiceMap::new())
    }

    #[tokio::test]
    async fn test_command_defers_then_runs() {
        let dispatcher = dispatcher(vec![HandlerDescriptor::command("djs", ok_reply)]);
        let responder = Arc::new(RecordingResponder::new());

        dispatcher.dispatch(command("djs"), responder.clone()).await.unwrap();

        assert_eq!(
            responder.calls(),
            vec![
                Recorded::Defer(Defer::Ephemeral),
                Recorded::EditReply(Reply::text("done")),
            ]
        );
    }

    #[tokio::test]
    async fn test_unknown_command() {
        let dispatcher = dispatcher(vec![]);
        let responder = Arc::new(RecordingResponder::new());

        let err = dispatcher.dispatch(command("nope"), responder.clone()).await.unwrap_err();

        assert!(matches!(err, DispatchError::NotFound { kind: InteractionKind::Command, .. }));
        assert_eq!(responder.last_text().as_deref(), Some(COMMAND_NOT_FOUND));
    }

    #[tokio::test]
    async fn test_command_error_is_not_leaked() {
        let dispatcher = dispatcher(vec![HandlerDescriptor::command("djs", fails)]);
        let responder = Arc::new(RecordingResponder::new());

        let err = dispatcher.dispatch(command("djs"), responder.clone()).await.unwrap_err();

        match err {
            DispatchError::HandlerExecution { reason, .. } => assert!(reason.contains("hunter2")),
            other => panic!("unexpected {other:?}"),
        }
        let text = responder.last_text().unwrap();
        assert_eq!(text, GENERIC_FAILURE);
        assert!(!text.contains("hunter2"));
    }

    #[tokio::test]
    async fn test_command_panic_is_contained() {
        let dispatcher = dispatcher(vec![
            HandlerDescriptor::command("djs", panics),
            HandlerDescriptor::command("ok", ok_reply),
        ]);
        let responder = Arc::new(RecordingResponder::new());

        let err = dispatcher.dispatch(command("djs"), responder.clone()).await.unwrap_err();

        assert!(matches!(err, DispatchError::HandlerExecution { .. }));
        assert_eq!(responder.last_text().as_deref(), Some(GENERIC_FAILURE));

        // The dispatcher keeps working afterwards.
        assert!(dispatcher.dispatch(command("ok"), responder).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cooldown_gates_command() {
        let counter = Arc::new(AtomicUsize::new(0));
        let count = Arc::clone(&counter);
        let descriptor = HandlerDescriptor::command("djs", move |_ctx| {
            let count = Arc::clone(&count);
            async move {
                count.fetch_add(1, Ordering::SeqCst);
                Ok::<_, BoxError>(())
            }
        })
        .cooldown(Duration::from_millis(5000));
        let dispatcher = dispatcher(vec![descriptor]);
        let responder = Arc::new(RecordingResponder::new());

        assert!(dispatcher.dispatch(command("djs"), responder.clone()).await.is_ok());

        tokio::time::advance(Duration::from_millis(2000)).await;
        let err = dispatcher.dispatch(command("djs"), responder.clone()).await.unwrap_err();
        assert_eq!(
            err,
            DispatchError::CooldownActive {
                remaining: Duration::from_millis(3000)
            }
        );

        tokio::time::advance(Duration::from_millis(4000)).await;
        assert!(dispatcher.dispatch(command("djs"), responder.clone()).await.is_ok());
        assert!(dispatcher.gate().cooldowns().is_empty());
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_button_routed_by_first_segment() {
        let dispatcher = dispatcher(vec![HandlerDescriptor::button("deletebtn", ok_reply)]);
        let responder = Arc::new(RecordingResponder::new());

        dispatcher
            .dispatch(button("deletebtn/v1/7/55"), responder.clone())
            .await
            .unwrap();

        assert_eq!(responder.calls(), vec![Recorded::Reply(Reply::text("done"))]);
    }

    #[tokio::test]
    async fn test_unknown_button_and_menu() {
        let dispatcher = dispatcher(vec![]);

        let responder = Arc::new(RecordingResponder::new());
        dispatcher.dispatch(button("ghost/v1"), responder.clone()).await.unwrap_err();
        assert_eq!(
            responder.calls(),
            vec![Recorded::Reply(Reply::text(UNKNOWN_BUTTON).ephemeral())]
        );

        let responder = Arc::new(RecordingResponder::new());
        dispatcher.dispatch(select("ghost/v1"), responder.clone()).await.unwrap_err();
        assert_eq!(
            responder.calls(),
            vec![
                Recorded::Defer(Defer::Update),
                Recorded::EditReply(Reply::text(UNKNOWN_MENU).ephemeral()),
            ]
        );
    }

    #[tokio::test]
    async fn test_component_error_only_logged() {
        let dispatcher = dispatcher(vec![HandlerDescriptor::select_menu("djsselect", fails)]);
        let responder = Arc::new(RecordingResponder::new());

        let err = dispatcher
            .dispatch(select("djsselect/v1/stable"), responder.clone())
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::HandlerExecution { .. }));
        assert_eq!(responder.calls(), vec![Recorded::Defer(Defer::Update)]);
    }

    #[tokio::test]
    async fn test_autocomplete_key_and_silent_miss() {
        let dispatcher = dispatcher(vec![HandlerDescriptor::autocomplete("djs", "query", ok_reply)]);

        let responder = Arc::new(RecordingResponder::new());
        dispatcher
            .dispatch(autocomplete("djs", "query"), responder.clone())
            .await
            .unwrap();
        assert_eq!(responder.calls().len(), 1);

        let responder = Arc::new(RecordingResponder::new());
        let err = dispatcher
            .dispatch(autocomplete("djs", "source"), responder.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::NotFound { kind: InteractionKind::Autocomplete, .. }));
        assert!(responder.calls().is_empty());
    }

    fn broken() -> Result<CommandModule, BoxError> {
        Err("cannot build".into())
    }

    fn working() -> Result<CommandModule, BoxError> {
        Ok(CommandModule::new().command(HandlerDescriptor::command("ok", ok_reply)))
    }

    #[tokio::test]
    async fn test_loaded_modules_dispatch_despite_broken_sibling() {
        let registry = Arc::new(Registry::new());
        registry.load(&[
            ModuleDescriptor::new("broken", broken),
            ModuleDescriptor::new("working", working),
        ]);
        let dispatcher = Dispatcher::new(registry, ServiceMap::new());
        let responder = Arc::new(RecordingResponder::new());

        assert!(dispatcher.dispatch(command("ok"), responder).await.is_ok());
    }
}
