//! Handler executors.
//!
//! Every handler is stored as a type-erased tower service taking the shared
//! [`InteractionContext`]. Plain async functions are lifted with
//! [`executor`]:
//!
//! ```rust,ignore
//! async fn ping(ctx: Arc<InteractionContext>) -> Result<(), BoxError> {
//!     ctx.respond(Reply::text("pong")).await?;
//!     Ok(())
//! }
//!
//! let svc = executor(ping);
//! ```

use std::future::Future;
use std::sync::Arc;

use tower::util::BoxCloneSyncService;
use tower::{BoxError, service_fn};

use crate::context::InteractionContext;

/// A type-erased, `Clone + Send + Sync` service that runs one handler.
pub type BoxedExecutor = BoxCloneSyncService<Arc<InteractionContext>, (), BoxError>;

/// Lifts an async function into a [`BoxedExecutor`].
pub fn executor<F, Fut>(f: F) -> BoxedExecutor
where
    F: Fn(Arc<InteractionContext>) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    BoxCloneSyncService::new(service_fn(f))
}

#[cfg(test)]
mod tests {
    use tome_core::{
        ChannelId, CommandData, Interaction, InteractionData, InteractionId, RecordingResponder,
        Reply, User,
    };
    use tower::ServiceExt;

    use super::*;
    use crate::services::ServiceMap;

    async fn echo(ctx: Arc<InteractionContext>) -> Result<(), BoxError> {
        let name = ctx.command().map(|c| c.name.clone()).unwrap_or_default();
        ctx.respond(Reply::text(name)).await?;
        Ok(())
    }

    fn context(responder: Arc<RecordingResponder>) -> Arc<InteractionContext> {
        let interaction = Interaction {
            id: InteractionId(1),
            token: "tok".into(),
            user: User::new(7, "alice"),
            channel_id: Some(ChannelId(20)),
            guild: None,
            data: InteractionData::Command(CommandData {
                name: "djs".into(),
                options: vec![],
            }),
        };
        Arc::new(InteractionContext::new(interaction, responder, Arc::new(ServiceMap::new())))
    }

    #[test]
    fn test_executor_runs_function() {
        let responder = Arc::new(RecordingResponder::new());
        let svc = executor(echo);
        tokio_test::block_on(svc.oneshot(context(responder.clone()))).unwrap();
        assert_eq!(responder.last_text().as_deref(), Some("djs"));
    }

    #[test]
    fn test_executor_clones_share_function() {
        let responder = Arc::new(RecordingResponder::new());
        let svc = executor(echo);
        let copy = svc.clone();
        tokio_test::block_on(async {
            svc.oneshot(context(responder.clone())).await.unwrap();
            copy.oneshot(context(responder.clone())).await.unwrap();
        });
        assert_eq!(responder.calls().len(), 2);
    }
}
