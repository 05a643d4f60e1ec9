//! Context runtime: assembles one context's message bus and tears it down.
//!
//! A [`ContextRuntime`] owns the started [`SplitProvider`] for one
//! execution context. It derives the context's identity (a well-known name
//! for the long-lived background context, a randomized per-instance id for
//! ephemeral contexts), wires the same-context and cross-context channels
//! around an injected transport handle source, and undoes all of it on
//! shutdown.

use std::sync::Arc;

use tracing::info;

use strait_core::{
    ContextId, ContextIdentity, CrossContextProvider, SameContextProvider, SplitProvider,
    TransportHandleSource,
};
use strait_transport::{HubHandleSource, InProcessHub};

use crate::config::ContextConfig;
use crate::error::RuntimeResult;

/// One context's running message bus.
pub struct ContextRuntime {
    context: ContextId,
    bus: Arc<SplitProvider>,
    hub: Option<Arc<InProcessHub>>,
}

impl ContextRuntime {
    /// Derives a context id from configuration: the well-known name when
    /// one is set, otherwise a fresh ephemeral id from the label.
    pub fn derive_context(config: &ContextConfig) -> ContextId {
        match &config.name {
            Some(name) => ContextId::named(name.clone()),
            None => ContextId::ephemeral(&config.label),
        }
    }

    /// Starts the bus for `context` over the given transport handle source.
    pub async fn start(
        context: ContextId,
        source: Arc<dyn TransportHandleSource>,
    ) -> RuntimeResult<Self> {
        let bus = Arc::new(SplitProvider::new(
            ContextIdentity::new(context.clone()),
            Arc::new(SameContextProvider::new()),
            Arc::new(CrossContextProvider::new(source)),
        ));
        bus.start().await?;
        info!(context = %context, "message bus started");

        Ok(Self {
            context,
            bus,
            hub: None,
        })
    }

    /// Starts the bus for `context` as a member of an in-process hub.
    ///
    /// Shutdown additionally removes the context from the hub, revoking its
    /// listeners for the remaining members.
    pub async fn join_hub(hub: &Arc<InProcessHub>, context: ContextId) -> RuntimeResult<Self> {
        let source = Arc::new(HubHandleSource::new(Arc::clone(hub), context.clone()));
        let mut runtime = Self::start(context, source).await?;
        runtime.hub = Some(Arc::clone(hub));
        Ok(runtime)
    }

    /// The id of the context this runtime serves.
    pub fn context(&self) -> &ContextId {
        &self.context
    }

    /// The context's bus.
    pub fn bus(&self) -> Arc<SplitProvider> {
        Arc::clone(&self.bus)
    }

    /// Stops the bus and, for hub members, leaves the hub.
    pub async fn shutdown(self) -> RuntimeResult<()> {
        self.bus.stop().await?;
        if let Some(hub) = &self.hub {
            hub.leave(&self.context);
        }
        info!(context = %self.context, "message bus stopped");
        Ok(())
    }
}

impl std::fmt::Debug for ContextRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextRuntime")
            .field("context", &self.context)
            .field("hub_member", &self.hub.is_some())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use strait_core::Provider;
    use strait_patterns::{Bullhorn, Requester, Responder};

    #[tokio::test]
    async fn test_contexts_exchange_requests_through_the_hub() {
        let hub = InProcessHub::new();
        let background =
            ContextRuntime::join_hub(&hub, ContextId::named("background")).await.unwrap();
        let popup = ContextRuntime::join_hub(&hub, ContextId::ephemeral("popup"))
            .await
            .unwrap();

        let responder = Responder::new(
            background.bus() as Arc<dyn Provider>,
            ["service:voices:getEffectiveRateForVoice"],
            |_action, _datum| async move { Ok(json!(1.25)) },
        );
        responder.register().await.unwrap();

        let requester = Requester::new(popup.bus());
        let value = requester
            .bespeak("service:voices:getEffectiveRateForVoice", None)
            .await
            .unwrap();
        assert_eq!(value, json!(1.25));

        popup.shutdown().await.unwrap();
        background.shutdown().await.unwrap();
        assert_eq!(hub.member_count(), 0);
    }

    #[tokio::test]
    async fn test_broadcasts_survive_a_departed_context() {
        let hub = InProcessHub::new();
        let background =
            ContextRuntime::join_hub(&hub, ContextId::named("background")).await.unwrap();
        let popup = ContextRuntime::join_hub(&hub, ContextId::ephemeral("popup"))
            .await
            .unwrap();

        popup.shutdown().await.unwrap();

        // The departed context's listeners are revoked; broadcasting into
        // the emptiness still resolves.
        let bullhorn = Bullhorn::new(background.bus());
        bullhorn
            .bullhorn("broadcaster:speaking:entire:after", None)
            .await
            .unwrap();

        background.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_derive_context_prefers_the_well_known_name() {
        let named = ContextRuntime::derive_context(&ContextConfig {
            name: Some("background".to_owned()),
            label: "page".to_owned(),
        });
        assert_eq!(named.as_str(), "background");

        let ephemeral = ContextRuntime::derive_context(&ContextConfig {
            name: None,
            label: "options".to_owned(),
        });
        assert!(ephemeral.as_str().starts_with("options-"));
    }

    #[tokio::test]
    async fn test_double_shutdown_is_impossible_by_construction() {
        // shutdown(self) consumes the runtime; stopping twice is rejected
        // by the split provider underneath.
        let hub = InProcessHub::new();
        let runtime = ContextRuntime::join_hub(&hub, ContextId::named("background"))
            .await
            .unwrap();
        let bus = runtime.bus();
        runtime.shutdown().await.unwrap();
        assert!(bus.stop().await.is_err());
    }
}
