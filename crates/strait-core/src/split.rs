//! The split provider: one logical bus over two channels.
//!
//! A context talks on two independent channels — its own registry (the
//! same-context channel) and the transport spanning all other contexts.
//! [`SplitProvider`] merges them behind the one [`Provider`] surface:
//!
//! - outbound payloads are tagged with the local context id and sent on
//!   **both** channels concurrently, and the pair of responses is reduced
//!   to the single response the caller expects;
//! - inbound cross-context traffic is re-published into the local registry
//!   by a forwarding listener, so local subscribers only ever listen in
//!   one place.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, trace};

use crate::context::{self, ContextIdentity};
use crate::error::{BusError, BusResult, TransportError};
use crate::listener::{Listener, ListenerError};
use crate::provider::{CrossContextProvider, Provider, SameContextProvider};
use crate::reduce;

/// Merges the same-context and cross-context channels into one logical bus
/// for a single execution context.
pub struct SplitProvider {
    identity: ContextIdentity,
    local: Arc<SameContextProvider>,
    remote: Arc<CrossContextProvider>,
    forwarder: Mutex<Option<Listener>>,
}

impl SplitProvider {
    /// Creates a provider acting under `identity`.
    pub fn new(
        identity: ContextIdentity,
        local: Arc<SameContextProvider>,
        remote: Arc<CrossContextProvider>,
    ) -> Self {
        Self {
            identity,
            local,
            remote,
            forwarder: Mutex::new(None),
        }
    }

    /// The identity this provider acts under.
    pub fn identity(&self) -> &ContextIdentity {
        &self.identity
    }

    /// Registers the forwarding listener on the cross-context channel.
    ///
    /// Starting an already-started provider is a programmer error.
    pub async fn start(&self) -> BusResult<()> {
        if self.forwarder.lock().is_some() {
            return Err(BusError::AlreadyStarted);
        }
        let forwarder = self.make_forwarder()?;
        self.remote.subscribe(forwarder.clone()).await?;
        *self.forwarder.lock() = Some(forwarder);
        debug!(context = %self.identity.id(), "split provider started");
        Ok(())
    }

    /// Unregisters the forwarding listener.
    ///
    /// Stopping a provider that is not started is a programmer error.
    pub async fn stop(&self) -> BusResult<()> {
        let forwarder = self.forwarder.lock().take().ok_or(BusError::NotStarted)?;
        self.remote.unsubscribe(&forwarder).await?;
        debug!(context = %self.identity.id(), "split provider stopped");
        Ok(())
    }

    /// Builds the listener that re-publishes inbound cross-context traffic
    /// into the local registry, tagged with the local context id so the
    /// cross-context registry can suppress this context's own echo.
    fn make_forwarder(&self) -> BusResult<Listener> {
        let local = Arc::clone(&self.local);
        let listener = Listener::new(move |payload: Value| {
            let local = Arc::clone(&local);
            async move {
                local
                    .send(payload)
                    .await
                    .map_err(|error| ListenerError::Failed(error.to_string()))
            }
        });
        Ok(listener.tagged(self.identity.id().clone())?)
    }

    /// Re-registers the forwarding listener if the cross-context channel's
    /// pruning has dropped it.
    ///
    /// This is how the bus recovers after the context that was the sole
    /// "other" participant disappears and a new one appears.
    async fn ensure_forwarder(&self) -> BusResult<()> {
        let forwarder = self.forwarder.lock().clone();
        let Some(forwarder) = forwarder else {
            return Ok(());
        };
        if !self.remote.is_subscribed(&forwarder).await {
            debug!(
                context = %self.identity.id(),
                "re-registering the forwarding listener on the cross-context channel"
            );
            self.remote.subscribe(forwarder).await?;
        }
        Ok(())
    }

    /// Sends on the cross-context channel, treating its "no listeners"
    /// condition as a legal no-answer.
    async fn send_remote(&self, payload: Value) -> BusResult<Option<Value>> {
        match self.remote.send(payload).await {
            Ok(response) => Ok(response),
            Err(BusError::Transport(TransportError::NoListeners)) => {
                trace!(
                    context = %self.identity.id(),
                    "no cross-context listeners, treating as no answer"
                );
                Ok(None)
            }
            Err(error) => Err(error),
        }
    }
}

#[async_trait]
impl Provider for SplitProvider {
    /// Tags the payload with the local context id and sends it on both
    /// channels concurrently, reducing the pair of responses to one.
    ///
    /// A payload that already carries a context tag is a protocol error.
    async fn send(&self, payload: Value) -> BusResult<Option<Value>> {
        let mut payload = payload;
        context::tag_payload(&mut payload, self.identity.id())?;
        self.ensure_forwarder().await?;

        let (local, remote) = tokio::join!(
            self.local.send(payload.clone()),
            self.send_remote(payload),
        );
        Ok(reduce::pick_defined(&[local?, remote?]))
    }

    async fn subscribe(&self, listener: Listener) -> BusResult<()> {
        self.local.subscribe(listener).await
    }

    async fn unsubscribe(&self, listener: &Listener) -> BusResult<()> {
        self.local.unsubscribe(listener).await
    }

    async fn is_subscribed(&self, listener: &Listener) -> bool {
        self.local.is_subscribed(listener).await
    }
}

impl std::fmt::Debug for SplitProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SplitProvider")
            .field("context", self.identity.id())
            .field("started", &self.forwarder.lock().is_some())
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

    use crate::context::ContextId;
    use crate::error::{RegistryError, TransportResult};
    use crate::registry::{AlwaysAlive, CrossContextRegistry};
    use crate::transport::{Transport, TransportHandleSource};

    /// Minimal in-memory stand-in for a host transport: one shared fan-out
    /// table with echo suppression, merged with the relevant-response policy.
    struct TestTransport {
        registry: CrossContextRegistry,
    }

    impl TestTransport {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                registry: CrossContextRegistry::new(Arc::new(AlwaysAlive)),
            })
        }
    }

    #[async_trait]
    impl Transport for TestTransport {
        async fn publish(&self, payload: Value) -> TransportResult<Option<Value>> {
            match self.registry.dispatch(&payload).await {
                Ok(responses) => Ok(reduce::pick_relevant(&responses)),
                Err(RegistryError::NoListeners) => Err(TransportError::NoListeners),
                Err(error) => Err(error.into()),
            }
        }

        async fn attach(&self, listener: Listener) -> TransportResult<()> {
            Ok(self.registry.add(listener)?)
        }

        async fn detach(&self, listener: &Listener) -> TransportResult<()> {
            Ok(self.registry.remove(listener)?)
        }

        async fn is_attached(&self, listener: &Listener) -> bool {
            self.registry.has(listener)
        }
    }

    struct TestSource {
        transport: Arc<TestTransport>,
    }

    #[async_trait]
    impl TransportHandleSource for TestSource {
        async fn acquire(&self) -> TransportResult<Arc<dyn Transport>> {
            Ok(Arc::clone(&self.transport) as Arc<dyn Transport>)
        }
    }

    fn provider(name: &str, transport: &Arc<TestTransport>) -> SplitProvider {
        SplitProvider::new(
            ContextIdentity::new(ContextId::named(name)),
            Arc::new(SameContextProvider::new()),
            Arc::new(CrossContextProvider::new(Arc::new(TestSource {
                transport: Arc::clone(transport),
            }))),
        )
    }

    #[tokio::test]
    async fn test_pre_tagged_payload_is_rejected() {
        let transport = TestTransport::new();
        let bus = provider("ctx-a", &transport);

        let mut payload = json!({ "action": "x" });
        context::tag_payload(&mut payload, &ContextId::named("ctx-a")).unwrap();

        let err = bus.send(payload).await.unwrap_err();
        assert!(matches!(err, BusError::Context(_)));
    }

    #[tokio::test]
    async fn test_double_start_and_double_stop_are_rejected() {
        let transport = TestTransport::new();
        let bus = provider("ctx-a", &transport);

        bus.start().await.unwrap();
        assert!(matches!(bus.start().await.unwrap_err(), BusError::AlreadyStarted));

        bus.stop().await.unwrap();
        assert!(matches!(bus.stop().await.unwrap_err(), BusError::NotStarted));
    }

    #[tokio::test]
    async fn test_send_with_no_other_contexts_resolves_to_local_answer() {
        let transport = TestTransport::new();
        let bus = provider("ctx-a", &transport);
        bus.start().await.unwrap();

        // Own forwarder is the only cross-context listener; echo suppression
        // leaves no eligible recipient and the condition is swallowed.
        assert_eq!(bus.send(json!({ "action": "x" })).await.unwrap(), None);

        bus.subscribe(Listener::new(|_| async { Ok(Some(json!("local"))) }))
            .await
            .unwrap();
        assert_eq!(
            bus.send(json!({ "action": "x" })).await.unwrap(),
            Some(json!("local"))
        );
    }

    #[tokio::test]
    async fn test_cross_context_traffic_is_forwarded_into_the_local_registry() {
        let transport = TestTransport::new();
        let sender = provider("ctx-a", &transport);
        let receiver = provider("ctx-b", &transport);
        sender.start().await.unwrap();
        receiver.start().await.unwrap();

        receiver
            .subscribe(Listener::new(|payload: Value| async move {
                assert_eq!(payload["context"], json!("ctx-a"));
                Ok(Some(json!("from ctx-b")))
            }))
            .await
            .unwrap();

        let response = sender.send(json!({ "action": "x" })).await.unwrap();
        assert_eq!(response, Some(json!("from ctx-b")));
    }

    #[tokio::test]
    async fn test_forwarder_is_reregistered_after_being_dropped() {
        let transport = TestTransport::new();
        let sender = provider("ctx-a", &transport);
        let receiver = provider("ctx-b", &transport);
        sender.start().await.unwrap();
        receiver.start().await.unwrap();

        receiver
            .subscribe(Listener::new(|_| async { Ok(Some(json!("pong"))) }))
            .await
            .unwrap();

        // Simulate the cross-context channel's pruning dropping ctx-b's
        // forwarder; ctx-b's next send silently re-registers it.
        let forwarder = receiver.forwarder.lock().clone().unwrap();
        transport.detach(&forwarder).await.unwrap();
        assert!(!transport.is_attached(&forwarder).await);

        receiver.send(json!({ "action": "noop" })).await.unwrap();
        assert!(transport.is_attached(&forwarder).await);

        // And traffic flows again.
        let response = sender.send(json!({ "action": "x" })).await.unwrap();
        assert_eq!(response, Some(json!("pong")));
    }
}
