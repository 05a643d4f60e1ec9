//! The in-process hub: a reference cross-context transport.
//!
//! Contexts living in one process join the hub and get back a
//! [`HubTransport`] — their handle onto the shared fan-out table. A
//! published payload reaches every other member's attached listeners;
//! their responses are merged with the relevant-response policy so one
//! context's acknowledgment never masks another's real answer.
//!
//! There is no destruction notification for a context, so liveness is a
//! token: joining mints a [`CancellationToken`], leaving cancels it, and
//! the hub's registry prunes listeners bound to cancelled tokens on every
//! operation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use strait_core::{
    ContextId, CrossContextRegistry, Listener, LivenessProbe, RegistryError, Transport,
    TransportError, TransportHandleSource, TransportResult, reduce,
};

/// Probe reading the cancellation token each hub listener is bound to.
#[derive(Debug, Default, Clone, Copy)]
struct TokenLiveness;

impl LivenessProbe for TokenLiveness {
    fn is_alive(&self, listener: &Listener) -> bool {
        listener.liveness().is_none_or(|token| !token.is_cancelled())
    }
}

// =============================================================================
// Hub
// =============================================================================

/// Shared fan-out table connecting every context in one process.
pub struct InProcessHub {
    registry: CrossContextRegistry,
    members: Mutex<HashMap<ContextId, CancellationToken>>,
}

impl InProcessHub {
    /// Creates an empty hub.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            registry: CrossContextRegistry::new(Arc::new(TokenLiveness)),
            members: Mutex::new(HashMap::new()),
        })
    }

    /// Returns `context`'s transport handle, adding it as a member first if
    /// it is not one yet.
    pub fn transport(self: &Arc<Self>, context: &ContextId) -> Arc<HubTransport> {
        let token = {
            let mut members = self.members.lock();
            members
                .entry(context.clone())
                .or_insert_with(|| {
                    debug!(context = %context, "context joined the hub");
                    CancellationToken::new()
                })
                .clone()
        };
        Arc::new(HubTransport {
            hub: Arc::clone(self),
            context: context.clone(),
            token,
        })
    }

    /// Removes `context` from the hub, revoking its listeners.
    ///
    /// The listeners themselves are swept out of the fan-out table lazily,
    /// by the registry's pruning on subsequent operations.
    pub fn leave(&self, context: &ContextId) {
        if let Some(token) = self.members.lock().remove(context) {
            token.cancel();
            info!(context = %context, "context left the hub");
        }
    }

    /// The number of member contexts.
    pub fn member_count(&self) -> usize {
        self.members.lock().len()
    }
}

impl std::fmt::Debug for InProcessHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InProcessHub")
            .field("members", &self.member_count())
            .finish()
    }
}

// =============================================================================
// Per-Context Transport Handle
// =============================================================================

/// One member context's handle onto the hub.
pub struct HubTransport {
    hub: Arc<InProcessHub>,
    context: ContextId,
    token: CancellationToken,
}

#[async_trait]
impl Transport for HubTransport {
    async fn publish(&self, payload: Value) -> TransportResult<Option<Value>> {
        match self.hub.registry.dispatch(&payload).await {
            Ok(responses) => Ok(reduce::pick_relevant(&responses)),
            Err(RegistryError::NoListeners) => Err(TransportError::NoListeners),
            Err(error) => Err(error.into()),
        }
    }

    async fn attach(&self, listener: Listener) -> TransportResult<()> {
        let listener = listener.with_liveness(self.token.clone());
        self.hub.registry.add(listener)?;
        Ok(())
    }

    async fn detach(&self, listener: &Listener) -> TransportResult<()> {
        self.hub.registry.remove(listener)?;
        Ok(())
    }

    async fn is_attached(&self, listener: &Listener) -> bool {
        self.hub.registry.has(listener)
    }
}

impl std::fmt::Debug for HubTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HubTransport")
            .field("context", &self.context)
            .field("live", &!self.token.is_cancelled())
            .finish()
    }
}

// =============================================================================
// Handle Source
// =============================================================================

/// [`TransportHandleSource`] resolving to one context's current hub handle.
///
/// Acquisition goes through the hub on every call, so a context that left
/// and rejoined gets a fresh liveness token transparently.
pub struct HubHandleSource {
    hub: Arc<InProcessHub>,
    context: ContextId,
}

impl HubHandleSource {
    /// Creates a source for `context` on `hub`.
    pub fn new(hub: Arc<InProcessHub>, context: ContextId) -> Self {
        Self { hub, context }
    }
}

#[async_trait]
impl TransportHandleSource for HubHandleSource {
    async fn acquire(&self) -> TransportResult<Arc<dyn Transport>> {
        Ok(self.hub.transport(&self.context) as Arc<dyn Transport>)
    }
}

impl std::fmt::Debug for HubHandleSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HubHandleSource")
            .field("context", &self.context)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
