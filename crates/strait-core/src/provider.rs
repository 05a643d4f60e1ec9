//! Message bus providers.
//!
//! A [`Provider`] is one channel's send/subscribe surface. Two concrete
//! channels exist — the local context's registry and the cross-context
//! transport — and the split provider (see [`crate::split`]) merges them
//! behind the same trait.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::trace;

use crate::error::BusResult;
use crate::listener::Listener;
use crate::reduce;
use crate::registry::SameContextRegistry;
use crate::transport::TransportHandleSource;

/// One channel of the message bus.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Sends a raw payload on this channel and resolves to the merged
    /// response, if any.
    async fn send(&self, payload: Value) -> BusResult<Option<Value>>;

    /// Subscribes a listener to this channel's inbound traffic.
    async fn subscribe(&self, listener: Listener) -> BusResult<()>;

    /// Unsubscribes a previously subscribed listener.
    async fn unsubscribe(&self, listener: &Listener) -> BusResult<()>;

    /// Returns true if the listener is currently subscribed.
    async fn is_subscribed(&self, listener: &Listener) -> bool;
}

// =============================================================================
// Same-Context Provider
// =============================================================================

/// The channel scoped to the local execution context.
#[derive(Debug, Default)]
pub struct SameContextProvider {
    registry: SameContextRegistry,
}

impl SameContextProvider {
    /// Creates a provider over an empty local registry.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Provider for SameContextProvider {
    async fn send(&self, payload: Value) -> BusResult<Option<Value>> {
        let responses = self.registry.dispatch(&payload).await?;
        Ok(reduce::pick_relevant(&responses))
    }

    async fn subscribe(&self, listener: Listener) -> BusResult<()> {
        self.registry.add(listener)?;
        Ok(())
    }

    async fn unsubscribe(&self, listener: &Listener) -> BusResult<()> {
        self.registry.remove(listener)?;
        Ok(())
    }

    async fn is_subscribed(&self, listener: &Listener) -> bool {
        self.registry.has(listener)
    }
}

// =============================================================================
// Cross-Context Provider
// =============================================================================

/// The channel spanning all other execution contexts.
///
/// Holds a [`TransportHandleSource`] rather than a transport: the handle is
/// acquired on every operation, so a replaced transport (a departed and
/// re-created context) is picked up transparently.
pub struct CrossContextProvider {
    source: Arc<dyn TransportHandleSource>,
}

impl CrossContextProvider {
    /// Creates a provider acquiring its transport from `source`.
    pub fn new(source: Arc<dyn TransportHandleSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Provider for CrossContextProvider {
    async fn send(&self, payload: Value) -> BusResult<Option<Value>> {
        let transport = self.source.acquire().await?;
        trace!("publishing on the cross-context channel");
        Ok(transport.publish(payload).await?)
    }

    async fn subscribe(&self, listener: Listener) -> BusResult<()> {
        let transport = self.source.acquire().await?;
        Ok(transport.attach(listener).await?)
    }

    async fn unsubscribe(&self, listener: &Listener) -> BusResult<()> {
        let transport = self.source.acquire().await?;
        Ok(transport.detach(listener).await?)
    }

    async fn is_subscribed(&self, listener: &Listener) -> bool {
        match self.source.acquire().await {
            Ok(transport) => transport.is_attached(listener).await,
            Err(_) => false,
        }
    }
}

impl std::fmt::Debug for CrossContextProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrossContextProvider").finish_non_exhaustive()
    }
}
