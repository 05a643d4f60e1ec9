//! Transport seam: the boundary between the bus and a host platform.
//!
//! The bus asks exactly one thing of a cross-context transport: deliver a
//! JSON value to the other contexts' listeners, optionally returning a
//! JSON value. The reference in-process implementation lives in
//! `strait-transport`; host platforms supply their own.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportResult;
use crate::listener::Listener;

/// One context's handle onto the cross-context channel.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Delivers `payload` to the other contexts' listeners and resolves to
    /// their merged response, if any.
    async fn publish(&self, payload: Value) -> TransportResult<Option<Value>>;

    /// Attaches a listener to receive the other contexts' traffic.
    async fn attach(&self, listener: Listener) -> TransportResult<()>;

    /// Detaches a previously attached listener.
    async fn detach(&self, listener: &Listener) -> TransportResult<()>;

    /// Returns true if the listener is currently attached.
    async fn is_attached(&self, listener: &Listener) -> bool;
}

/// Async source of the transport handle.
///
/// Acquisition may be lazy and platform-specific (the handle may not exist
/// until the host side is ready), so providers hold a source rather than a
/// handle.
#[async_trait]
pub trait TransportHandleSource: Send + Sync {
    /// Acquires the current transport handle.
    async fn acquire(&self) -> TransportResult<Arc<dyn Transport>>;
}
