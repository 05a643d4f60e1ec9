//! Listeners: the callbacks a registry dispatches payloads to.
//!
//! A [`Listener`] wraps an async callback taking a raw JSON payload and
//! optionally producing a raw JSON response. Listener identity is the
//! callback allocation itself — registering the same listener (or a clone
//! of it) twice in one registry is an error, mirroring function-reference
//! identity in the registries' contract.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::context::ContextId;
use crate::error::ContextError;

/// Errors a listener invocation can produce.
#[derive(Debug, Clone, Error)]
pub enum ListenerError {
    /// The listener's owning context has been destroyed.
    ///
    /// An expected steady-state condition; dispatchers swallow it.
    #[error("listener's owning context has been revoked")]
    ContextRevoked,

    /// The listener's handler failed.
    #[error("listener failed: {0}")]
    Failed(String),
}

/// What a listener invocation resolves to: an optional raw response.
pub type ListenerReply = Result<Option<Value>, ListenerError>;

type Callback = dyn Fn(Value) -> BoxFuture<'static, ListenerReply> + Send + Sync;

/// An async callback registered with a listener registry.
///
/// Cloning a `Listener` preserves its identity: clones compare equal under
/// [`Listener::same_callback`] and count as the same registration.
#[derive(Clone)]
pub struct Listener {
    callback: Arc<Callback>,
    context: Option<ContextId>,
    liveness: Option<CancellationToken>,
}

impl Listener {
    /// Wraps an async callback in a new listener with no context tag.
    pub fn new<F, Fut>(callback: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ListenerReply> + Send + 'static,
    {
        Self {
            callback: Arc::new(move |payload| Box::pin(callback(payload))),
            context: None,
            liveness: None,
        }
    }

    /// Tags this listener with its owning context's id.
    ///
    /// Double-tagging is a protocol error.
    pub fn tagged(self, id: ContextId) -> Result<Self, ContextError> {
        if let Some(existing) = self.context {
            return Err(ContextError::ListenerAlreadyTagged(existing));
        }
        Ok(Self {
            context: Some(id),
            ..self
        })
    }

    /// The owning context's id, if tagged.
    pub fn context(&self) -> Option<&ContextId> {
        self.context.as_ref()
    }

    /// The owning context's id; an error if the tag is absent.
    pub fn require_context(&self) -> Result<&ContextId, ContextError> {
        self.context.as_ref().ok_or(ContextError::NotTagged)
    }

    /// Binds this listener's liveness to a context's cancellation token.
    ///
    /// Invoking a listener whose token has been cancelled yields
    /// [`ListenerError::ContextRevoked`] without running the callback.
    pub fn with_liveness(self, token: CancellationToken) -> Self {
        Self {
            liveness: Some(token),
            ..self
        }
    }

    /// The liveness token, if bound.
    pub fn liveness(&self) -> Option<&CancellationToken> {
        self.liveness.as_ref()
    }

    /// Invokes the callback with `payload`.
    pub async fn invoke(&self, payload: Value) -> ListenerReply {
        if let Some(token) = &self.liveness {
            if token.is_cancelled() {
                return Err(ListenerError::ContextRevoked);
            }
        }
        (self.callback)(payload).await
    }

    /// Returns true if `other` wraps the same callback allocation.
    pub fn same_callback(&self, other: &Listener) -> bool {
        Arc::ptr_eq(&self.callback, &other.callback)
    }
}

impl std::fmt::Debug for Listener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listener")
            .field("context", &self.context)
            .field("live", &self.liveness.as_ref().map(|t| !t.is_cancelled()))
            .finish()
    }
}
