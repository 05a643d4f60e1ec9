//! Broadcast receiver.

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, trace};

use strait_core::{Direction, Listener, ListenerError, Provider};

use crate::error::{HandlerError, ProtocolResult};
use crate::receiver::match_inbound;

/// Reacts to broadcasts shouted by a `Bullhorn`.
///
/// The handler's result is discarded; a broadcast disallows replies, so
/// the reactor always answers with silence.
pub struct Reactor {
    provider: Arc<dyn Provider>,
    listener: Listener,
    actions: Vec<String>,
}

impl Reactor {
    /// Wraps `handler` as a reactor for the given actions.
    pub fn new<F, Fut>(
        provider: Arc<dyn Provider>,
        actions: impl IntoIterator<Item = impl Into<String>>,
        handler: F,
    ) -> Self
    where
        F: Fn(String, Option<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        let actions: Vec<String> = actions.into_iter().map(Into::into).collect();
        let matched: Arc<[String]> = actions.clone().into();
        let handler = Arc::new(handler);

        let listener = Listener::new(move |payload: Value| {
            let matched = Arc::clone(&matched);
            let handler = Arc::clone(&handler);
            async move {
                let Some(envelope) = match_inbound(&payload, &matched, Direction::Shout) else {
                    return Ok(None);
                };
                trace!(action = %envelope.action, "reacting to a broadcast");

                handler(envelope.action, envelope.datum)
                    .await
                    .map_err(|error| ListenerError::Failed(error.to_string()))?;
                Ok(None)
            }
        });

        Self {
            provider,
            listener,
            actions,
        }
    }

    /// Subscribes this reactor to its provider.
    pub async fn register(&self) -> ProtocolResult<()> {
        debug!(actions = ?self.actions, "registering reactor");
        Ok(self.provider.subscribe(self.listener.clone()).await?)
    }

    /// Unsubscribes this reactor.
    pub async fn unregister(&self) -> ProtocolResult<()> {
        debug!(actions = ?self.actions, "unregistering reactor");
        Ok(self.provider.unsubscribe(&self.listener).await?)
    }
}

impl std::fmt::Debug for Reactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reactor")
            .field("actions", &self.actions)
            .finish()
    }
}
