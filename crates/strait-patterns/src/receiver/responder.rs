//! Request/response receiver.

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, trace};

use strait_core::{Direction, Envelope, Listener, ListenerError, Provider, ResponseMode};

use crate::error::{HandlerError, ProtocolResult};
use crate::receiver::match_inbound;

/// Answers requests sent by a `Requester`.
///
/// The handler's value is wrapped in a response envelope that echoes the
/// request's sequence number, which is what lets the requester correlate
/// and validate the reply.
pub struct Responder {
    provider: Arc<dyn Provider>,
    listener: Listener,
    actions: Vec<String>,
}

impl Responder {
    /// Wraps `handler` as a responder for the given actions.
    pub fn new<F, Fut>(
        provider: Arc<dyn Provider>,
        actions: impl IntoIterator<Item = impl Into<String>>,
        handler: F,
    ) -> Self
    where
        F: Fn(String, Option<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, HandlerError>> + Send + 'static,
    {
        let actions: Vec<String> = actions.into_iter().map(Into::into).collect();
        let matched: Arc<[String]> = actions.clone().into();
        let handler = Arc::new(handler);

        let listener = Listener::new(move |payload: Value| {
            let matched = Arc::clone(&matched);
            let handler = Arc::clone(&handler);
            async move {
                let Some(envelope) = match_inbound(&payload, &matched, Direction::Request) else {
                    return Ok(None);
                };
                trace!(action = %envelope.action, "answering a request");

                let value = handler(envelope.action.clone(), envelope.datum)
                    .await
                    .map_err(|error| ListenerError::Failed(error.to_string()))?;
                let reply = Envelope::new(
                    envelope.action,
                    envelope.sequence_number,
                    Direction::Response,
                    ResponseMode::Required,
                    Some(value),
                );
                Ok(Some(reply.into_value()))
            }
        });

        Self {
            provider,
            listener,
            actions,
        }
    }

    /// Subscribes this responder to its provider.
    pub async fn register(&self) -> ProtocolResult<()> {
        debug!(actions = ?self.actions, "registering responder");
        Ok(self.provider.subscribe(self.listener.clone()).await?)
    }

    /// Unsubscribes this responder.
    pub async fn unregister(&self) -> ProtocolResult<()> {
        debug!(actions = ?self.actions, "unregistering responder");
        Ok(self.provider.unsubscribe(&self.listener).await?)
    }
}

impl std::fmt::Debug for Responder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Responder")
            .field("actions", &self.actions)
            .finish()
    }
}
