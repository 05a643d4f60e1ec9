//! Many-listener trigger receiver.

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, trace};

use strait_core::{Direction, Envelope, Listener, ListenerError, Provider, ResponseMode, done};

use crate::error::{HandlerError, ProtocolResult};
use crate::receiver::match_inbound;

/// One of many receivers acknowledging triggers sent by a `Simplexer`.
///
/// Crowdees exist so that N independent subsystems can all react to one
/// announcement (say, "speaking started") — each registers its own crowdee
/// on the same action, and each acknowledges with the sentinel; the
/// handler contributes no reply value.
pub struct Crowdee {
    provider: Arc<dyn Provider>,
    listener: Listener,
    actions: Vec<String>,
}

impl Crowdee {
    /// Wraps `handler` as a crowdee for the given actions.
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
                let Some(envelope) = match_inbound(&payload, &matched, Direction::Trigger) else {
                    return Ok(None);
                };
                trace!(action = %envelope.action, "acknowledging a trigger");

                handler(envelope.action.clone(), envelope.datum)
                    .await
                    .map_err(|error| ListenerError::Failed(error.to_string()))?;
                let reply = Envelope::new(
                    envelope.action,
                    envelope.sequence_number,
                    Direction::Reaction,
                    ResponseMode::Acknowledgment,
                    Some(done()),
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

    /// Subscribes this crowdee to its provider.
    pub async fn register(&self) -> ProtocolResult<()> {
        debug!(actions = ?self.actions, "registering crowdee");
        Ok(self.provider.subscribe(self.listener.clone()).await?)
    }

    /// Unsubscribes this crowdee.
    pub async fn unregister(&self) -> ProtocolResult<()> {
        debug!(actions = ?self.actions, "unregistering crowdee");
        Ok(self.provider.unsubscribe(&self.listener).await?)
    }
}

impl std::fmt::Debug for Crowdee {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Crowdee")
            .field("actions", &self.actions)
            .finish()
    }
}
