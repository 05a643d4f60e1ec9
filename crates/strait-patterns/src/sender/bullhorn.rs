//! Broadcast sender: shout into the void, expect silence back.

use std::sync::Arc;

use serde_json::Value;
use tracing::{trace, warn};

use strait_core::{Direction, Envelope, Provider, ResponseMode, SequenceCounter};

use crate::error::{ProtocolError, ProtocolResult};

/// Sends broadcasts for which any reply is a protocol violation.
///
/// A bullhorn with zero receivers resolves cleanly — the cross-context
/// "no listeners" condition is swallowed below this layer — but a receiver
/// answering a broadcast is an integration bug and fails the call.
pub struct Bullhorn {
    provider: Arc<dyn Provider>,
    sequence: SequenceCounter,
}

impl Bullhorn {
    /// Creates a bullhorn sending through `provider`.
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            provider,
            sequence: SequenceCounter::new(),
        }
    }

    /// Broadcasts `datum` under `action`.
    pub async fn bullhorn(&self, action: &str, datum: Option<Value>) -> ProtocolResult<()> {
        let envelope = Envelope::new(
            action,
            self.sequence.next(),
            Direction::Shout,
            ResponseMode::Disallowed,
            datum,
        );
        trace!(action, "shouting");

        match self.provider.send(envelope.into_value()).await? {
            None => Ok(()),
            Some(_) => {
                warn!(action, "a receiver answered a broadcast");
                Err(ProtocolError::UnexpectedReply {
                    action: action.to_owned(),
                })
            }
        }
    }
}
