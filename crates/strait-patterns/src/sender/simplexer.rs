//! Fire-and-forget-with-acknowledgment sender.

use std::sync::Arc;

use serde_json::Value;
use tracing::trace;

use strait_core::{Direction, Envelope, Provider, ResponseMode, SequenceCounter, is_done};

use crate::error::{ProtocolError, ProtocolResult};
use crate::sender::disassemble;

/// Sends triggers whose only legal reply is the bare acknowledgment
/// sentinel.
///
/// The caller learns that *someone* handled the trigger, and nothing else;
/// a receiver returning an actual value through this pattern is an
/// integration bug and fails the call.
pub struct Simplexer {
    provider: Arc<dyn Provider>,
    sequence: SequenceCounter,
}

impl Simplexer {
    /// Creates a simplexer sending through `provider`.
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            provider,
            sequence: SequenceCounter::new(),
        }
    }

    /// Triggers `action` with `datum` and awaits the acknowledgment.
    pub async fn betoken(&self, action: &str, datum: Option<Value>) -> ProtocolResult<()> {
        let sequence_number = self.sequence.next();
        let envelope = Envelope::new(
            action,
            sequence_number,
            Direction::Trigger,
            ResponseMode::Acknowledgment,
            datum,
        );
        trace!(action, sequence_number, "triggering");

        let reply = self
            .provider
            .send(envelope.into_value())
            .await?
            .ok_or_else(|| ProtocolError::NotAcknowledged {
                action: action.to_owned(),
            })?;

        let datum = disassemble(action, &reply, Direction::Reaction, sequence_number)?;
        match datum {
            Some(value) if is_done(&value) => Ok(()),
            _ => Err(ProtocolError::NotAcknowledged {
                action: action.to_owned(),
            }),
        }
    }
}
