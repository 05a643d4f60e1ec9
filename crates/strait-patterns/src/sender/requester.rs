//! Request/response sender.

use std::sync::Arc;

use serde_json::Value;
use tracing::trace;

use strait_core::{Direction, Envelope, Provider, ResponseMode, SequenceCounter};

use crate::error::{ProtocolError, ProtocolResult};
use crate::sender::disassemble;

/// Sends requests that must be answered.
///
/// The reply is validated as a legitimate response envelope correlated to
/// the request's sequence number; an absent reply, or a reply without a
/// datum, is a protocol error.
pub struct Requester {
    provider: Arc<dyn Provider>,
    sequence: SequenceCounter,
}

impl Requester {
    /// Creates a requester sending through `provider`.
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            provider,
            sequence: SequenceCounter::new(),
        }
    }

    /// Requests `action` with `datum` and returns the responder's value.
    ///
    /// An explicit `null` answer is legal and returned as `Value::Null`.
    pub async fn bespeak(&self, action: &str, datum: Option<Value>) -> ProtocolResult<Value> {
        let sequence_number = self.sequence.next();
        let envelope = Envelope::new(
            action,
            sequence_number,
            Direction::Request,
            ResponseMode::Required,
            datum,
        );
        trace!(action, sequence_number, "requesting");

        let reply = self
            .provider
            .send(envelope.into_value())
            .await?
            .ok_or_else(|| ProtocolError::MissingReply {
                action: action.to_owned(),
            })?;

        disassemble(action, &reply, Direction::Response, sequence_number)?.ok_or_else(|| {
            ProtocolError::MissingReply {
                action: action.to_owned(),
            }
        })
    }
}
