//! Sender roles: one type per outbound pattern.
//!
//! Every sender assembles envelopes from one fixed direction/response-mode
//! pair, sends them through a [`Provider`](strait_core::Provider), and
//! validates the class of reply it gets back:
//!
//! | Sender | responseMode | contract |
//! |---|---|---|
//! | [`Bullhorn`] | disallowed | any defined reply is a protocol error |
//! | [`Requester`] | required | an undefined reply is a protocol error |
//! | [`Simplexer`] | acknowledgment | the reply must be exactly the sentinel |

mod bullhorn;
mod requester;
mod simplexer;

pub use bullhorn::Bullhorn;
pub use requester::Requester;
pub use simplexer::Simplexer;

use serde_json::Value;

use strait_core::{Direction, Envelope};

use crate::error::ProtocolError;

/// Validates a raw reply against the expected inbound direction and the
/// sequence number of the request it must answer, and extracts its datum.
pub(crate) fn disassemble(
    action: &str,
    reply: &Value,
    expected: Direction,
    sequence_number: u64,
) -> Result<Option<Value>, ProtocolError> {
    if !Envelope::validate(reply, expected, Some(sequence_number)) {
        return Err(ProtocolError::MalformedReply {
            action: action.to_owned(),
        });
    }
    let envelope = Envelope::from_value(reply).ok_or_else(|| ProtocolError::MalformedReply {
        action: action.to_owned(),
    })?;
    Ok(envelope.datum)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;

    use strait_core::{
        ContextId, ContextIdentity, CrossContextProvider, Listener, Provider, ResponseMode,
        SameContextProvider, SplitProvider,
    };
    use strait_transport::{HubHandleSource, InProcessHub};

    use crate::error::ProtocolError;
    use crate::receiver::{Crowdee, Responder};

    async fn bus(hub: &Arc<InProcessHub>, name: &str) -> Arc<SplitProvider> {
        let context = ContextId::named(name);
        let provider = Arc::new(SplitProvider::new(
            ContextIdentity::new(context.clone()),
            Arc::new(SameContextProvider::new()),
            Arc::new(CrossContextProvider::new(Arc::new(HubHandleSource::new(
                Arc::clone(hub),
                context,
            )))),
        ));
        provider.start().await.unwrap();
        provider
    }

    #[tokio::test]
    async fn test_bullhorn_with_zero_receivers_resolves() {
        let hub = InProcessHub::new();
        let background = bus(&hub, "background").await;

        let bullhorn = Bullhorn::new(background);
        bullhorn
            .bullhorn("broadcaster:speaking:entire:before", None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_bullhorn_fails_when_a_receiver_answers() {
        let hub = InProcessHub::new();
        let background = bus(&hub, "background").await;

        // A misbehaving receiver answering a broadcast.
        background
            .subscribe(Listener::new(|_| async { Ok(Some(json!("oops"))) }))
            .await
            .unwrap();

        let bullhorn = Bullhorn::new(background);
        let err = bullhorn
            .bullhorn("broadcaster:speaking:entire:before", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ProtocolError::UnexpectedReply { .. }));
    }

    #[tokio::test]
    async fn test_request_round_trips_across_contexts() {
        let hub = InProcessHub::new();
        let background = bus(&hub, "background").await;
        let popup = bus(&hub, "popup").await;

        let payload = json!({
            "voice": { "name": "alto", "rate": 1.25 },
            "history": [1, 2, 3],
        });

        let responder = Responder::new(
            Arc::clone(&background) as Arc<dyn Provider>,
            ["service:voices:getEffectiveRateForVoice"],
            |_action, datum| async move { Ok(datum.unwrap_or(Value::Null)) },
        );
        responder.register().await.unwrap();

        let requester = Requester::new(popup);
        let value = requester
            .bespeak(
                "service:voices:getEffectiveRateForVoice",
                Some(payload.clone()),
            )
            .await
            .unwrap();
        assert_eq!(value, payload);
    }

    #[tokio::test]
    async fn test_request_is_answered_locally_too() {
        let hub = InProcessHub::new();
        let background = bus(&hub, "background").await;

        let responder = Responder::new(
            Arc::clone(&background) as Arc<dyn Provider>,
            ["service:history:getSpeakingHistory"],
            |_action, _datum| async move { Ok(json!(["earlier", "later"])) },
        );
        responder.register().await.unwrap();

        let requester = Requester::new(background);
        let value = requester
            .bespeak("service:history:getSpeakingHistory", None)
            .await
            .unwrap();
        assert_eq!(value, json!(["earlier", "later"]));
    }

    #[tokio::test]
    async fn test_request_without_a_responder_fails() {
        let hub = InProcessHub::new();
        let background = bus(&hub, "background").await;

        let requester = Requester::new(background);
        let err = requester
            .bespeak("service:history:getSpeakingHistory", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ProtocolError::MissingReply { .. }));
    }

    #[tokio::test]
    async fn test_trigger_is_acknowledged_by_a_crowdee() {
        let hub = InProcessHub::new();
        let background = bus(&hub, "background").await;
        let popup = bus(&hub, "popup").await;

        let crowdee = Crowdee::new(
            Arc::clone(&popup) as Arc<dyn Provider>,
            ["broadcaster:speaking:started"],
            |_action, _datum| async move { Ok(()) },
        );
        crowdee.register().await.unwrap();

        let simplexer = Simplexer::new(background);
        simplexer
            .betoken("broadcaster:speaking:started", Some(json!({ "text": "hi" })))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_trigger_rejects_a_non_sentinel_reply() {
        let hub = InProcessHub::new();
        let background = bus(&hub, "background").await;

        // A receiver wired to the trigger direction but answering with a
        // real value instead of the sentinel.
        background
            .subscribe(Listener::new(|payload: Value| async move {
                let Some(envelope) = Envelope::from_value(&payload) else {
                    return Ok(None);
                };
                if envelope.direction != Direction::Trigger {
                    return Ok(None);
                }
                let reply = Envelope::new(
                    envelope.action,
                    envelope.sequence_number,
                    Direction::Reaction,
                    ResponseMode::Freeform,
                    Some(json!(42)),
                );
                Ok(Some(reply.into_value()))
            }))
            .await
            .unwrap();

        let simplexer = Simplexer::new(background);
        let err = simplexer
            .betoken("broadcaster:speaking:started", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ProtocolError::NotAcknowledged { .. }));
    }

    #[tokio::test]
    async fn test_trigger_with_no_crowdee_is_not_acknowledged() {
        let hub = InProcessHub::new();
        let background = bus(&hub, "background").await;

        let simplexer = Simplexer::new(background);
        let err = simplexer
            .betoken("broadcaster:speaking:started", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ProtocolError::NotAcknowledged { .. }));
    }
}
