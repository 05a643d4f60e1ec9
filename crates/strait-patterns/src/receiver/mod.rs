//! Receiver roles: one type per inbound pattern.
//!
//! Each receiver wraps a user-supplied async handler `(action, datum) ->
//! result`, subscribes to a provider under one or more action names, and
//! on each inbound envelope matching its action and expected direction,
//! invokes the handler and re-wraps its result as the reply shape the
//! pattern demands:
//!
//! | Receiver | pairs with | reply |
//! |---|---|---|
//! | [`Reactor`] | Bullhorn | silence (no reply value) |
//! | [`Responder`] | Requester | an envelope carrying the handler's value |
//! | [`Crowdee`] | Simplexer | an envelope carrying the sentinel |
//!
//! Any number of receivers may subscribe to one action. For [`Crowdee`]
//! this is the point of the pattern; two [`Responder`]s on one action is a
//! latent ambiguity the bus resolves at reduction time with a warning.

mod crowdee;
mod reactor;
mod responder;

pub use crowdee::Crowdee;
pub use reactor::Reactor;
pub use responder::Responder;

use serde_json::Value;

use strait_core::{Direction, Envelope};

/// Parses an inbound payload and accepts it only if it is a legitimate
/// envelope travelling in `expected` direction under one of `actions`.
///
/// Anything else is someone else's traffic: the receiver stays silent.
pub(crate) fn match_inbound(
    payload: &Value,
    actions: &[String],
    expected: Direction,
) -> Option<Envelope> {
    if !Envelope::validate(payload, expected, None) {
        return None;
    }
    let envelope = Envelope::from_value(payload)?;
    if !actions.iter().any(|action| *action == envelope.action) {
        return None;
    }
    Some(envelope)
}

// =============================================================================
// Tests
// =============================================================================
