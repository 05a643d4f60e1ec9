//! The message envelope: the one wire format every bus pattern shares.
//!
//! An [`Envelope`] is a JSON object exchanged verbatim over the transport:
//!
//! ```json
//! {
//!   "identifier": "strait-envelope-v1",
//!   "sequenceNumber": 3078411502,
//!   "action": "service:voices:getEffectiveRateForVoice",
//!   "direction": "request:outbound:request",
//!   "responseMode": "required",
//!   "datum": { "voice": "default" }
//! }
//! ```
//!
//! The transport may hand back arbitrary JSON from contexts running other
//! versions of the software, so inbound candidates are checked with
//! [`Envelope::validate`], which never panics.

use std::sync::atomic::{AtomicU64, Ordering};

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::ContextId;

/// Constant tag identifying an envelope produced by this bus.
pub const ENVELOPE_IDENTIFIER: &str = "strait-envelope-v1";

/// Well-known value meaning "handled, nothing to return".
///
/// Distinct from the absence of a response (no handler answered) and from
/// an explicit `null` (a handler answered with null).
pub const DONE_SENTINEL: &str = "strait:done";

/// Returns the sentinel acknowledgment value.
pub fn done() -> Value {
    Value::String(DONE_SENTINEL.to_owned())
}

/// Returns true if `value` is exactly the sentinel acknowledgment.
pub fn is_done(value: &Value) -> bool {
    value.as_str() == Some(DONE_SENTINEL)
}

// =============================================================================
// Direction
// =============================================================================

/// Communication pattern × direction, as one of six wire tokens.
///
/// Outbound tokens travel from sender to receivers; each has exactly one
/// paired inbound token that a legitimate reply must carry. A receiver
/// must reject any envelope whose direction does not match the direction
/// expected for its pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Broadcast, outbound. No reply is allowed.
    #[serde(rename = "bullhorn:outbound:shout")]
    Shout,
    /// Broadcast, inbound. Exists for completeness; never appears on the wire.
    #[serde(rename = "bullhorn:inbound:silence")]
    Silence,
    /// Request, outbound.
    #[serde(rename = "request:outbound:request")]
    Request,
    /// Request, inbound reply.
    #[serde(rename = "request:inbound:response")]
    Response,
    /// Acknowledged trigger, outbound.
    #[serde(rename = "simplex:outbound:trigger")]
    Trigger,
    /// Acknowledged trigger, inbound acknowledgment.
    #[serde(rename = "simplex:inbound:reaction")]
    Reaction,
}

impl Direction {
    /// The wire token for this direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Shout => "bullhorn:outbound:shout",
            Self::Silence => "bullhorn:inbound:silence",
            Self::Request => "request:outbound:request",
            Self::Response => "request:inbound:response",
            Self::Trigger => "simplex:outbound:trigger",
            Self::Reaction => "simplex:inbound:reaction",
        }
    }

    /// Returns true for sender-to-receiver tokens.
    pub fn is_outbound(self) -> bool {
        matches!(self, Self::Shout | Self::Request | Self::Trigger)
    }

    /// The inbound token a reply to this outbound token must carry.
    pub fn reply(self) -> Option<Direction> {
        match self {
            Self::Shout => Some(Self::Silence),
            Self::Request => Some(Self::Response),
            Self::Trigger => Some(Self::Reaction),
            _ => None,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Response Mode
// =============================================================================

/// What kind of reply is legal for an envelope, independent of direction.
///
/// Senders use this to assert class invariants: a bullhorn must never
/// receive a value, a requester must always receive one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    /// No reply is allowed.
    Disallowed,
    /// A reply value is required.
    Required,
    /// The reply must be the bare acknowledgment sentinel.
    Acknowledgment,
    /// Any reply, or none, is legal.
    Freeform,
}

impl ResponseMode {
    /// The wire token for this mode.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disallowed => "disallowed",
            Self::Required => "required",
            Self::Acknowledgment => "acknowledgment",
            Self::Freeform => "freeform",
        }
    }
}

// =============================================================================
// Envelope
// =============================================================================

/// The structured message exchanged over the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Constant tag, [`ENVELOPE_IDENTIFIER`].
    pub identifier: String,
    /// Per-sender monotonic counter value; correlates a reply to its request.
    pub sequence_number: u64,
    /// Flat string naming the logical operation, `domain:resource:verb` by convention.
    pub action: String,
    /// Pattern × direction token.
    pub direction: Direction,
    /// Declares what kind of reply is legal.
    pub response_mode: ResponseMode,
    /// Optional payload. Absence is a legal "no answer", distinct from `null`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datum: Option<Value>,
    /// Sending context's identifier, attached by the split provider on fan-out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<ContextId>,
}

impl Envelope {
    /// Assembles a new envelope. The context tag is left unset; it is
    /// attached by the provider on fan-out, never by the sender itself.
    pub fn new(
        action: impl Into<String>,
        sequence_number: u64,
        direction: Direction,
        response_mode: ResponseMode,
        datum: Option<Value>,
    ) -> Self {
        Self {
            identifier: ENVELOPE_IDENTIFIER.to_owned(),
            sequence_number,
            action: action.into(),
            direction,
            response_mode,
            datum,
            context: None,
        }
    }

    /// Serializes the envelope into its wire form.
    pub fn into_value(self) -> Value {
        let mut map = serde_json::Map::new();
        map.insert("identifier".to_owned(), Value::String(self.identifier));
        map.insert("sequenceNumber".to_owned(), Value::from(self.sequence_number));
        map.insert("action".to_owned(), Value::String(self.action));
        map.insert(
            "direction".to_owned(),
            Value::String(self.direction.as_str().to_owned()),
        );
        map.insert(
            "responseMode".to_owned(),
            Value::String(self.response_mode.as_str().to_owned()),
        );
        if let Some(datum) = self.datum {
            map.insert("datum".to_owned(), datum);
        }
        if let Some(context) = self.context {
            map.insert("context".to_owned(), Value::String(context.into_string()));
        }
        Value::Object(map)
    }

    /// Parses a wire value into an envelope produced by this bus.
    ///
    /// Returns `None` for foreign or malformed values, including objects
    /// carrying a different identifier tag.
    pub fn from_value(value: &Value) -> Option<Self> {
        let envelope: Self = serde_json::from_value(value.clone()).ok()?;
        if envelope.identifier != ENVELOPE_IDENTIFIER {
            return None;
        }
        Some(envelope)
    }

    /// Checks whether `candidate` is a legitimate envelope travelling in the
    /// expected direction, optionally correlated to a known sequence number.
    ///
    /// Returns `false` — never panics — if the candidate is not an object,
    /// if its identifier tag is present but mismatched, if its direction
    /// does not equal `expected`, or if `expected_seq` was supplied and
    /// does not match.
    pub fn validate(candidate: &Value, expected: Direction, expected_seq: Option<u64>) -> bool {
        let Some(object) = candidate.as_object() else {
            return false;
        };
        if let Some(tag) = object.get("identifier") {
            if tag.as_str() != Some(ENVELOPE_IDENTIFIER) {
                return false;
            }
        }
        if object.get("direction").and_then(Value::as_str) != Some(expected.as_str()) {
            return false;
        }
        if let Some(sequence_number) = expected_seq {
            if object.get("sequenceNumber").and_then(Value::as_u64) != Some(sequence_number) {
                return false;
            }
        }
        true
    }
}

// =============================================================================
// Sequence Counter
// =============================================================================

/// Per-sender monotonically increasing counter, seeded with a randomized
/// base so independent senders are unlikely to collide. Uniqueness is
/// per-sender-instance, not globally enforced.
#[derive(Debug)]
pub struct SequenceCounter {
    next: AtomicU64,
}

impl SequenceCounter {
    /// Creates a counter with a randomized base.
    pub fn new() -> Self {
        Self::seeded(rand::rng().random_range(0..u64::from(u32::MAX)))
    }

    /// Creates a counter with a fixed base.
    pub fn seeded(base: u64) -> Self {
        Self {
            next: AtomicU64::new(base),
        }
    }

    /// Returns the next sequence number.
    pub fn next(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for SequenceCounter {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample(direction: Direction) -> Value {
        Envelope::new(
            "service:history:getSpeakingHistory",
            42,
            direction,
            ResponseMode::Required,
            Some(json!({ "limit": 10 })),
        )
        .into_value()
    }

    #[test]
    fn test_validate_accepts_matching_direction() {
        let value = sample(Direction::Request);
        assert!(Envelope::validate(&value, Direction::Request, None));
        assert!(Envelope::validate(&value, Direction::Request, Some(42)));
    }

    #[test]
    fn test_validate_direction_mutation_flips_result() {
        let mut value = sample(Direction::Request);
        assert!(Envelope::validate(&value, Direction::Request, Some(42)));

        value["direction"] = Value::String(Direction::Response.as_str().to_owned());
        assert!(!Envelope::validate(&value, Direction::Request, Some(42)));
        assert!(Envelope::validate(&value, Direction::Response, Some(42)));
    }

    #[test]
    fn test_validate_rejects_mismatched_identifier() {
        let mut value = sample(Direction::Request);
        value["identifier"] = Value::String("someone-elses-bus".to_owned());
        assert!(!Envelope::validate(&value, Direction::Request, None));
    }

    #[test]
    fn test_validate_tolerates_absent_identifier() {
        let mut value = sample(Direction::Request);
        value.as_object_mut().unwrap().remove("identifier");
        assert!(Envelope::validate(&value, Direction::Request, None));
    }

    #[test]
    fn test_validate_rejects_wrong_sequence_number() {
        let value = sample(Direction::Request);
        assert!(!Envelope::validate(&value, Direction::Request, Some(43)));
    }

    #[test]
    fn test_validate_rejects_non_objects() {
        assert!(!Envelope::validate(&json!(null), Direction::Request, None));
        assert!(!Envelope::validate(&json!("hello"), Direction::Request, None));
        assert!(!Envelope::validate(&json!([1, 2, 3]), Direction::Request, None));
    }

    #[test]
    fn test_absent_datum_survives_round_trip_as_absent() {
        let value = Envelope::new(
            "broadcaster:speaking:entire:before",
            7,
            Direction::Shout,
            ResponseMode::Disallowed,
            None,
        )
        .into_value();

        assert!(value.get("datum").is_none());
        let parsed = Envelope::from_value(&value).unwrap();
        assert_eq!(parsed.datum, None);
    }

    #[test]
    fn test_explicit_null_datum_is_distinct_from_absent() {
        let value = Envelope::new(
            "service:voices:getEffectiveRateForVoice",
            7,
            Direction::Response,
            ResponseMode::Required,
            Some(Value::Null),
        )
        .into_value();

        assert_eq!(value.get("datum"), Some(&Value::Null));
        let parsed = Envelope::from_value(&value).unwrap();
        assert_eq!(parsed.datum, Some(Value::Null));
    }

    #[test]
    fn test_from_value_rejects_foreign_identifier() {
        let mut value = sample(Direction::Request);
        value["identifier"] = Value::String("someone-elses-bus".to_owned());
        assert!(Envelope::from_value(&value).is_none());
    }

    #[test]
    fn test_direction_reply_pairing() {
        assert_eq!(Direction::Shout.reply(), Some(Direction::Silence));
        assert_eq!(Direction::Request.reply(), Some(Direction::Response));
        assert_eq!(Direction::Trigger.reply(), Some(Direction::Reaction));
        assert_eq!(Direction::Response.reply(), None);
    }

    #[test]
    fn test_sequence_counter_is_monotonic() {
        let counter = SequenceCounter::seeded(100);
        assert_eq!(counter.next(), 100);
        assert_eq!(counter.next(), 101);
        assert_eq!(counter.next(), 102);
    }

    #[test]
    fn test_sentinel_is_not_null_and_not_absent() {
        assert!(is_done(&done()));
        assert!(!is_done(&Value::Null));
        assert!(!is_done(&json!("strait:other")));
    }
}
