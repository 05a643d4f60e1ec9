//! Response reduction policies.
//!
//! A fan-out send can come back with zero, one, or many per-recipient
//! responses; the caller expects exactly one. These pure functions collapse
//! a response set into the single response a requester receives.

use serde_json::Value;
use tracing::warn;

use crate::envelope::{self, DONE_SENTINEL};

/// Returns true if `value` is an acknowledgment: the bare sentinel, or a
/// reply envelope whose datum is the sentinel.
pub fn is_acknowledgment(value: &Value) -> bool {
    match value {
        Value::String(_) => envelope::is_done(value),
        Value::Object(object) => object.get("datum").and_then(Value::as_str) == Some(DONE_SENTINEL),
        _ => false,
    }
}

/// Picks the single defined response out of a response set.
///
/// Zero defined responses yield `None`. More than one means multiple
/// recipients answered what should have been a single-answer exchange;
/// that is resolved in favor of availability — the first answer wins and a
/// warning makes the ambiguity visible during development.
pub fn pick_defined(responses: &[Option<Value>]) -> Option<Value> {
    let defined: Vec<&Value> = responses.iter().flatten().collect();
    if defined.len() > 1 {
        warn!(
            count = defined.len(),
            "multiple recipients answered a single-answer exchange, keeping the first"
        );
    }
    defined.first().map(|value| (*value).clone())
}

/// Like [`pick_defined`], but deprioritizes acknowledgments.
///
/// If some recipients return a real value and others the "done" sentinel,
/// the first real value wins; only if every defined response is the
/// sentinel does the sentinel propagate. Concurrent acknowledgments are
/// the many-listener broadcast steady state and are not warned about.
pub fn pick_relevant(responses: &[Option<Value>]) -> Option<Value> {
    let defined: Vec<&Value> = responses.iter().flatten().collect();
    let real: Vec<&Value> = defined
        .iter()
        .copied()
        .filter(|value| !is_acknowledgment(value))
        .collect();

    if real.len() > 1 {
        warn!(
            count = real.len(),
            "multiple recipients answered a single-answer exchange, keeping the first"
        );
    }
    real.first()
        .or_else(|| defined.first())
        .map(|value| (*value).clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::done;
    use serde_json::json;

    #[test]
    fn test_zero_defined_responses_reduce_to_none() {
        assert_eq!(pick_defined(&[]), None);
        assert_eq!(pick_defined(&[None, None]), None);
        assert_eq!(pick_relevant(&[]), None);
        assert_eq!(pick_relevant(&[None, None]), None);
    }

    #[test]
    fn test_single_defined_response_wins() {
        let responses = [None, Some(json!(42)), None];
        assert_eq!(pick_defined(&responses), Some(json!(42)));
        assert_eq!(pick_relevant(&responses), Some(json!(42)));
    }

    #[test]
    fn test_pick_defined_keeps_the_first_of_many() {
        let responses = [Some(json!("a")), Some(json!("b"))];
        assert_eq!(pick_defined(&responses), Some(json!("a")));
    }

    #[test]
    fn test_pick_relevant_prefers_real_values_over_the_sentinel() {
        let responses = [Some(done()), Some(json!(42))];
        assert_eq!(pick_relevant(&responses), Some(json!(42)));
        // pick_defined has no such preference.
        assert_eq!(pick_defined(&responses), Some(done()));
    }

    #[test]
    fn test_pick_relevant_propagates_an_unanimous_sentinel() {
        let responses = [Some(done()), Some(done())];
        assert_eq!(pick_relevant(&responses), Some(done()));
    }

    #[test]
    fn test_acknowledgment_envelopes_are_deprioritized_too() {
        let ack = json!({ "identifier": "strait-envelope-v1", "datum": "strait:done" });
        let real = json!({ "identifier": "strait-envelope-v1", "datum": 7 });
        assert_eq!(
            pick_relevant(&[Some(ack), Some(real.clone())]),
            Some(real)
        );
    }

    #[test]
    fn test_explicit_null_is_a_defined_response() {
        assert_eq!(pick_defined(&[Some(json!(null))]), Some(json!(null)));
        assert_eq!(pick_relevant(&[Some(json!(null))]), Some(json!(null)));
    }
}
