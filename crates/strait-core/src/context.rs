//! Context identity and tagging.
//!
//! Every execution context — the long-lived background context, or one
//! ephemeral page instance — carries a unique [`ContextId`]. Outgoing
//! payloads and registered listeners are tagged with it so the
//! cross-context registry can skip a context's own listeners when the
//! transport fans that context's own broadcast back at it.
//!
//! Identity is injected, not global: a [`ContextIdentity`] is constructed
//! once per context and handed to the provider, so the single-assignment
//! invariant holds by construction.

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ContextError;

/// Key under which the sending context's id is attached to a payload.
pub const CONTEXT_KEY: &str = "context";

// =============================================================================
// Context Id
// =============================================================================

/// A string uniquely naming one execution context instance.
///
/// Never reused: a new instance of "the same" page generates a fresh id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextId(String);

impl ContextId {
    /// A well-known id, supplied externally for the long-lived background
    /// context.
    pub fn named(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// A randomized per-instance id for an ephemeral context, derived from
    /// a human-readable label.
    pub fn ephemeral(label: &str) -> Self {
        let suffix: u32 = rand::rng().random();
        Self(format!("{label}-{suffix:08x}"))
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the id, returning the underlying string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for ContextId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Context Identity
// =============================================================================

/// The identity a provider acts under, fixed at construction.
#[derive(Debug, Clone)]
pub struct ContextIdentity {
    id: ContextId,
}

impl ContextIdentity {
    /// Binds an identity to the given context id.
    pub fn new(id: ContextId) -> Self {
        Self { id }
    }

    /// The bound context id.
    pub fn id(&self) -> &ContextId {
        &self.id
    }
}

// =============================================================================
// Payload Tagging
// =============================================================================

/// Attaches `id` to an outgoing payload under [`CONTEXT_KEY`].
///
/// Used only on fan-out sends. Tagging an already-tagged payload is a
/// protocol error, as is tagging a non-object.
pub fn tag_payload(payload: &mut Value, id: &ContextId) -> Result<(), ContextError> {
    let Some(object) = payload.as_object_mut() else {
        return Err(ContextError::PayloadNotTaggable);
    };
    if let Some(existing) = object.get(CONTEXT_KEY).and_then(Value::as_str) {
        return Err(ContextError::PayloadAlreadyTagged(ContextId::named(existing)));
    }
    object.insert(
        CONTEXT_KEY.to_owned(),
        Value::String(id.as_str().to_owned()),
    );
    Ok(())
}

/// Reads the sending context's id from a payload, if one is attached.
pub fn origin_of(payload: &Value) -> Option<ContextId> {
    payload
        .get(CONTEXT_KEY)?
        .as_str()
        .map(ContextId::named)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tag_payload_attaches_context() {
        let id = ContextId::named("background");
        let mut payload = json!({ "action": "x" });

        tag_payload(&mut payload, &id).unwrap();
        assert_eq!(origin_of(&payload), Some(id));
    }

    #[test]
    fn test_tag_payload_rejects_double_tagging() {
        let mut payload = json!({ "action": "x" });
        tag_payload(&mut payload, &ContextId::named("ctx-a")).unwrap();

        let err = tag_payload(&mut payload, &ContextId::named("ctx-b")).unwrap_err();
        assert!(matches!(err, ContextError::PayloadAlreadyTagged(id) if id.as_str() == "ctx-a"));
    }

    #[test]
    fn test_tag_payload_rejects_non_objects() {
        let mut payload = json!("not an object");
        let err = tag_payload(&mut payload, &ContextId::named("ctx-a")).unwrap_err();
        assert!(matches!(err, ContextError::PayloadNotTaggable));
    }

    #[test]
    fn test_origin_of_untagged_payload_is_none() {
        assert_eq!(origin_of(&json!({ "action": "x" })), None);
    }

    #[test]
    fn test_ephemeral_ids_differ_per_instance() {
        let a = ContextId::ephemeral("options");
        let b = ContextId::ephemeral("options");
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("options-"));
    }
}
