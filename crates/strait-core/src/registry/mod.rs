//! Listener registries.
//!
//! Two variants share one contract (`add`, `remove`, `has`, `dispatch`):
//!
//! - [`SameContextRegistry`] — all listeners share one heap; synchronous
//!   add/remove, no pruning.
//! - [`CrossContextRegistry`] — listeners may belong to contexts that have
//!   since been destroyed; every operation prunes dead entries first, and
//!   dispatch suppresses the echo of a context's own traffic.

mod cross_context;
mod same_context;

pub use cross_context::CrossContextRegistry;
pub use same_context::SameContextRegistry;

use serde_json::Value;
use tracing::info;

use crate::error::{RegistryError, RegistryResult};
use crate::listener::{Listener, ListenerError, ListenerReply};

/// Capability interface for detecting listeners whose owning context has
/// been destroyed, implemented per transport and injected into the
/// cross-context registry.
pub trait LivenessProbe: Send + Sync {
    /// Returns true if the listener can still be invoked.
    fn is_alive(&self, listener: &Listener) -> bool;
}

/// A probe that never declares a listener dead.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysAlive;

impl LivenessProbe for AlwaysAlive {
    fn is_alive(&self, _listener: &Listener) -> bool {
        true
    }
}

/// Collapses settled listener replies into a response set.
///
/// Revoked-context failures are swallowed (logged at info); all futures
/// have already settled, so the first remaining failure is then reported.
pub(crate) fn collect_settled(settled: Vec<ListenerReply>) -> RegistryResult<Vec<Option<Value>>> {
    let mut responses = Vec::with_capacity(settled.len());
    let mut failure: Option<RegistryError> = None;
    for reply in settled {
        match reply {
            Ok(response) => responses.push(response),
            Err(ListenerError::ContextRevoked) => {
                info!("listener's context was revoked mid-dispatch, ignoring");
                responses.push(None);
            }
            Err(ListenerError::Failed(reason)) => {
                if failure.is_none() {
                    failure = Some(RegistryError::Listener(reason));
                }
            }
        }
    }
    match failure {
        Some(error) => Err(error),
        None => Ok(responses),
    }
}
