//! Listener registry spanning execution contexts.

use std::sync::Arc;

use futures::future;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, trace};

use super::{LivenessProbe, collect_settled};
use crate::context;
use crate::error::{RegistryError, RegistryResult};
use crate::listener::Listener;

/// An unordered set of listeners whose owning contexts may be destroyed at
/// any time, without notification.
///
/// There is no reliable destruction signal, so dead entries are detected
/// lazily: every mutating or dispatching operation prunes listeners the
/// injected [`LivenessProbe`] reports dead. Dispatch additionally filters
/// out listeners tagged with the dispatched payload's own origin context,
/// so a context never processes the echo of its own broadcast.
pub struct CrossContextRegistry {
    listeners: Mutex<Vec<Listener>>,
    probe: Arc<dyn LivenessProbe>,
}

impl CrossContextRegistry {
    /// Creates an empty registry pruned through `probe`.
    pub fn new(probe: Arc<dyn LivenessProbe>) -> Self {
        Self {
            listeners: Mutex::new(Vec::new()),
            probe,
        }
    }

    /// Removes listeners whose owning context is dead.
    fn prune(&self) {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|listener| self.probe.is_alive(listener));
        let removed = before - listeners.len();
        if removed > 0 {
            debug!(removed, "pruned dead listeners from the cross-context registry");
        }
    }

    /// Registers a listener. Re-registration is an error.
    pub fn add(&self, listener: Listener) -> RegistryResult<()> {
        self.prune();
        let mut listeners = self.listeners.lock();
        if listeners.iter().any(|l| l.same_callback(&listener)) {
            return Err(RegistryError::AlreadyRegistered);
        }
        listeners.push(listener);
        Ok(())
    }

    /// Removes a listener. Removing an unregistered listener is an error.
    pub fn remove(&self, listener: &Listener) -> RegistryResult<()> {
        self.prune();
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|l| !l.same_callback(listener));
        if listeners.len() == before {
            return Err(RegistryError::NotRegistered);
        }
        Ok(())
    }

    /// Returns true if the listener is registered and alive.
    pub fn has(&self, listener: &Listener) -> bool {
        self.prune();
        self.listeners.lock().iter().any(|l| l.same_callback(listener))
    }

    /// The number of live registered listeners.
    pub fn len(&self) -> usize {
        self.prune();
        self.listeners.lock().len()
    }

    /// Returns true if no live listener is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dispatches `payload` to every eligible listener.
    ///
    /// A listener is eligible if it is not tagged with the payload's own
    /// origin context. With no eligible listener the dispatch fails with
    /// [`RegistryError::NoListeners`] — the transport-level "receiving end
    /// does not exist" condition. A listener whose context is revoked
    /// between pruning and invocation is swallowed by the dispatch.
    pub async fn dispatch(&self, payload: &Value) -> RegistryResult<Vec<Option<Value>>> {
        self.prune();
        let origin = context::origin_of(payload);

        let eligible: Vec<Listener> = self
            .listeners
            .lock()
            .iter()
            .filter(|listener| match (&origin, listener.context()) {
                (Some(origin), Some(owner)) => origin != owner,
                _ => true,
            })
            .cloned()
            .collect();

        if eligible.is_empty() {
            return Err(RegistryError::NoListeners);
        }
        trace!(
            listeners = eligible.len(),
            origin = origin.as_ref().map(|id| id.as_str()),
            "dispatching on the cross-context registry"
        );

        let fired: Vec<_> = eligible
            .iter()
            .map(|listener| listener.invoke(payload.clone()))
            .collect();
        collect_settled(future::join_all(fired).await)
    }
}

impl std::fmt::Debug for CrossContextRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrossContextRegistry")
            .field("listeners", &self.listeners.lock().len())
            .finish()
    }
}
