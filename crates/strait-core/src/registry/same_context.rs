//! Listener registry for one execution context.

use futures::future;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::trace;

use super::collect_settled;
use crate::error::{RegistryError, RegistryResult};
use crate::listener::Listener;

/// An unordered set of listeners all living in the local context.
///
/// No pruning is needed: all listeners share one heap and cannot go dead
/// independently of the whole context.
#[derive(Default)]
pub struct SameContextRegistry {
    listeners: Mutex<Vec<Listener>>,
}

impl SameContextRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener. Re-registration is an error.
    pub fn add(&self, listener: Listener) -> RegistryResult<()> {
        let mut listeners = self.listeners.lock();
        if listeners.iter().any(|l| l.same_callback(&listener)) {
            return Err(RegistryError::AlreadyRegistered);
        }
        listeners.push(listener);
        Ok(())
    }

    /// Removes a listener. Removing an unregistered listener is an error.
    pub fn remove(&self, listener: &Listener) -> RegistryResult<()> {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|l| !l.same_callback(listener));
        if listeners.len() == before {
            return Err(RegistryError::NotRegistered);
        }
        Ok(())
    }

    /// Returns true if the listener is registered.
    pub fn has(&self, listener: &Listener) -> bool {
        self.listeners.lock().iter().any(|l| l.same_callback(listener))
    }

    /// The number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.lock().len()
    }

    /// Returns true if no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.lock().is_empty()
    }

    /// Dispatches `payload` to every registered listener.
    ///
    /// All listener futures are fired before any is awaited, so one failing
    /// listener does not prevent the others from settling. Returns the
    /// per-listener responses in registration order; an empty registry
    /// yields an empty set, not an error.
    pub async fn dispatch(&self, payload: &Value) -> RegistryResult<Vec<Option<Value>>> {
        let snapshot: Vec<Listener> = self.listeners.lock().clone();
        trace!(listeners = snapshot.len(), "dispatching on the same-context registry");

        let fired: Vec<_> = snapshot
            .iter()
            .map(|listener| listener.invoke(payload.clone()))
            .collect();
        collect_settled(future::join_all(fired).await)
    }
}

impl std::fmt::Debug for SameContextRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SameContextRegistry")
            .field("listeners", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::listener::ListenerError;

    #[tokio::test]
    async fn test_double_registration_is_rejected() {
        let registry = SameContextRegistry::new();
        let listener = Listener::new(|_| async { Ok(None) });

        registry.add(listener.clone()).unwrap();
        let err = registry.add(listener).unwrap_err();
        assert!(matches!(err, RegistryError::AlreadyRegistered));
    }

    #[tokio::test]
    async fn test_remove_twice_is_rejected() {
        let registry = SameContextRegistry::new();
        let listener = Listener::new(|_| async { Ok(None) });

        registry.add(listener.clone()).unwrap();
        registry.remove(&listener).unwrap();
        let err = registry.remove(&listener).unwrap_err();
        assert!(matches!(err, RegistryError::NotRegistered));
    }

    #[tokio::test]
    async fn test_dispatch_collects_every_response() {
        let registry = SameContextRegistry::new();
        registry
            .add(Listener::new(|_| async { Ok(Some(json!(1))) }))
            .unwrap();
        registry.add(Listener::new(|_| async { Ok(None) })).unwrap();
        registry
            .add(Listener::new(|_| async { Ok(Some(json!(3))) }))
            .unwrap();

        let responses = registry.dispatch(&json!({})).await.unwrap();
        assert_eq!(responses, vec![Some(json!(1)), None, Some(json!(3))]);
    }

    #[tokio::test]
    async fn test_one_failing_listener_does_not_stop_the_others() {
        let registry = SameContextRegistry::new();
        let invoked = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&invoked);
        registry
            .add(Listener::new(move |_| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(ListenerError::Failed("boom".to_owned()))
                }
            }))
            .unwrap();

        let counter = Arc::clone(&invoked);
        registry
            .add(Listener::new(move |_| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(None)
                }
            }))
            .unwrap();

        let err = registry.dispatch(&json!({})).await.unwrap_err();
        assert!(matches!(err, RegistryError::Listener(reason) if reason == "boom"));
        assert_eq!(invoked.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_dispatch_on_empty_registry_is_empty_not_an_error() {
        let registry = SameContextRegistry::new();
        let responses = registry.dispatch(&json!({})).await.unwrap();
        assert!(responses.is_empty());
    }
}
