//! Unified error types for the Strait core crate.
//!
//! Errors are grouped by the layer they originate from and are always
//! recognized by variant, never by message text. Pattern-level errors
//! (wrong reply shape for a sender role) live in `strait-patterns`.

use thiserror::Error;

use crate::context::ContextId;

// =============================================================================
// Context Tagging Errors
// =============================================================================

/// Errors raised by context tagging of payloads and listeners.
#[derive(Debug, Clone, Error)]
pub enum ContextError {
    /// The outgoing payload already carries a context tag.
    #[error("payload is already tagged with context '{0}'")]
    PayloadAlreadyTagged(ContextId),

    /// The payload is not a JSON object and cannot carry a context tag.
    #[error("payload is not a JSON object and cannot be tagged")]
    PayloadNotTaggable,

    /// The listener already carries a context tag.
    #[error("listener is already tagged with context '{0}'")]
    ListenerAlreadyTagged(ContextId),

    /// A context tag was required but absent.
    #[error("expected a context tag, found none")]
    NotTagged,
}

// =============================================================================
// Registry Errors
// =============================================================================

/// Errors raised by listener registries.
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    /// The listener is already present in this registry.
    #[error("listener is already registered")]
    AlreadyRegistered,

    /// The listener is not present in this registry.
    #[error("listener is not registered")]
    NotRegistered,

    /// No listener was eligible to receive the dispatched payload.
    #[error("no listeners were eligible for dispatch")]
    NoListeners,

    /// A listener failed while handling a dispatched payload.
    #[error("listener failed: {0}")]
    Listener(String),
}

// =============================================================================
// Transport Errors
// =============================================================================

/// Errors raised by cross-context transport implementations.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// No listener is registered on the cross-context channel.
    ///
    /// An expected steady-state condition: with multi-context fan-out, not
    /// every context has a receiver for every action.
    #[error("no listeners registered on the cross-context channel")]
    NoListeners,

    /// The referenced context has been destroyed.
    #[error("context '{0}' is gone")]
    ContextGone(ContextId),

    /// The transport handle could not be acquired.
    #[error("transport unavailable: {0}")]
    Unavailable(String),

    /// Registry failure inside the transport's fan-out table.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

// =============================================================================
// Bus Errors
// =============================================================================

/// Top-level error type for message bus providers.
#[derive(Debug, Clone, Error)]
pub enum BusError {
    /// The split provider's forwarding listener is already registered.
    #[error("message bus is already started")]
    AlreadyStarted,

    /// The split provider's forwarding listener is not registered.
    #[error("message bus is not started")]
    NotStarted,

    /// Context tagging failure.
    #[error(transparent)]
    Context(#[from] ContextError),

    /// Registry failure.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Transport failure.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Result type for message bus operations.
pub type BusResult<T> = Result<T, BusError>;
