//! # Strait Core
//!
//! The core engine of the Strait cross-context message bus.
//!
//! Strait lets independent, isolated execution contexts — one long-lived
//! background context and any number of short-lived page contexts —
//! exchange requests, responses, and broadcasts over a transport that is
//! asynchronous, lossy, JSON-only, and may echo a context's own traffic
//! back at it.
//!
//! ## Architecture
//!
//! ```text
//! sender ──▶ SplitProvider ──┬──▶ SameContextRegistry ──▶ local listeners
//!                            │
//!                            └──▶ Transport ──▶ other contexts' forwarders
//!                                                   │
//!                                  local registry ◀─┘ (re-published)
//! ```
//!
//! - [`Envelope`] is the one wire format every pattern shares; inbound
//!   candidates are checked with [`Envelope::validate`], which never
//!   panics on foreign JSON.
//! - [`ContextId`] / [`ContextIdentity`] name one context instance; tags
//!   on payloads and listeners let the cross-context registry suppress a
//!   context's own echo.
//! - [`SameContextRegistry`] and [`CrossContextRegistry`] are the two
//!   listener sets; the cross-context variant prunes dead listeners
//!   through an injected [`LivenessProbe`].
//! - [`SplitProvider`] merges both channels behind the [`Provider`]
//!   surface and reduces their responses with the policies in [`reduce`].
//!
//! The pattern roles built on top (Bullhorn, Requester, Simplexer and
//! their receivers) live in `strait-patterns`; the reference in-process
//! transport lives in `strait-transport`.

pub mod context;
pub mod envelope;
pub mod error;
pub mod listener;
pub mod provider;
pub mod reduce;
pub mod registry;
pub mod split;
pub mod transport;

pub use context::{CONTEXT_KEY, ContextId, ContextIdentity, origin_of, tag_payload};
pub use envelope::{
    DONE_SENTINEL, Direction, ENVELOPE_IDENTIFIER, Envelope, ResponseMode, SequenceCounter, done,
    is_done,
};
pub use error::{
    BusError, BusResult, ContextError, RegistryError, RegistryResult, TransportError,
    TransportResult,
};
pub use listener::{Listener, ListenerError, ListenerReply};
pub use provider::{CrossContextProvider, Provider, SameContextProvider};
pub use registry::{AlwaysAlive, CrossContextRegistry, LivenessProbe, SameContextRegistry};
pub use split::SplitProvider;
pub use transport::{Transport, TransportHandleSource};

/// Prelude for common imports.
pub mod prelude {
    pub use super::context::{ContextId, ContextIdentity};
    pub use super::envelope::{Direction, Envelope, ResponseMode, SequenceCounter};
    pub use super::error::{BusError, BusResult};
    pub use super::listener::Listener;
    pub use super::provider::{CrossContextProvider, Provider, SameContextProvider};
    pub use super::split::SplitProvider;
    pub use super::transport::{Transport, TransportHandleSource};
}
