//! # Strait
//!
//! A typed, multi-pattern message bus for isolated execution contexts.
//!
//! ## Overview
//!
//! Strait lets independent execution contexts — one long-lived background
//! context and any number of short-lived, repeatedly created and destroyed
//! page contexts — exchange requests, responses, and broadcasts over a
//! transport that is asynchronous, lossy, JSON-only, and may echo a
//! context's own traffic back at it.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌───────────────┐   ┌──────────────────────────────┐
//! │  Sender   │──▶│ SplitProvider │──▶│ same-context registry        │──▶ local receivers
//! │ (pattern) │   │  (tag+merge)  │──▶│ cross-context transport      │──▶ other contexts
//! └───────────┘   └───────────────┘   └──────────────────────────────┘
//! ```
//!
//! - **Envelope**: the one wire format every pattern shares
//! - **Senders**: `Bullhorn` (broadcast), `Requester` (request/response),
//!   `Simplexer` (acknowledged trigger)
//! - **Receivers**: `Reactor`, `Responder`, `Crowdee`
//! - **Split provider**: merges the local and cross-context channels into
//!   one logical bus, with echo suppression and response reduction
//! - **Runtime**: identity, configuration, logging, and lifecycle wiring
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use strait::prelude::*;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let hub = InProcessHub::new();
//!
//!     let background = ContextRuntime::join_hub(&hub, ContextId::named("background")).await?;
//!     let responder = Responder::new(
//!         background.bus() as _,
//!         ["service:voices:getEffectiveRateForVoice"],
//!         |_action, _datum| async move { Ok(json!(1.25)) },
//!     );
//!     responder.register().await?;
//!
//!     let popup = ContextRuntime::join_hub(&hub, ContextId::ephemeral("popup")).await?;
//!     let rate = Requester::new(popup.bus())
//!         .bespeak("service:voices:getEffectiveRateForVoice", None)
//!         .await?;
//!
//!     popup.shutdown().await?;
//!     background.shutdown().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config` *(default)*: TOML configuration files
//! - `json-log`: JSON log output

pub use strait_core as core;
pub use strait_patterns as patterns;
pub use strait_runtime as runtime;
pub use strait_transport as transport;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use strait::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use strait_runtime::{ConfigLoader, ContextRuntime, LoggingBuilder};

    // In-process transport
    pub use strait_transport::{HubHandleSource, InProcessHub};

    // Sender and receiver roles
    pub use strait_patterns::{
        Bullhorn, Crowdee, Generation, GenerationClock, HandlerError, ProtocolError, Reactor,
        Requester, Responder, Simplexer,
    };

    // Core types for custom wiring and transports
    pub use strait_core::{
        BusError, ContextId, ContextIdentity, Direction, Envelope, Listener, Provider,
        ResponseMode, SplitProvider, Transport, TransportHandleSource,
    };
}
