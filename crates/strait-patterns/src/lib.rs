//! # Strait Patterns
//!
//! Sender and receiver roles for the Strait cross-context message bus.
//!
//! Every role fixes one communication pattern over the shared envelope
//! format:
//!
//! | outbound | inbound | pattern |
//! |---|---|---|
//! | [`Bullhorn`] | [`Reactor`] | broadcast, no reply |
//! | [`Requester`] | [`Responder`] | request/response |
//! | [`Simplexer`] | [`Crowdee`] | trigger, acknowledged by many |
//!
//! Senders validate the class of reply they receive at the call boundary:
//! a broadcast that gets answered, a request that does not, or a trigger
//! acknowledged with anything but the sentinel all fail with a
//! [`ProtocolError`] instead of silently propagating a wrong-shaped reply.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use serde_json::json;
//! use strait_patterns::{Requester, Responder};
//!
//! let responder = Responder::new(
//!     Arc::clone(&provider),
//!     ["service:voices:getEffectiveRateForVoice"],
//!     |_action, datum| async move { Ok(json!(1.25)) },
//! );
//! responder.register().await?;
//!
//! let requester = Requester::new(provider);
//! let rate = requester
//!     .bespeak("service:voices:getEffectiveRateForVoice", Some(json!({ "voice": "alto" })))
//!     .await?;
//! ```

pub mod error;
pub mod generation;
pub mod receiver;
pub mod sender;

pub use error::{HandlerError, ProtocolError, ProtocolResult};
pub use generation::{Generation, GenerationClock};
pub use receiver::{Crowdee, Reactor, Responder};
pub use sender::{Bullhorn, Requester, Simplexer};

/// Prelude for common imports.
pub mod prelude {
    pub use super::error::{HandlerError, ProtocolError, ProtocolResult};
    pub use super::generation::{Generation, GenerationClock};
    pub use super::receiver::{Crowdee, Reactor, Responder};
    pub use super::sender::{Bullhorn, Requester, Simplexer};
}
