//! # Strait Transport
//!
//! The reference cross-context transport for the Strait message bus.
//!
//! The bus's transport seam is defined in `strait-core` ([`Transport`] /
//! [`TransportHandleSource`]); this crate implements it for contexts that
//! share one process: an [`InProcessHub`] holds the fan-out table, and
//! each member context publishes and listens through its own
//! [`HubTransport`] handle.
//!
//! Host platforms with genuinely isolated contexts supply their own
//! implementations of the same seam.
//!
//! [`Transport`]: strait_core::Transport
//! [`TransportHandleSource`]: strait_core::TransportHandleSource

mod hub;

pub use hub::{HubHandleSource, HubTransport, InProcessHub};
