//! Pattern-level error types.
//!
//! A sender validates the *class* of response it received, not just its
//! correlation — a receiver returning the wrong kind of reply for the
//! pattern it was registered under is caught at the call boundary instead
//! of silently propagating.

use thiserror::Error;

use strait_core::BusError;

/// A failure inside a user-supplied handler.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct HandlerError(pub String);

impl HandlerError {
    /// Wraps any displayable error.
    pub fn new(reason: impl std::fmt::Display) -> Self {
        Self(reason.to_string())
    }
}

/// Errors raised by sender and receiver roles.
#[derive(Debug, Clone, Error)]
pub enum ProtocolError {
    /// A broadcast received a reply; broadcasts disallow replies.
    #[error("broadcast for action '{action}' unexpectedly received a reply")]
    UnexpectedReply {
        /// The action that was broadcast.
        action: String,
    },

    /// A request received no reply; requests require one.
    #[error("request for action '{action}' received no reply")]
    MissingReply {
        /// The action that was requested.
        action: String,
    },

    /// A trigger's reply was not the acknowledgment sentinel.
    #[error("trigger for action '{action}' was not acknowledged")]
    NotAcknowledged {
        /// The action that was triggered.
        action: String,
    },

    /// A reply failed envelope validation for the expected direction and
    /// sequence number.
    #[error("malformed reply envelope for action '{action}'")]
    MalformedReply {
        /// The action whose reply was malformed.
        action: String,
    },

    /// The underlying bus failed.
    #[error(transparent)]
    Bus(#[from] BusError),
}

/// Result type for pattern operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;
