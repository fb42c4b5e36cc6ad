//! Session input events.
//!
//! [`SessionEvent`] is what the transport layer reports to the
//! [`crate::Session`] state machine, one variant per [`Delivery`].

use parlor_client::Delivery;
use parlor_proto::{Inbound, ProtocolError};

/// Transport notifications processed by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Link is open.
    LinkOpened,

    /// Server envelope arrived.
    Received(Inbound),

    /// Inbound frame could not be decoded.
    Rejected(ProtocolError),

    /// Socket error.
    LinkFailed {
        /// Human-readable cause.
        cause: String,
    },

    /// Link closed.
    LinkClosed {
        /// Close reason, if any.
        reason: Option<String>,
    },
}

impl From<Delivery> for SessionEvent {
    fn from(delivery: Delivery) -> Self {
        match delivery {
            Delivery::Opened => Self::LinkOpened,
            Delivery::Envelope(envelope) => Self::Received(envelope),
            Delivery::Rejected(error) => Self::Rejected(error),
            Delivery::Failed { cause } => Self::LinkFailed { cause },
            Delivery::Closed { reason } => Self::LinkClosed { reason },
        }
    }
}
