//! Transport events, actions and deliveries.

use parlor_proto::{Inbound, ProtocolError};

/// I/O events the caller feeds into the adapter.
///
/// Produced by whatever owns the socket: the WebSocket task in production,
/// the simulated server in tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Handshake completed; the link is usable.
    Opened,

    /// One text frame arrived.
    Text(String),

    /// The socket reported an error. A `Closed` normally follows.
    Failed {
        /// Human-readable cause
        cause: String,
    },

    /// The link is gone, with or without a prior `Opened`.
    Closed {
        /// Close reason, if the peer sent one
        reason: Option<String>,
    },
}

/// Actions the adapter asks the caller to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportAction {
    /// Start connecting to this address.
    Dial {
        /// Server address (URL)
        address: String,
    },

    /// Write this text frame to the socket.
    Transmit(String),
}

/// What the adapter hands to the layer above after processing an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Link became open.
    Opened,

    /// A frame decoded into an envelope.
    Envelope(Inbound),

    /// A frame could not be decoded.
    Rejected(ProtocolError),

    /// The socket reported an error.
    Failed {
        /// Human-readable cause
        cause: String,
    },

    /// The link is closed for good.
    Closed {
        /// Close reason, if any
        reason: Option<String>,
    },
}
