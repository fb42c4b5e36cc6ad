//! Transport adapter errors.

use parlor_proto::ProtocolError;
use thiserror::Error;

use crate::ConnectionState;

/// Errors from lifecycle operations on the adapter or the socket beneath it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Invalid state transition attempted
    #[error("invalid state transition: cannot {operation} from {state:?}")]
    InvalidState {
        /// Current state when error occurred
        state: ConnectionState,
        /// Operation that was attempted
        operation: &'static str,
    },

    /// Connection could not be established.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Established connection failed mid-stream.
    #[error("stream error: {0}")]
    Stream(String),
}

/// Outbound envelope could not be handed to the wire.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    /// Link is not open.
    #[error("not connected (connection is {state:?})")]
    NotConnected {
        /// State at the time of the attempt
        state: ConnectionState,
    },

    /// Schema cannot express the envelope.
    #[error("cannot encode envelope: {0}")]
    Encode(#[from] ProtocolError),
}
