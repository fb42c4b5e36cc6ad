//! Protocol error types.

use thiserror::Error;

use crate::Schema;

/// Result alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors raised while encoding or decoding envelopes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Frame text is not JSON, or a known kind has the wrong shape.
    #[error("malformed frame: {0}")]
    Malformed(String),

    /// JSON object without a string discriminator field.
    #[error("frame has no `{field}` discriminator")]
    MissingKind {
        /// Discriminator field that was expected.
        field: &'static str,
    },

    /// Well-formed frame whose kind this schema does not know.
    #[error("unknown envelope kind `{kind}`")]
    UnknownKind {
        /// Kind as it appeared on the wire.
        kind: String,
    },

    /// Envelope cannot be expressed in the active schema.
    #[error("{kind} is not supported by the {schema} schema")]
    Unsupported {
        /// Envelope kind that was rejected.
        kind: &'static str,
        /// Schema in use.
        schema: Schema,
    },

    /// JSON serialization failed.
    #[error("encode failed: {0}")]
    Encode(String),
}

impl ProtocolError {
    /// Returns true if the frame parsed but its kind was not recognized.
    ///
    /// Unknown kinds are expected from newer servers and are logged louder
    /// than malformed frames, which indicate a broken peer.
    pub fn is_unknown_kind(&self) -> bool {
        matches!(self, Self::UnknownKind { .. })
    }
}

impl From<serde_json::Error> for ProtocolError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}
