//! Observable session state types.
//!
//! These are the pieces of session state a front-end may read back, such as
//! the confirmed [`Identity`] and the [`TranscriptLine`]s of the current room.

use std::fmt;

use crate::ValidationError;

/// User's display name, fixed for the lifetime of a connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity(String);

impl Identity {
    /// Trim caller input into an identity.
    ///
    /// # Errors
    ///
    /// - `ValidationError::EmptyIdentity` if nothing remains after trimming
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let name = input.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyIdentity);
        }
        Ok(Self(name.to_string()))
    }

    /// Display name as sent on the wire.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Session-level lifecycle, independent of the link state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No confirmed identity yet.
    #[default]
    Anonymous,
    /// Server acknowledged the identity.
    Identified,
    /// Link closed. Terminal.
    Ended,
}

/// One chat message as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    /// Sender's display name.
    pub author: String,
    /// Message text.
    pub text: String,
    /// Sent by this session's identity.
    pub is_self: bool,
    /// Server timestamp, verbatim.
    pub timestamp: Option<String>,
}

/// Entry in the current room's transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptLine {
    /// Server notice or synthesized membership line.
    System(String),
    /// Chat message.
    Chat(ChatLine),
}
