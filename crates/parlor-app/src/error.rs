//! Intent validation errors.
//!
//! Every variant is recovered locally: the intent is dropped, and only a
//! missing display name is surfaced to the user.

use thiserror::Error;

/// Why a caller intent produced no outbound command.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Display name is empty or whitespace.
    #[error("a display name is required")]
    EmptyIdentity,

    /// Room name is empty or whitespace.
    #[error("room name is empty")]
    EmptyRoomName,

    /// Message text is empty or whitespace.
    #[error("message is empty")]
    EmptyMessage,

    /// Operation needs a joined room.
    #[error("not in a room")]
    NoActiveRoom,

    /// A connect is already pending or done.
    #[error("already connecting or connected")]
    AlreadyConnecting,

    /// The link closed; a new session is required.
    #[error("session has ended")]
    SessionEnded,
}
