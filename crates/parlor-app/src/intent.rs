//! Caller intents.

/// Something the user asked for.
///
/// Free-form text is passed through untouched; trimming and validation happen
/// in [`crate::Session`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Connect with a display name.
    Connect {
        /// Raw display name.
        name: String,
    },

    /// Join an existing room.
    JoinRoom {
        /// Raw room name.
        room: String,
    },

    /// Create a room and join it.
    CreateRoom {
        /// Raw room name.
        room: String,
    },

    /// Send a chat message to the current room.
    SendMessage {
        /// Raw message text.
        text: String,
    },

    /// Refresh the room directory.
    ListRooms,

    /// Leave the current room.
    LeaveRoom,

    /// Stop the client.
    Quit,
}
