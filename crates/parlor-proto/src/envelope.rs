//! Schema-independent envelope model.
//!
//! Both wire vocabularies decode into and encode from these types, so the
//! session layer never sees a field name. Kind names differ per schema; the
//! semantics below do not.

/// Command sent from the client to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Announce the user's display name.
    Connect {
        /// Trimmed, non-empty display name.
        name: String,
    },

    /// Join an existing room (terse servers create it on demand).
    JoinRoom {
        /// Room to join.
        room: String,
    },

    /// Create a room and join it.
    CreateRoom {
        /// Room to create.
        room: String,
    },

    /// Post a chat message to the current room.
    SendMessage {
        /// Message body.
        text: String,
    },

    /// Ask for the current room directory.
    ListRooms,

    /// Leave the current room.
    LeaveRoom,
}

impl Outbound {
    /// Short kind label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connect { .. } => "connect",
            Self::JoinRoom { .. } => "join_room",
            Self::CreateRoom { .. } => "create_room",
            Self::SendMessage { .. } => "send_message",
            Self::ListRooms => "list_rooms",
            Self::LeaveRoom => "leave_room",
        }
    }
}

/// Event sent from the server to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// Identity accepted.
    Connected {
        /// Greeting text, if the server sent one.
        greeting: Option<String>,
    },

    /// Full snapshot of the room directory.
    Rooms {
        /// Rooms in server order.
        rooms: Vec<RoomInfo>,
    },

    /// Join (or create) confirmed.
    RoomJoined {
        /// Room the server placed us in.
        room: String,
        /// Occupants at join time, when provided.
        occupants: Option<Vec<String>>,
    },

    /// Chat message broadcast to a room.
    Message {
        /// Room tag. `None` when the schema does not carry one.
        room: Option<String>,
        /// Sender's display name.
        sender: String,
        /// Message body.
        text: String,
        /// Server timestamp, when provided.
        timestamp: Option<String>,
    },

    /// Free-form server notice.
    Notice {
        /// Notice text, shown verbatim.
        text: String,
    },

    /// Another user entered the room.
    UserJoined {
        /// User who joined.
        name: String,
        /// Room tag. `None` when the schema does not carry one.
        room: Option<String>,
        /// Updated occupant list, when provided.
        occupants: Option<Vec<String>>,
    },

    /// Another user left the room.
    UserLeft {
        /// User who left.
        name: String,
        /// Room tag. `None` when the schema does not carry one.
        room: Option<String>,
        /// Updated occupant list, when provided.
        occupants: Option<Vec<String>>,
    },

    /// Occupant list of a room.
    Occupants {
        /// Room the list belongs to.
        room: String,
        /// Occupant display names.
        names: Vec<String>,
    },

    /// Server-side error for the last command.
    Error {
        /// Human-readable reason.
        message: String,
    },
}

impl Inbound {
    /// Short kind label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "connected",
            Self::Rooms { .. } => "rooms",
            Self::RoomJoined { .. } => "room_joined",
            Self::Message { .. } => "message",
            Self::Notice { .. } => "notice",
            Self::UserJoined { .. } => "user_joined",
            Self::UserLeft { .. } => "user_left",
            Self::Occupants { .. } => "occupants",
            Self::Error { .. } => "error",
        }
    }
}

/// One entry of the room directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    /// Room name.
    pub name: String,
    /// Number of occupants. `None` if the schema only lists names.
    pub occupants: Option<u32>,
    /// Creation timestamp. `None` if the schema does not report it.
    pub created_at: Option<String>,
}

impl RoomInfo {
    /// Directory entry with only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), occupants: None, created_at: None }
    }
}
