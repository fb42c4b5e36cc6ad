//! Terse schema: `{"type": "...", ...}` with short English field names.
//!
//! Terse servers create rooms on join, never confirm a join explicitly, and
//! announce occupants through `user_list`. Room creation therefore encodes as
//! a plain `join`.

use serde::{Deserialize, Serialize};

use crate::{Inbound, Outbound, ProtocolError, RoomInfo, Schema};

pub(crate) const KIND_FIELD: &str = "type";

pub(crate) const COMMAND_KINDS: &[&str] = &["connect", "join", "message", "list_rooms", "leave"];

pub(crate) const EVENT_KINDS: &[&str] =
    &["connected", "rooms", "notice", "message", "user_list", "error"];

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum Command {
    Connect { username: String },
    Join { room: String },
    Message { message: String },
    ListRooms,
    Leave,
}

impl Command {
    pub(crate) fn from_outbound(command: &Outbound) -> Result<Self, ProtocolError> {
        Ok(match command {
            Outbound::Connect { name } => Self::Connect { username: name.clone() },
            Outbound::JoinRoom { room } | Outbound::CreateRoom { room } => {
                Self::Join { room: room.clone() }
            },
            Outbound::SendMessage { text } => Self::Message { message: text.clone() },
            Outbound::ListRooms => Self::ListRooms,
            Outbound::LeaveRoom => Self::Leave,
        })
    }

    pub(crate) fn into_outbound(self) -> Outbound {
        match self {
            Self::Connect { username } => Outbound::Connect { name: username },
            Self::Join { room } => Outbound::JoinRoom { room },
            Self::Message { message } => Outbound::SendMessage { text: message },
            Self::ListRooms => Outbound::ListRooms,
            Self::Leave => Outbound::LeaveRoom,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct User {
    name: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum Event {
    Connected {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Rooms {
        rooms: Vec<String>,
    },
    Notice {
        message: String,
    },
    Message {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        room: Option<String>,
        sender: String,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<String>,
    },
    UserList {
        room: String,
        users: Vec<User>,
    },
    Error {
        message: String,
    },
}

impl Event {
    pub(crate) fn into_inbound(self) -> Inbound {
        match self {
            Self::Connected { message } => Inbound::Connected { greeting: message },
            Self::Rooms { rooms } => {
                Inbound::Rooms { rooms: rooms.into_iter().map(RoomInfo::named).collect() }
            },
            Self::Notice { message } => Inbound::Notice { text: message },
            Self::Message { room, sender, message, timestamp } => {
                Inbound::Message { room, sender, text: message, timestamp }
            },
            Self::UserList { room, users } => {
                Inbound::Occupants { room, names: users.into_iter().map(|u| u.name).collect() }
            },
            Self::Error { message } => Inbound::Error { message },
        }
    }

    pub(crate) fn from_inbound(event: &Inbound) -> Result<Self, ProtocolError> {
        Ok(match event {
            Inbound::Connected { greeting } => Self::Connected { message: greeting.clone() },
            Inbound::Rooms { rooms } => {
                Self::Rooms { rooms: rooms.iter().map(|r| r.name.clone()).collect() }
            },
            Inbound::Notice { text } => Self::Notice { message: text.clone() },
            Inbound::Message { room, sender, text, timestamp } => Self::Message {
                room: room.clone(),
                sender: sender.clone(),
                message: text.clone(),
                timestamp: timestamp.clone(),
            },
            Inbound::Occupants { room, names } => Self::UserList {
                room: room.clone(),
                users: names.iter().map(|name| User { name: name.clone() }).collect(),
            },
            Inbound::Error { message } => Self::Error { message: message.clone() },
            Inbound::RoomJoined { .. } | Inbound::UserJoined { .. } | Inbound::UserLeft { .. } => {
                return Err(ProtocolError::Unsupported { kind: event.kind(), schema: Schema::Terse });
            },
        })
    }
}
