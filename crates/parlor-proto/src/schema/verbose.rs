//! Verbose schema: `{"tipo": "...", ...}` with Spanish field names.
//!
//! Verbose servers confirm joins with `sala_unida`, report occupancy counts in
//! the directory, and do not tag chat messages with a room. There is no leave
//! command and no free-form notice.

use serde::{Deserialize, Serialize};

use crate::{Inbound, Outbound, ProtocolError, RoomInfo, Schema};

pub(crate) const KIND_FIELD: &str = "tipo";

pub(crate) const COMMAND_KINDS: &[&str] =
    &["conectar", "crear_sala", "unirse_sala", "mensaje", "obtener_salas"];

pub(crate) const EVENT_KINDS: &[&str] = &[
    "conectado",
    "salas_disponibles",
    "sala_unida",
    "mensaje",
    "usuario_entro",
    "usuario_salio",
    "error",
];

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "tipo")]
pub(crate) enum Command {
    #[serde(rename = "conectar")]
    Connect {
        #[serde(rename = "nombre")]
        name: String,
    },
    #[serde(rename = "crear_sala")]
    CreateRoom {
        #[serde(rename = "nombre_sala")]
        room: String,
    },
    #[serde(rename = "unirse_sala")]
    JoinRoom {
        #[serde(rename = "nombre_sala")]
        room: String,
    },
    #[serde(rename = "mensaje")]
    Message {
        #[serde(rename = "contenido")]
        text: String,
    },
    #[serde(rename = "obtener_salas")]
    ListRooms,
}

impl Command {
    pub(crate) fn from_outbound(command: &Outbound) -> Result<Self, ProtocolError> {
        Ok(match command {
            Outbound::Connect { name } => Self::Connect { name: name.clone() },
            Outbound::JoinRoom { room } => Self::JoinRoom { room: room.clone() },
            Outbound::CreateRoom { room } => Self::CreateRoom { room: room.clone() },
            Outbound::SendMessage { text } => Self::Message { text: text.clone() },
            Outbound::ListRooms => Self::ListRooms,
            Outbound::LeaveRoom => {
                return Err(ProtocolError::Unsupported {
                    kind: command.kind(),
                    schema: Schema::Verbose,
                });
            },
        })
    }

    pub(crate) fn into_outbound(self) -> Outbound {
        match self {
            Self::Connect { name } => Outbound::Connect { name },
            Self::CreateRoom { room } => Outbound::CreateRoom { room },
            Self::JoinRoom { room } => Outbound::JoinRoom { room },
            Self::Message { text } => Outbound::SendMessage { text },
            Self::ListRooms => Outbound::ListRooms,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct RoomEntry {
    #[serde(rename = "nombre")]
    name: String,
    #[serde(rename = "usuarios", default)]
    occupants: u32,
    #[serde(rename = "creada_en", default, skip_serializing_if = "Option::is_none")]
    created_at: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "tipo")]
pub(crate) enum Event {
    #[serde(rename = "conectado")]
    Connected {
        #[serde(rename = "mensaje", default, skip_serializing_if = "Option::is_none")]
        greeting: Option<String>,
    },
    #[serde(rename = "salas_disponibles")]
    Rooms {
        #[serde(rename = "salas")]
        rooms: Vec<RoomEntry>,
    },
    #[serde(rename = "sala_unida")]
    RoomJoined {
        #[serde(rename = "sala")]
        room: String,
        #[serde(rename = "usuarios", default)]
        occupants: Vec<String>,
    },
    #[serde(rename = "mensaje")]
    Message {
        #[serde(rename = "nombre")]
        sender: String,
        #[serde(rename = "contenido")]
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<String>,
        #[serde(rename = "sala", default, skip_serializing_if = "Option::is_none")]
        room: Option<String>,
    },
    #[serde(rename = "usuario_entro")]
    UserJoined {
        #[serde(rename = "nombre")]
        name: String,
        #[serde(rename = "usuarios", default, skip_serializing_if = "Option::is_none")]
        occupants: Option<Vec<String>>,
    },
    #[serde(rename = "usuario_salio")]
    UserLeft {
        #[serde(rename = "nombre")]
        name: String,
    },
    #[serde(rename = "error")]
    Error {
        #[serde(rename = "mensaje")]
        message: String,
    },
}

impl Event {
    pub(crate) fn into_inbound(self) -> Inbound {
        match self {
            Self::Connected { greeting } => Inbound::Connected { greeting },
            Self::Rooms { rooms } => Inbound::Rooms {
                rooms: rooms
                    .into_iter()
                    .map(|entry| RoomInfo {
                        name: entry.name,
                        occupants: Some(entry.occupants),
                        created_at: entry.created_at,
                    })
                    .collect(),
            },
            Self::RoomJoined { room, occupants } => {
                Inbound::RoomJoined { room, occupants: Some(occupants) }
            },
            Self::Message { sender, text, timestamp, room } => {
                Inbound::Message { room, sender, text, timestamp }
            },
            Self::UserJoined { name, occupants } => {
                Inbound::UserJoined { name, room: None, occupants }
            },
            Self::UserLeft { name } => Inbound::UserLeft { name, room: None, occupants: None },
            Self::Error { message } => Inbound::Error { message },
        }
    }

    pub(crate) fn from_inbound(event: &Inbound) -> Result<Self, ProtocolError> {
        Ok(match event {
            Inbound::Connected { greeting } => Self::Connected { greeting: greeting.clone() },
            Inbound::Rooms { rooms } => Self::Rooms {
                rooms: rooms
                    .iter()
                    .map(|info| RoomEntry {
                        name: info.name.clone(),
                        occupants: info.occupants.unwrap_or(0),
                        created_at: info.created_at.clone(),
                    })
                    .collect(),
            },
            Inbound::RoomJoined { room, occupants } => Self::RoomJoined {
                room: room.clone(),
                occupants: occupants.clone().unwrap_or_default(),
            },
            Inbound::Message { room, sender, text, timestamp } => Self::Message {
                sender: sender.clone(),
                text: text.clone(),
                timestamp: timestamp.clone(),
                room: room.clone(),
            },
            Inbound::UserJoined { name, occupants, .. } => {
                Self::UserJoined { name: name.clone(), occupants: occupants.clone() }
            },
            Inbound::UserLeft { name, .. } => Self::UserLeft { name: name.clone() },
            Inbound::Error { message } => Self::Error { message: message.clone() },
            Inbound::Notice { .. } | Inbound::Occupants { .. } => {
                return Err(ProtocolError::Unsupported {
                    kind: event.kind(),
                    schema: Schema::Verbose,
                });
            },
        })
    }
}
