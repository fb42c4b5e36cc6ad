//! In-process chat server for simulation.
//!
//! `SimServer` implements the server side of both wire schemas over text
//! frames. It has no sockets: a driver registers a client with
//! [`SimServer::connect`], hands it command frames with
//! [`SimServer::receive`], and drains the frames addressed to it with
//! [`SimServer::take_outbox`]. Every connection is processed on the caller's
//! thread, so interleavings are fully determined by the test.
//!
//! Timestamps come from a logical clock that advances one second per stamp,
//! which keeps transcripts reproducible.

use std::{
    collections::{BTreeMap, VecDeque},
    fmt,
    sync::{Arc, Mutex},
};

use parlor_proto::{Inbound, Outbound, RoomInfo, Schema};

/// Server-side handle of one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClientId(u64);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client-{}", self.0)
    }
}

/// Server shared between the drivers of several simulated clients.
pub type SharedSimServer = Arc<Mutex<SimServer>>;

/// Create a [`SharedSimServer`] speaking `schema`.
pub fn create_shared_server(schema: Schema) -> SharedSimServer {
    Arc::new(Mutex::new(SimServer::new(schema)))
}

/// Room used by terse servers when the requested name sanitizes to nothing.
const FALLBACK_ROOM: &str = "general";

/// Logical clock origin, seconds after midnight (12:00:00).
const CLOCK_ORIGIN: u64 = 12 * 3600;

#[derive(Debug, Default)]
struct Connection {
    name: Option<String>,
    room: Option<String>,
    outbox: VecDeque<String>,
}

#[derive(Debug)]
struct Room {
    name: String,
    members: Vec<ClientId>,
    created_at: String,
}

/// Simulated chat server.
#[derive(Debug)]
pub struct SimServer {
    schema: Schema,
    connections: BTreeMap<ClientId, Connection>,
    /// Rooms in creation order.
    rooms: Vec<Room>,
    next_id: u64,
    clock: u64,
}

impl SimServer {
    /// Create an empty server speaking `schema`.
    pub fn new(schema: Schema) -> Self {
        Self { schema, connections: BTreeMap::new(), rooms: Vec::new(), next_id: 1, clock: 0 }
    }

    /// Wire schema of this server.
    pub fn schema(&self) -> Schema {
        self.schema
    }

    /// Accept a new connection.
    pub fn connect(&mut self) -> ClientId {
        let id = ClientId(self.next_id);
        self.next_id += 1;
        self.connections.insert(id, Connection::default());
        tracing::debug!(%id, "connection accepted");
        id
    }

    /// Drop a connection, notifying the room it was in.
    pub fn disconnect(&mut self, id: ClientId) {
        let Some(connection) = self.connections.remove(&id) else {
            return;
        };
        tracing::debug!(%id, name = connection.name.as_deref(), "connection closed");

        let (Some(name), Some(room)) = (connection.name, connection.room) else {
            return;
        };
        self.remove_member(&room, id);

        match self.schema {
            Schema::Terse => {
                self.broadcast_room(&room, &Inbound::Notice { text: format!("{name} se desconectó.") });
                self.broadcast_occupants(&room);
            },
            Schema::Verbose => {
                self.broadcast_room(&room, &Inbound::UserLeft { name, room: None, occupants: None });
                self.drop_if_empty(&room);
                self.broadcast_directory();
            },
        }
    }

    /// Whether `id` is still connected.
    pub fn is_connected(&self, id: ClientId) -> bool {
        self.connections.contains_key(&id)
    }

    /// Process one frame sent by `id`.
    pub fn receive(&mut self, id: ClientId, text: &str) {
        if !self.connections.contains_key(&id) {
            tracing::warn!(%id, "frame from unknown connection");
            return;
        }

        let command = match self.schema.decode_command(text) {
            Ok(command) => command,
            Err(error) => {
                tracing::debug!(%id, %error, "undecodable command");
                if self.schema == Schema::Terse {
                    let message = if error.is_unknown_kind() { "Tipo desconocido" } else { "JSON inválido" };
                    self.reply(id, &Inbound::Error { message: message.to_string() });
                }
                return;
            },
        };

        match self.schema {
            Schema::Terse => self.terse(id, command),
            Schema::Verbose => self.verbose(id, command),
        }
    }

    /// Drain the frames addressed to `id`, oldest first.
    pub fn take_outbox(&mut self, id: ClientId) -> Vec<String> {
        self.connections.get_mut(&id).map(|c| c.outbox.drain(..).collect()).unwrap_or_default()
    }

    /// Room names in creation order.
    pub fn room_names(&self) -> Vec<&str> {
        self.rooms.iter().map(|room| room.name.as_str()).collect()
    }

    /// Display names of the members of `room`, in join order.
    pub fn members(&self, room: &str) -> Vec<String> {
        self.find_room(room).map(|r| self.names_of(&r.members)).unwrap_or_default()
    }

    fn terse(&mut self, id: ClientId, command: Outbound) {
        if let Outbound::Connect { name } = &command {
            let name = sanitize_name(name);
            if name.is_empty() {
                self.reply(id, &Inbound::Error { message: "Nombre vacío".into() });
                return;
            }
            self.set_name(id, &name);
            self.reply(id, &Inbound::Connected { greeting: Some(format!("Bienvenido, {name}")) });
            return;
        }

        if matches!(command, Outbound::ListRooms) {
            let rooms = self.rooms.iter().map(|room| RoomInfo::named(room.name.clone())).collect();
            self.reply(id, &Inbound::Rooms { rooms });
            return;
        }

        let Some(name) = self.name_of(id) else {
            self.reply(id, &Inbound::Error { message: "No conectado".into() });
            return;
        };

        match command {
            Outbound::JoinRoom { room } | Outbound::CreateRoom { room } => {
                let mut room = sanitize_name(&room);
                if room.is_empty() {
                    room = FALLBACK_ROOM.to_string();
                }

                if let Some(previous) = self.room_of(id) {
                    self.remove_member(&previous, id);
                    self.broadcast_room(&previous, &Inbound::Notice {
                        text: format!("{name} salió de la sala."),
                    });
                    self.broadcast_occupants(&previous);
                }

                self.add_member(&room, id);
                self.broadcast_room(&room, &Inbound::Notice { text: format!("{name} se unió a la sala.") });
                self.broadcast_occupants(&room);
            },
            Outbound::SendMessage { text } => {
                let Some(room) = self.room_of(id) else {
                    self.reply(id, &Inbound::Error { message: "No está en ninguna sala".into() });
                    return;
                };
                let text = text.trim();
                if text.is_empty() {
                    return;
                }
                let timestamp = self.stamp();
                self.broadcast_room(&room, &Inbound::Message {
                    room: Some(room.clone()),
                    sender: name,
                    text: text.to_string(),
                    timestamp: Some(timestamp),
                });
            },
            Outbound::LeaveRoom => {
                if let Some(room) = self.room_of(id) {
                    self.remove_member(&room, id);
                    self.broadcast_room(&room, &Inbound::Notice { text: format!("{name} salió de la sala.") });
                    self.broadcast_occupants(&room);
                }
            },
            Outbound::Connect { .. } | Outbound::ListRooms => {},
        }
    }

    fn verbose(&mut self, id: ClientId, command: Outbound) {
        if let Outbound::Connect { name } = &command {
            let name = name.trim().to_string();
            self.set_name(id, &name);
            self.reply(id, &Inbound::Connected { greeting: Some(format!("Bienvenido {name}!")) });
            let directory = self.directory();
            self.reply(id, &directory);
            return;
        }

        if matches!(command, Outbound::ListRooms) {
            let directory = self.directory();
            self.reply(id, &directory);
            return;
        }

        let Some(name) = self.name_of(id) else {
            self.reply(id, &Inbound::Error { message: "No conectado".into() });
            return;
        };

        match command {
            Outbound::CreateRoom { room } => {
                if self.find_room(&room).is_some() {
                    self.reply(id, &Inbound::Error { message: "La sala ya existe".into() });
                    return;
                }
                self.leave_verbose(id, &name);
                self.add_member(&room, id);
                self.reply(id, &Inbound::RoomJoined { room, occupants: Some(vec![name]) });
                self.broadcast_directory();
            },
            Outbound::JoinRoom { room } => {
                self.leave_verbose(id, &name);
                self.add_member(&room, id);
                let occupants = self.members(&room);
                self.reply(id, &Inbound::RoomJoined {
                    room: room.clone(),
                    occupants: Some(occupants.clone()),
                });
                self.broadcast_room(&room, &Inbound::UserJoined {
                    name,
                    room: None,
                    occupants: Some(occupants),
                });
                self.broadcast_directory();
            },
            Outbound::SendMessage { text } => {
                let Some(room) = self.room_of(id) else {
                    tracing::debug!(%id, "message outside any room");
                    return;
                };
                let timestamp = self.stamp();
                self.broadcast_room(&room, &Inbound::Message {
                    room: None,
                    sender: name,
                    text,
                    timestamp: Some(timestamp),
                });
            },
            Outbound::Connect { .. } | Outbound::ListRooms | Outbound::LeaveRoom => {},
        }
    }

    /// Verbose servers announce the departure and drop the room once empty.
    fn leave_verbose(&mut self, id: ClientId, name: &str) {
        let Some(previous) = self.room_of(id) else {
            return;
        };
        self.broadcast_room(&previous, &Inbound::UserLeft {
            name: name.to_string(),
            room: None,
            occupants: None,
        });
        self.remove_member(&previous, id);
        self.drop_if_empty(&previous);
    }

    fn set_name(&mut self, id: ClientId, name: &str) {
        if let Some(connection) = self.connections.get_mut(&id) {
            connection.name = Some(name.to_string());
        }
    }

    fn name_of(&self, id: ClientId) -> Option<String> {
        self.connections.get(&id).and_then(|c| c.name.clone())
    }

    fn room_of(&self, id: ClientId) -> Option<String> {
        self.connections.get(&id).and_then(|c| c.room.clone())
    }

    fn find_room(&self, name: &str) -> Option<&Room> {
        self.rooms.iter().find(|room| room.name == name)
    }

    fn names_of(&self, members: &[ClientId]) -> Vec<String> {
        members.iter().filter_map(|id| self.name_of(*id)).collect()
    }

    fn add_member(&mut self, room: &str, id: ClientId) {
        if self.find_room(room).is_none() {
            let created_at = self.iso_stamp();
            self.rooms.push(Room { name: room.to_string(), members: Vec::new(), created_at });
        }
        if let Some(record) = self.rooms.iter_mut().find(|r| r.name == room)
            && !record.members.contains(&id)
        {
            record.members.push(id);
        }
        if let Some(connection) = self.connections.get_mut(&id) {
            connection.room = Some(room.to_string());
        }
    }

    fn remove_member(&mut self, room: &str, id: ClientId) {
        if let Some(record) = self.rooms.iter_mut().find(|r| r.name == room) {
            record.members.retain(|member| *member != id);
        }
        if let Some(connection) = self.connections.get_mut(&id) {
            connection.room = None;
        }
    }

    fn drop_if_empty(&mut self, room: &str) {
        self.rooms.retain(|record| record.name != room || !record.members.is_empty());
    }

    fn directory(&self) -> Inbound {
        let rooms = self
            .rooms
            .iter()
            .map(|room| RoomInfo {
                name: room.name.clone(),
                occupants: Some(u32::try_from(room.members.len()).unwrap_or(u32::MAX)),
                created_at: Some(room.created_at.clone()),
            })
            .collect();
        Inbound::Rooms { rooms }
    }

    fn reply(&mut self, id: ClientId, event: &Inbound) {
        self.deliver(&[id], event);
    }

    fn broadcast_room(&mut self, room: &str, event: &Inbound) {
        let members = self.find_room(room).map(|r| r.members.clone()).unwrap_or_default();
        self.deliver(&members, event);
    }

    fn broadcast_occupants(&mut self, room: &str) {
        let names = self.members(room);
        self.broadcast_room(room, &Inbound::Occupants { room: room.to_string(), names });
    }

    /// Verbose servers push the directory to every identified connection.
    fn broadcast_directory(&mut self) {
        let directory = self.directory();
        let everyone: Vec<ClientId> =
            self.connections.iter().filter(|(_, c)| c.name.is_some()).map(|(id, _)| *id).collect();
        self.deliver(&everyone, &directory);
    }

    fn deliver(&mut self, recipients: &[ClientId], event: &Inbound) {
        let text = match self.schema.encode_event(event) {
            Ok(text) => text,
            Err(error) => {
                tracing::warn!(%error, "cannot encode event");
                return;
            },
        };
        for id in recipients {
            if let Some(connection) = self.connections.get_mut(id) {
                connection.outbox.push_back(text.clone());
            }
        }
    }

    /// Terse wall-clock stamp (`HH:MM:SS`).
    fn stamp(&mut self) -> String {
        match self.schema {
            Schema::Terse => {
                let secs = self.tick();
                format!("{:02}:{:02}:{:02}", secs / 3600 % 24, secs / 60 % 60, secs % 60)
            },
            Schema::Verbose => self.iso_stamp(),
        }
    }

    fn iso_stamp(&mut self) -> String {
        let secs = self.tick();
        format!("2024-01-01T{:02}:{:02}:{:02}", secs / 3600 % 24, secs / 60 % 60, secs % 60)
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        CLOCK_ORIGIN + self.clock
    }
}

/// Keep alphanumerics, `-`, `_` and spaces, trimmed.
fn sanitize_name(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | ' '))
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn send(server: &mut SimServer, id: ClientId, command: &Outbound) {
        let text = server.schema().encode(command).unwrap();
        server.receive(id, &text);
    }

    fn inbox(server: &mut SimServer, id: ClientId) -> Vec<Inbound> {
        let schema = server.schema();
        server.take_outbox(id).iter().map(|text| schema.decode(text).unwrap()).collect()
    }

    #[test]
    fn names_are_sanitized() {
        assert_eq!(sanitize_name("  <b>ana</b> "), "banab");
        assert_eq!(sanitize_name("jo_e-1 "), "jo_e-1");
        assert_eq!(sanitize_name("!!!"), "");
    }

    #[test]
    fn terse_join_announces_before_listing() {
        let mut server = SimServer::new(Schema::Terse);
        let ana = server.connect();
        send(&mut server, ana, &Outbound::Connect { name: "ana".into() });
        send(&mut server, ana, &Outbound::JoinRoom { room: "den".into() });

        assert_eq!(inbox(&mut server, ana), vec![
            Inbound::Connected { greeting: Some("Bienvenido, ana".into()) },
            Inbound::Notice { text: "ana se unió a la sala.".into() },
            Inbound::Occupants { room: "den".into(), names: vec!["ana".into()] },
        ]);
    }

    #[test]
    fn verbose_duplicate_room_is_rejected() {
        let mut server = SimServer::new(Schema::Verbose);
        let ana = server.connect();
        let bo = server.connect();
        send(&mut server, ana, &Outbound::Connect { name: "ana".into() });
        send(&mut server, bo, &Outbound::Connect { name: "bo".into() });
        send(&mut server, ana, &Outbound::CreateRoom { room: "den".into() });
        server.take_outbox(bo);

        send(&mut server, bo, &Outbound::CreateRoom { room: "den".into() });
        assert_eq!(inbox(&mut server, bo), vec![Inbound::Error {
            message: "La sala ya existe".into()
        }]);
    }

    #[test]
    fn verbose_drops_rooms_once_empty() {
        let mut server = SimServer::new(Schema::Verbose);
        let ana = server.connect();
        send(&mut server, ana, &Outbound::Connect { name: "ana".into() });
        send(&mut server, ana, &Outbound::JoinRoom { room: "den".into() });
        send(&mut server, ana, &Outbound::JoinRoom { room: "attic".into() });

        assert_eq!(server.room_names(), vec!["attic"]);
        server.disconnect(ana);
        assert!(server.room_names().is_empty());
    }

    #[test]
    fn logical_clock_is_deterministic() {
        let mut server = SimServer::new(Schema::Terse);
        assert_eq!(server.stamp(), "12:00:01");
        assert_eq!(server.stamp(), "12:00:02");
    }
}
