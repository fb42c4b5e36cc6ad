//! Session state machine.
//!
//! This module defines [`Session`], which keeps identity and room state
//! consistent with what the server has confirmed and decides what the view
//! should show. It performs no I/O: caller intents and [`SessionEvent`]s go in,
//! [`SessionAction`]s come out.
//!
//! # Responsibilities
//!
//! - Identity negotiation (confirm-first: identified only on `connected`).
//! - Room membership, including optimistic or confirmed joins.
//! - Dispatch of server envelopes, dropping chat for rooms we are not in.
//! - A transcript mirroring the message area of the current room.
//!
//! # Lifecycle
//!
//! ```text
//! ┌───────────┐  connected   ┌────────────┐
//! │ Anonymous │─────────────>│ Identified │
//! └───────────┘              └────────────┘
//!       │                          │
//!       │ link closed              │ link closed
//!       ↓                          ↓
//!  ┌───────┐                  ┌───────┐
//!  │ Ended │                  │ Ended │
//!  └───────┘                  └───────┘
//! ```

use parlor_client::ConnectionState;
use parlor_proto::{Inbound, Outbound, RoomInfo, Schema};

use crate::{
    ChatLine, Identity, Intent, Phase, SessionAction, SessionConfig, SessionEvent,
    TranscriptLine, ValidationError, ViewUpdate,
};

/// Session state machine for one connection.
///
/// Pure state machine that processes intents and events and produces
/// actions. A session is single-use: once the link closes it stays
/// [`Phase::Ended`].
#[derive(Debug, Clone)]
pub struct Session {
    /// Deployment settings.
    config: SessionConfig,
    /// Session lifecycle.
    phase: Phase,
    /// Read-only mirror of the transport's connection state.
    link: ConnectionState,
    /// Identity sent in `connect`, awaiting acknowledgement.
    pending_identity: Option<Identity>,
    /// Identity acknowledged by the server.
    identity: Option<Identity>,
    /// Room the session belongs to.
    membership: Option<String>,
    /// Join requested but not yet confirmed.
    pending_join: Option<PendingJoin>,
    /// Last room list received, in server order.
    directory: Vec<RoomInfo>,
    /// Occupants of the current room.
    occupants: Vec<String>,
    /// Lines shown in the message area since the last room change.
    transcript: Vec<TranscriptLine>,
}

/// Join awaiting the server's answer.
#[derive(Debug, Clone)]
struct PendingJoin {
    /// Room name as requested.
    room: String,
    /// Confirmed membership when the join was requested.
    previous: Option<String>,
    /// Membership already moved to `room` (optimistic join).
    switched: bool,
    /// Notices held back until the new room is shown.
    notices: Vec<String>,
}

impl Session {
    /// Create an anonymous session with no link.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            phase: Phase::Anonymous,
            link: ConnectionState::Disconnected,
            pending_identity: None,
            identity: None,
            membership: None,
            pending_join: None,
            directory: Vec::new(),
            occupants: Vec::new(),
            transcript: Vec::new(),
        }
    }

    /// Session settings.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Session lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Last observed link state.
    pub fn link(&self) -> ConnectionState {
        self.link
    }

    /// Acknowledged identity. `None` until the server confirms it.
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Room the session belongs to, if any.
    pub fn membership(&self) -> Option<&str> {
        self.membership.as_deref()
    }

    /// Room requested but not yet confirmed, if any.
    pub fn pending_join(&self) -> Option<&str> {
        self.pending_join.as_ref().map(|pending| pending.room.as_str())
    }

    /// Most recent room directory.
    pub fn directory(&self) -> &[RoomInfo] {
        &self.directory
    }

    /// Occupants of the current room.
    pub fn occupants(&self) -> &[String] {
        &self.occupants
    }

    /// Lines shown for the current room.
    pub fn transcript(&self) -> &[TranscriptLine] {
        &self.transcript
    }

    /// Process a caller intent.
    ///
    /// Validation failures are dropped (logged at debug), except a missing
    /// display name, which is alerted. [`Intent::Quit`] produces nothing; the
    /// runtime acts on it.
    pub fn handle_intent(&mut self, intent: Intent) -> Vec<SessionAction> {
        let result = match intent {
            Intent::Connect { name } => self.connect(&name),
            Intent::JoinRoom { room } => self.join_room(&room),
            Intent::CreateRoom { room } => self.create_room(&room),
            Intent::SendMessage { text } => self.send_message(&text),
            Intent::ListRooms => self.list_rooms(),
            Intent::LeaveRoom => self.leave_room(),
            Intent::Quit => Ok(Vec::new()),
        };

        match result {
            Ok(actions) => actions,
            Err(error @ ValidationError::EmptyIdentity) => vec![alert(error.to_string())],
            Err(error) => {
                tracing::debug!(%error, "intent dropped");
                Vec::new()
            },
        }
    }

    /// Connect with a display name.
    ///
    /// Opens the link, or sends `connect` right away if it is already open.
    ///
    /// # Errors
    ///
    /// - `ValidationError::SessionEnded` after the link closed
    /// - `ValidationError::EmptyIdentity` for a blank name
    /// - `ValidationError::AlreadyConnecting` if a connect is pending or done
    pub fn connect(&mut self, name: &str) -> Result<Vec<SessionAction>, ValidationError> {
        self.ensure_live()?;
        let identity = Identity::parse(name)?;
        if self.pending_identity.is_some() || self.identity.is_some() {
            return Err(ValidationError::AlreadyConnecting);
        }

        let mut actions = Vec::new();
        match self.link {
            ConnectionState::Disconnected => {
                self.link = ConnectionState::Connecting;
                actions.push(self.system_line(format!(
                    "connecting to {} as {identity}",
                    self.config.server_addr
                )));
                actions.push(SessionAction::Open { address: self.config.server_addr.clone() });
            },
            ConnectionState::Open => {
                actions.push(SessionAction::Send(Outbound::Connect {
                    name: identity.as_str().to_string(),
                }));
            },
            // The connect goes out once the link opens
            ConnectionState::Connecting | ConnectionState::Closed => {},
        }

        self.pending_identity = Some(identity);
        Ok(actions)
    }

    /// Join an existing room.
    ///
    /// Joining the room already joined is a no-op.
    ///
    /// # Errors
    ///
    /// - `ValidationError::SessionEnded` after the link closed
    /// - `ValidationError::EmptyRoomName` for a blank name
    pub fn join_room(&mut self, room: &str) -> Result<Vec<SessionAction>, ValidationError> {
        self.request_join(room, false)
    }

    /// Create a room and join it.
    ///
    /// # Errors
    ///
    /// Same as [`Self::join_room`].
    pub fn create_room(&mut self, room: &str) -> Result<Vec<SessionAction>, ValidationError> {
        self.request_join(room, true)
    }

    /// Send a chat message to the current room.
    ///
    /// # Errors
    ///
    /// - `ValidationError::SessionEnded` after the link closed
    /// - `ValidationError::EmptyMessage` for blank text
    /// - `ValidationError::NoActiveRoom` without a room
    pub fn send_message(&mut self, text: &str) -> Result<Vec<SessionAction>, ValidationError> {
        self.ensure_live()?;
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyMessage);
        }
        if self.membership.is_none() {
            return Err(ValidationError::NoActiveRoom);
        }

        Ok(vec![SessionAction::Send(Outbound::SendMessage { text: text.to_string() })])
    }

    /// Request a fresh room directory.
    ///
    /// # Errors
    ///
    /// - `ValidationError::SessionEnded` after the link closed
    pub fn list_rooms(&mut self) -> Result<Vec<SessionAction>, ValidationError> {
        self.ensure_live()?;
        Ok(vec![SessionAction::Send(Outbound::ListRooms)])
    }

    /// Leave the current room.
    ///
    /// Terse servers never confirm a leave, so membership is cleared locally.
    /// The verbose schema has no leave command and the intent is dropped.
    ///
    /// # Errors
    ///
    /// - `ValidationError::SessionEnded` after the link closed
    /// - `ValidationError::NoActiveRoom` without a room
    pub fn leave_room(&mut self) -> Result<Vec<SessionAction>, ValidationError> {
        self.ensure_live()?;
        if self.membership.is_none() {
            return Err(ValidationError::NoActiveRoom);
        }
        if self.config.schema == Schema::Verbose {
            tracing::warn!(schema = %self.config.schema, "leave is not supported, ignoring");
            return Ok(Vec::new());
        }

        let room = self.membership.take().unwrap_or_default();
        self.pending_join = None;
        self.occupants.clear();
        self.transcript.clear();

        Ok(vec![
            SessionAction::Send(Outbound::LeaveRoom),
            SessionAction::View(ViewUpdate::ClearMessages),
            self.system_line(format!("left {room}")),
            SessionAction::View(ViewUpdate::Occupants(Vec::new())),
            self.directory_update(),
        ])
    }

    /// Show a locally generated line in the message area.
    pub fn notify(&mut self, text: String) -> Vec<SessionAction> {
        vec![self.system_line(text)]
    }

    /// Process a transport event and return actions.
    pub fn handle(&mut self, event: SessionEvent) -> Vec<SessionAction> {
        if self.phase == Phase::Ended {
            tracing::debug!(?event, "session ended, ignoring event");
            return Vec::new();
        }

        match event {
            SessionEvent::LinkOpened => {
                self.link = ConnectionState::Open;
                match &self.pending_identity {
                    Some(identity) => vec![SessionAction::Send(Outbound::Connect {
                        name: identity.as_str().to_string(),
                    })],
                    None => Vec::new(),
                }
            },
            SessionEvent::Received(envelope) => self.dispatch(envelope),
            SessionEvent::Rejected(error) => {
                if error.is_unknown_kind() {
                    tracing::warn!(%error, "discarding envelope");
                } else {
                    tracing::debug!(%error, "discarding frame");
                }
                Vec::new()
            },
            SessionEvent::LinkFailed { cause } => vec![alert(format!("connection error: {cause}"))],
            SessionEvent::LinkClosed { reason } => {
                self.link = ConnectionState::Closed;
                self.phase = Phase::Ended;
                self.pending_identity = None;
                self.pending_join = None;

                let text = match reason {
                    Some(reason) => format!("disconnected from server: {reason}"),
                    None => "disconnected from server".to_string(),
                };
                vec![alert(text)]
            },
        }
    }

    fn dispatch(&mut self, envelope: Inbound) -> Vec<SessionAction> {
        match envelope {
            Inbound::Connected { greeting } => self.on_connected(greeting),
            Inbound::Rooms { rooms } => {
                self.directory = rooms;
                vec![self.directory_update()]
            },
            Inbound::RoomJoined { room, occupants } => self.on_room_joined(room, occupants),
            Inbound::Message { room, sender, text, timestamp } => {
                self.on_message(room.as_deref(), sender, text, timestamp)
            },
            Inbound::Notice { text } => self.on_notice(text),
            Inbound::UserJoined { name, room, occupants } => {
                self.on_presence(room.as_deref(), format!("{name} joined the room"), occupants)
            },
            Inbound::UserLeft { name, room, occupants } => {
                self.on_presence(room.as_deref(), format!("{name} left the room"), occupants)
            },
            Inbound::Occupants { room, names } => self.on_occupants(room, names),
            Inbound::Error { message } => {
                tracing::debug!(%message, "server error");
                let mut actions = vec![alert(message)];
                if let Some(pending) = self.pending_join.take() {
                    actions.extend(self.abandon_join(pending));
                }
                actions
            },
        }
    }

    fn on_connected(&mut self, greeting: Option<String>) -> Vec<SessionAction> {
        if let Some(identity) = self.pending_identity.take() {
            self.identity = Some(identity);
            self.phase = Phase::Identified;
        } else if self.phase == Phase::Anonymous {
            tracing::warn!("connected acknowledgement without a pending identity");
            return Vec::new();
        }

        let text = match (greeting, &self.identity) {
            (Some(greeting), _) => greeting,
            (None, Some(identity)) => format!("connected as {identity}"),
            (None, None) => "connected".to_string(),
        };

        vec![self.system_line(text), SessionAction::Send(Outbound::ListRooms)]
    }

    /// Servers only confirm joins to the joiner, so while a join is pending
    /// any confirmation answers it, under the name the server settled on.
    fn on_room_joined(&mut self, room: String, occupants: Option<Vec<String>>) -> Vec<SessionAction> {
        if self.pending_join.is_some() {
            return self.complete_join(&room, occupants);
        }

        if self.membership.as_deref() == Some(room.as_str()) {
            return occupants.map(|names| vec![self.replace_occupants(names)]).unwrap_or_default();
        }

        tracing::debug!(%room, "ignoring unsolicited join confirmation");
        Vec::new()
    }

    fn on_message(
        &mut self,
        room: Option<&str>,
        sender: String,
        text: String,
        timestamp: Option<String>,
    ) -> Vec<SessionAction> {
        if !self.is_current(room) {
            tracing::debug!(room, current = self.membership.as_deref(), "discarding message");
            return Vec::new();
        }

        let is_self = self.identity.as_ref().is_some_and(|identity| identity.as_str() == sender);
        let line = ChatLine { author: sender, text, is_self, timestamp };
        self.transcript.push(TranscriptLine::Chat(line.clone()));

        vec![SessionAction::View(ViewUpdate::ChatLine(line))]
    }

    fn on_presence(
        &mut self,
        room: Option<&str>,
        text: String,
        occupants: Option<Vec<String>>,
    ) -> Vec<SessionAction> {
        if !self.is_current(room) {
            tracing::debug!(room, "discarding presence update");
            return Vec::new();
        }

        let mut actions = vec![self.system_line(text)];
        if let Some(names) = occupants {
            actions.push(self.replace_occupants(names));
        }
        actions
    }

    /// Terse servers confirm a join only through the occupant list, and may
    /// rewrite the room name on the way. Lists only reach members, so one
    /// that names us says which room the server has put us in.
    fn on_occupants(&mut self, room: String, names: Vec<String>) -> Vec<SessionAction> {
        let requested = self.pending_join.as_ref().is_some_and(|pending| pending.room == room);
        let includes_us =
            self.identity.as_ref().is_some_and(|identity| names.iter().any(|name| name == identity.as_str()));
        let here = self.membership.as_deref() == Some(room.as_str());

        if requested || (includes_us && (self.pending_join.is_some() || !here)) {
            if !requested {
                tracing::debug!(%room, pending = self.pending_join(), "following the server's room");
            }
            return self.complete_join(&room, Some(names));
        }

        if here {
            return vec![self.replace_occupants(names)];
        }

        tracing::debug!(%room, "discarding occupants of another room");
        Vec::new()
    }

    fn on_notice(&mut self, text: String) -> Vec<SessionAction> {
        // Shown after the room switch clears the message area
        if let Some(pending) = &mut self.pending_join {
            pending.notices.push(text);
            return Vec::new();
        }
        vec![self.system_line(text)]
    }

    fn request_join(&mut self, room: &str, create: bool) -> Result<Vec<SessionAction>, ValidationError> {
        self.ensure_live()?;
        let room = room.trim();
        if room.is_empty() {
            return Err(ValidationError::EmptyRoomName);
        }
        if self.membership.as_deref() == Some(room) {
            tracing::debug!(room, "already in room");
            return Ok(Vec::new());
        }

        let command = if create {
            Outbound::CreateRoom { room: room.to_string() }
        } else {
            Outbound::JoinRoom { room: room.to_string() }
        };

        let mut actions = vec![SessionAction::Send(command)];
        if self.link != ConnectionState::Open || self.phase != Phase::Identified {
            // Nothing can answer it, so membership stays put
            tracing::debug!(room, link = ?self.link, phase = ?self.phase, "join before identification");
            return Ok(actions);
        }

        let previous = match self.pending_join.take() {
            Some(earlier) => earlier.previous,
            None => self.membership.clone(),
        };
        let switched = self.config.optimistic_join;
        self.pending_join =
            Some(PendingJoin { room: room.to_string(), previous, switched, notices: Vec::new() });
        if switched {
            actions.extend(self.enter_room(room));
        }
        Ok(actions)
    }

    fn complete_join(&mut self, room: &str, occupants: Option<Vec<String>>) -> Vec<SessionAction> {
        let notices = self.pending_join.take().map(|pending| pending.notices).unwrap_or_default();

        let mut actions = self.enter_room(room);
        for text in notices {
            actions.push(self.system_line(text));
        }
        if let Some(names) = occupants {
            actions.push(self.replace_occupants(names));
        }
        actions.push(SessionAction::Send(Outbound::ListRooms));
        actions
    }

    /// The server refused a join. An optimistic switch is undone.
    fn abandon_join(&mut self, pending: PendingJoin) -> Vec<SessionAction> {
        tracing::debug!(room = %pending.room, "join refused");

        let mut actions = Vec::new();
        if pending.switched {
            self.membership = pending.previous;
            self.occupants.clear();
            self.transcript.clear();
            actions.push(SessionAction::View(ViewUpdate::ClearMessages));
            if let Some(room) = self.membership.clone() {
                actions.push(self.system_line(format!("back in {room}")));
            }
            actions.push(SessionAction::View(ViewUpdate::Occupants(Vec::new())));
            actions.push(self.directory_update());
        }
        for text in pending.notices {
            actions.push(self.system_line(text));
        }
        actions
    }

    /// Switch membership to `room`, clearing the previous room's view.
    /// No-op when already there.
    fn enter_room(&mut self, room: &str) -> Vec<SessionAction> {
        if self.membership.as_deref() == Some(room) {
            return Vec::new();
        }

        self.membership = Some(room.to_string());
        self.occupants.clear();
        self.transcript.clear();

        vec![
            SessionAction::View(ViewUpdate::ClearMessages),
            self.system_line(format!("joined {room}")),
            self.directory_update(),
        ]
    }

    /// Untagged envelopes belong to the current room, unless membership moved
    /// ahead of the server and they may still come from the previous one.
    fn is_current(&self, tag: Option<&str>) -> bool {
        let switched_early = self.pending_join.as_ref().is_some_and(|pending| pending.switched);
        match (self.membership.as_deref(), tag) {
            (None, _) => false,
            (Some(_), None) => !switched_early,
            (Some(current), Some(tag)) => current == tag,
        }
    }

    fn ensure_live(&self) -> Result<(), ValidationError> {
        if self.phase == Phase::Ended {
            return Err(ValidationError::SessionEnded);
        }
        Ok(())
    }

    fn system_line(&mut self, text: String) -> SessionAction {
        self.transcript.push(TranscriptLine::System(text.clone()));
        SessionAction::View(ViewUpdate::SystemLine(text))
    }

    fn replace_occupants(&mut self, names: Vec<String>) -> SessionAction {
        self.occupants.clone_from(&names);
        SessionAction::View(ViewUpdate::Occupants(names))
    }

    fn directory_update(&self) -> SessionAction {
        SessionAction::View(ViewUpdate::RoomDirectory {
            rooms: self.directory.clone(),
            active: self.membership.clone(),
        })
    }
}

fn alert(text: String) -> SessionAction {
    SessionAction::View(ViewUpdate::Alert(text))
}
