//! View collaborator contract.
//!
//! The session never renders anything itself. It emits [`ViewUpdate`]s, and
//! the runtime forwards each one to a [`View`] through [`ViewUpdate::apply`].

use parlor_proto::RoomInfo;

use crate::ChatLine;

/// Rendering surface for a session.
///
/// Calls are synchronous and infallible; a view that can fail must handle the
/// failure itself.
pub trait View {
    /// Show an informational line in the message area.
    fn show_system_line(&mut self, text: &str);

    /// Show a chat message in the message area.
    fn show_chat_line(&mut self, line: &ChatLine);

    /// Replace the room list. `active` is the joined room, if any.
    fn show_room_directory(&mut self, rooms: &[RoomInfo], active: Option<&str>);

    /// Replace the occupant list of the current room.
    fn show_occupants(&mut self, names: &[String]);

    /// Clear the message area.
    fn clear_messages(&mut self);

    /// Show an alert that needs the user's attention.
    fn prompt_alert(&mut self, text: &str);
}

/// Data form of a [`View`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewUpdate {
    /// See [`View::show_system_line`].
    SystemLine(String),
    /// See [`View::show_chat_line`].
    ChatLine(ChatLine),
    /// See [`View::show_room_directory`].
    RoomDirectory {
        /// Rooms in server order.
        rooms: Vec<RoomInfo>,
        /// Joined room, if any.
        active: Option<String>,
    },
    /// See [`View::show_occupants`].
    Occupants(Vec<String>),
    /// See [`View::clear_messages`].
    ClearMessages,
    /// See [`View::prompt_alert`].
    Alert(String),
}

impl ViewUpdate {
    /// Forward this update to `view`.
    pub fn apply<V: View + ?Sized>(&self, view: &mut V) {
        match self {
            Self::SystemLine(text) => view.show_system_line(text),
            Self::ChatLine(line) => view.show_chat_line(line),
            Self::RoomDirectory { rooms, active } => {
                view.show_room_directory(rooms, active.as_deref());
            },
            Self::Occupants(names) => view.show_occupants(names),
            Self::ClearMessages => view.clear_messages(),
            Self::Alert(text) => view.prompt_alert(text),
        }
    }
}
