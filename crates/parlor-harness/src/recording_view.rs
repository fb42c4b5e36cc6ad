//! View that records what a user would see.

use parlor_app::{ChatLine, View, ViewUpdate};
use parlor_proto::RoomInfo;

/// Line currently shown in the message area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenLine {
    /// Informational line.
    System(String),
    /// Chat message.
    Chat(ChatLine),
}

/// [`View`] that keeps the full update log and the resulting screen.
#[derive(Debug, Clone, Default)]
pub struct RecordingView {
    /// Every update, in order.
    pub updates: Vec<ViewUpdate>,
    /// Message area since the last clear.
    pub screen: Vec<ScreenLine>,
    /// Last room directory shown.
    pub directory: Vec<RoomInfo>,
    /// Room marked active in the last directory.
    pub active_room: Option<String>,
    /// Last occupant list shown.
    pub occupants: Vec<String>,
    /// Alerts, in order.
    pub alerts: Vec<String>,
}

impl RecordingView {
    /// Create an empty view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Chat lines on screen as `author: text`.
    pub fn chat(&self) -> Vec<String> {
        self.screen
            .iter()
            .filter_map(|line| match line {
                ScreenLine::Chat(chat) => Some(format!("{}: {}", chat.author, chat.text)),
                ScreenLine::System(_) => None,
            })
            .collect()
    }

    /// System lines on screen.
    pub fn system(&self) -> Vec<&str> {
        self.screen
            .iter()
            .filter_map(|line| match line {
                ScreenLine::System(text) => Some(text.as_str()),
                ScreenLine::Chat(_) => None,
            })
            .collect()
    }

    /// Names in the last directory, in order.
    pub fn room_names(&self) -> Vec<&str> {
        self.directory.iter().map(|room| room.name.as_str()).collect()
    }

    /// Number of times the message area was cleared.
    pub fn clears(&self) -> usize {
        self.updates.iter().filter(|u| matches!(u, ViewUpdate::ClearMessages)).count()
    }
}

impl View for RecordingView {
    fn show_system_line(&mut self, text: &str) {
        self.updates.push(ViewUpdate::SystemLine(text.to_string()));
        self.screen.push(ScreenLine::System(text.to_string()));
    }

    fn show_chat_line(&mut self, line: &ChatLine) {
        self.updates.push(ViewUpdate::ChatLine(line.clone()));
        self.screen.push(ScreenLine::Chat(line.clone()));
    }

    fn show_room_directory(&mut self, rooms: &[RoomInfo], active: Option<&str>) {
        self.updates.push(ViewUpdate::RoomDirectory {
            rooms: rooms.to_vec(),
            active: active.map(str::to_string),
        });
        self.directory = rooms.to_vec();
        self.active_room = active.map(str::to_string);
    }

    fn show_occupants(&mut self, names: &[String]) {
        self.updates.push(ViewUpdate::Occupants(names.to_vec()));
        self.occupants = names.to_vec();
    }

    fn clear_messages(&mut self) {
        self.updates.push(ViewUpdate::ClearMessages);
        self.screen.clear();
    }

    fn prompt_alert(&mut self, text: &str) {
        self.updates.push(ViewUpdate::Alert(text.to_string()));
        self.alerts.push(text.to_string());
    }
}
