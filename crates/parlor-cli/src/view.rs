//! Line-oriented rendering of a session.
//!
//! Everything is appended to the output as plain lines; there is no cursor
//! addressing. Clearing the message area prints a separator instead.

use std::io::Write;

use parlor_app::{ChatLine, View};
use parlor_proto::RoomInfo;

/// [`View`] that writes one line per update.
pub struct TerminalView<W: Write> {
    out: W,
}

impl<W: Write> TerminalView<W> {
    /// Render to `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Writer the view renders to.
    pub fn get_ref(&self) -> &W {
        &self.out
    }

    /// Consume the view and return the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: std::fmt::Arguments<'_>) {
        let written = self.out.write_fmt(text).and_then(|()| self.out.write_all(b"\n"));
        if let Err(error) = written.and_then(|()| self.out.flush()) {
            tracing::warn!(%error, "cannot write to terminal");
        }
    }
}

impl<W: Write> View for TerminalView<W> {
    fn show_system_line(&mut self, text: &str) {
        self.line(format_args!("* {text}"));
    }

    fn show_chat_line(&mut self, line: &ChatLine) {
        let author = if line.is_self { "you" } else { line.author.as_str() };
        match &line.timestamp {
            Some(timestamp) => self.line(format_args!("[{timestamp}] {author}: {}", line.text)),
            None => self.line(format_args!("{author}: {}", line.text)),
        }
    }

    fn show_room_directory(&mut self, rooms: &[RoomInfo], active: Option<&str>) {
        if rooms.is_empty() {
            self.line(format_args!("rooms: (none)"));
            return;
        }

        let entries: Vec<String> = rooms
            .iter()
            .map(|room| {
                let marker = if active == Some(room.name.as_str()) { "*" } else { "" };
                match room.occupants {
                    Some(count) => format!("{marker}{} ({count})", room.name),
                    None => format!("{marker}{}", room.name),
                }
            })
            .collect();
        self.line(format_args!("rooms: {}", entries.join(", ")));
    }

    fn show_occupants(&mut self, names: &[String]) {
        if !names.is_empty() {
            self.line(format_args!("here: {}", names.join(", ")));
        }
    }

    fn clear_messages(&mut self) {
        self.line(format_args!("----"));
    }

    fn prompt_alert(&mut self, text: &str) {
        self.line(format_args!("! {text}"));
    }
}

#[cfg(test)]
mod tests {
    use parlor_app::ViewUpdate;

    use super::*;

    fn render(updates: &[ViewUpdate]) -> String {
        let mut view = TerminalView::new(Vec::new());
        for update in updates {
            update.apply(&mut view);
        }
        String::from_utf8(view.into_inner()).unwrap()
    }

    #[test]
    fn renders_a_session() {
        let output = render(&[
            ViewUpdate::SystemLine("Bienvenido, alice".into()),
            ViewUpdate::RoomDirectory {
                rooms: vec![
                    RoomInfo { name: "den".into(), occupants: Some(2), created_at: None },
                    RoomInfo::named("lobby"),
                ],
                active: Some("lobby".into()),
            },
            ViewUpdate::ClearMessages,
            ViewUpdate::Occupants(vec!["alice".into(), "bob".into()]),
            ViewUpdate::ChatLine(ChatLine {
                author: "bob".into(),
                text: "hi".into(),
                is_self: false,
                timestamp: Some("12:00:01".into()),
            }),
            ViewUpdate::ChatLine(ChatLine {
                author: "alice".into(),
                text: "hello".into(),
                is_self: true,
                timestamp: None,
            }),
            ViewUpdate::Alert("disconnected from server".into()),
        ]);

        insta::assert_snapshot!(output.trim_end(), @r"
        * Bienvenido, alice
        rooms: den (2), *lobby
        ----
        here: alice, bob
        [12:00:01] bob: hi
        you: hello
        ! disconnected from server
        ");
    }

    #[test]
    fn empty_lists() {
        let output = render(&[
            ViewUpdate::RoomDirectory { rooms: Vec::new(), active: None },
            ViewUpdate::Occupants(Vec::new()),
        ]);
        assert_eq!(output, "rooms: (none)\n");
    }
}
