//! Parsing of lines typed at the prompt.

use parlor_app::Intent;

/// Usage hint shown for `/help`.
pub const USAGE: &str = "\
commands:
  /connect <name>   connect with a display name
  /join <room>      join a room
  /create <room>    create a room and join it
  /rooms            refresh the room list
  /leave            leave the current room
  /quit             exit
anything else is sent as a message to the current room";

/// Result of parsing one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Hand this intent to the runtime.
    Intent(Intent),
    /// Print [`USAGE`].
    Help,
    /// A `/command` that does not exist.
    Unknown(String),
    /// Nothing typed.
    Empty,
}

/// Parse one line.
///
/// Arguments are passed through untouched so the session can validate them;
/// `/join` with no room is still a join intent and is rejected there.
pub fn parse(line: &str) -> Command {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Command::Empty;
    }

    let Some(rest) = line.trim_start().strip_prefix('/') else {
        return Command::Intent(Intent::SendMessage { text: line.to_string() });
    };

    let (name, argument) = match rest.split_once(char::is_whitespace) {
        Some((name, argument)) => (name, argument.trim().to_string()),
        None => (rest, String::new()),
    };

    let intent = match name {
        "connect" => Intent::Connect { name: argument },
        "join" => Intent::JoinRoom { room: argument },
        "create" => Intent::CreateRoom { room: argument },
        "rooms" => Intent::ListRooms,
        "leave" => Intent::LeaveRoom,
        "quit" | "exit" => Intent::Quit,
        "help" | "?" => return Command::Help,
        other => return Command::Unknown(format!("/{other}")),
    };
    Command::Intent(intent)
}
