//! Fuzz target for the Session state machine
//!
//! # Strategy
//!
//! - Intents: joins, creates, messages and leaves with arbitrary text
//! - Envelopes: arbitrary server events, including ones for other rooms
//! - Link events: failures and closes at any point
//!
//! # Invariants
//!
//! - Session NEVER panics
//! - A chat line is only rendered for the room joined when it arrived
//! - Blank messages never reach the wire
//! - Nothing is sent after the session has ended

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use parlor_app::{Intent, Phase, Session, SessionAction, SessionConfig, SessionEvent, ViewUpdate};
use parlor_proto::{Inbound, Outbound, RoomInfo, Schema};

#[derive(Debug, Clone, Arbitrary)]
struct Scenario {
    verbose: bool,
    optimistic_join: bool,
    steps: Vec<Step>,
}

#[derive(Debug, Clone, Arbitrary)]
enum Step {
    Connect(String),
    Join(u8),
    Create(u8),
    Say(String),
    ListRooms,
    Leave,
    Opened,
    Connected,
    Joined(u8),
    Occupants(u8),
    Message { room: Option<u8>, text: String },
    Rooms(Vec<u8>),
    Failed,
    Closed,
}

const ROOMS: [&str; 3] = ["lobby", "den", " "];

fn room(index: u8) -> String {
    ROOMS[usize::from(index) % ROOMS.len()].to_string()
}

fn event(step: &Step) -> Option<SessionEvent> {
    let envelope = match step {
        Step::Opened => return Some(SessionEvent::LinkOpened),
        Step::Failed => return Some(SessionEvent::LinkFailed { cause: "fuzz".into() }),
        Step::Closed => return Some(SessionEvent::LinkClosed { reason: None }),
        Step::Connected => Inbound::Connected { greeting: None },
        Step::Joined(r) => Inbound::RoomJoined { room: room(*r), occupants: None },
        Step::Occupants(r) => Inbound::Occupants { room: room(*r), names: vec!["bob".into()] },
        Step::Message { room: r, text } => Inbound::Message {
            room: r.map(room),
            sender: "bob".into(),
            text: text.clone(),
            timestamp: None,
        },
        Step::Rooms(rooms) => Inbound::Rooms {
            rooms: rooms.iter().map(|r| RoomInfo::named(room(*r))).collect(),
        },
        _ => return None,
    };
    Some(SessionEvent::Received(envelope))
}

fn intent(step: &Step) -> Option<Intent> {
    Some(match step {
        Step::Connect(name) => Intent::Connect { name: name.clone() },
        Step::Join(r) => Intent::JoinRoom { room: room(*r) },
        Step::Create(r) => Intent::CreateRoom { room: room(*r) },
        Step::Say(text) => Intent::SendMessage { text: text.clone() },
        Step::ListRooms => Intent::ListRooms,
        Step::Leave => Intent::LeaveRoom,
        _ => return None,
    })
}

fuzz_target!(|scenario: Scenario| {
    let schema = if scenario.verbose { Schema::Verbose } else { Schema::Terse };
    let config = SessionConfig {
        schema,
        optimistic_join: scenario.optimistic_join,
        ..SessionConfig::default()
    };
    let mut session = Session::new(config);

    for step in &scenario.steps {
        let ended = session.phase() == Phase::Ended;
        let current = session.membership().map(str::to_string);
        let switched_early = scenario.optimistic_join && session.pending_join().is_some();

        let actions = match (intent(step), event(step)) {
            (Some(intent), _) => session.handle_intent(intent),
            (None, Some(event)) => session.handle(event),
            (None, None) => continue,
        };

        for action in &actions {
            match action {
                SessionAction::Send(command) => {
                    assert!(!ended, "sent {command:?} after the session ended");
                    if let Outbound::SendMessage { text } = command {
                        assert!(!text.trim().is_empty(), "blank message sent");
                    }
                },
                SessionAction::View(ViewUpdate::ChatLine(_)) => {
                    assert!(current.is_some(), "chat rendered outside any room");
                    match step {
                        Step::Message { room: Some(r), .. } => {
                            assert_eq!(current.as_deref(), Some(room(*r).as_str()));
                        },
                        Step::Message { room: None, .. } => {
                            assert!(!switched_early, "untagged chat rendered before the switch was confirmed");
                        },
                        _ => {},
                    }
                },
                _ => {},
            }
        }
    }
});
