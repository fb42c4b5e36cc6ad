//! Wire format pinning tests.
//!
//! Servers in the field parse these exact shapes, so every outbound command is
//! pinned with an inline snapshot and every inbound fixture is taken from what
//! real servers emit.

use parlor_proto::{Inbound, Outbound, ProtocolError, RoomInfo, Schema};

fn terse(command: &Outbound) -> String {
    Schema::Terse.encode(command).expect("terse encode")
}

fn verbose(command: &Outbound) -> String {
    Schema::Verbose.encode(command).expect("verbose encode")
}

#[test]
fn terse_commands() {
    insta::assert_snapshot!(terse(&Outbound::Connect { name: "alice".into() }), @r#"{"type":"connect","username":"alice"}"#);
    insta::assert_snapshot!(terse(&Outbound::JoinRoom { room: "lobby".into() }), @r#"{"type":"join","room":"lobby"}"#);
    insta::assert_snapshot!(terse(&Outbound::CreateRoom { room: "den".into() }), @r#"{"type":"join","room":"den"}"#);
    insta::assert_snapshot!(terse(&Outbound::SendMessage { text: "hi all".into() }), @r#"{"type":"message","message":"hi all"}"#);
    insta::assert_snapshot!(terse(&Outbound::ListRooms), @r#"{"type":"list_rooms"}"#);
    insta::assert_snapshot!(terse(&Outbound::LeaveRoom), @r#"{"type":"leave"}"#);
}

#[test]
fn verbose_commands() {
    insta::assert_snapshot!(verbose(&Outbound::Connect { name: "alice".into() }), @r#"{"tipo":"conectar","nombre":"alice"}"#);
    insta::assert_snapshot!(verbose(&Outbound::JoinRoom { room: "lobby".into() }), @r#"{"tipo":"unirse_sala","nombre_sala":"lobby"}"#);
    insta::assert_snapshot!(verbose(&Outbound::CreateRoom { room: "den".into() }), @r#"{"tipo":"crear_sala","nombre_sala":"den"}"#);
    insta::assert_snapshot!(verbose(&Outbound::SendMessage { text: "hola".into() }), @r#"{"tipo":"mensaje","contenido":"hola"}"#);
    insta::assert_snapshot!(verbose(&Outbound::ListRooms), @r#"{"tipo":"obtener_salas"}"#);
}

#[test]
fn verbose_cannot_leave() {
    let err = Schema::Verbose.encode(&Outbound::LeaveRoom).unwrap_err();
    assert_eq!(err, ProtocolError::Unsupported { kind: "leave_room", schema: Schema::Verbose });
    assert_eq!(err.to_string(), "leave_room is not supported by the verbose schema");
}

#[test]
fn terse_server_frames() {
    let decode = |text: &str| Schema::Terse.decode(text).expect("terse decode");

    assert_eq!(decode(r#"{"type": "connected", "message": "Bienvenido, alice"}"#), Inbound::Connected {
        greeting: Some("Bienvenido, alice".into())
    });
    assert_eq!(decode(r#"{"type": "rooms", "rooms": ["general", "rust"]}"#), Inbound::Rooms {
        rooms: vec![RoomInfo::named("general"), RoomInfo::named("rust")]
    });
    assert_eq!(
        decode(r#"{"type": "notice", "message": "bob se unió a la sala."}"#),
        Inbound::Notice { text: "bob se unió a la sala.".into() }
    );
    assert_eq!(
        decode(
            r#"{"type": "message", "room": "general", "sender": "bob", "message": "hi", "timestamp": "12:01:02"}"#
        ),
        Inbound::Message {
            room: Some("general".into()),
            sender: "bob".into(),
            text: "hi".into(),
            timestamp: Some("12:01:02".into()),
        }
    );
    assert_eq!(
        decode(
            r#"{"type": "user_list", "room": "general", "users": [{"name": "alice"}, {"name": "bob"}], "timestamp": "12:01:02"}"#
        ),
        Inbound::Occupants { room: "general".into(), names: vec!["alice".into(), "bob".into()] }
    );
    assert_eq!(decode(r#"{"type": "error", "message": "No conectado"}"#), Inbound::Error {
        message: "No conectado".into()
    });
}

#[test]
fn verbose_server_frames() {
    let decode = |text: &str| Schema::Verbose.decode(text).expect("verbose decode");

    assert_eq!(
        decode(
            r#"{"tipo": "salas_disponibles", "salas": [{"nombre": "general", "usuarios": 2, "creada_en": "2024-05-01T10:00:00"}]}"#
        ),
        Inbound::Rooms {
            rooms: vec![RoomInfo {
                name: "general".into(),
                occupants: Some(2),
                created_at: Some("2024-05-01T10:00:00".into()),
            }]
        }
    );
    assert_eq!(
        decode(r#"{"tipo": "sala_unida", "sala": "general", "usuarios": ["alice", "bob"]}"#),
        Inbound::RoomJoined {
            room: "general".into(),
            occupants: Some(vec!["alice".into(), "bob".into()]),
        }
    );
    assert_eq!(
        decode(
            r#"{"tipo": "mensaje", "nombre": "bob", "contenido": "hola", "timestamp": "2024-05-01T10:00:05"}"#
        ),
        Inbound::Message {
            room: None,
            sender: "bob".into(),
            text: "hola".into(),
            timestamp: Some("2024-05-01T10:00:05".into()),
        }
    );
    assert_eq!(
        decode(
            r#"{"tipo": "usuario_entro", "nombre": "bob", "timestamp": "2024-05-01T10:00:00", "usuarios": ["alice", "bob"]}"#
        ),
        Inbound::UserJoined {
            name: "bob".into(),
            room: None,
            occupants: Some(vec!["alice".into(), "bob".into()]),
        }
    );
    assert_eq!(
        decode(r#"{"tipo": "usuario_salio", "nombre": "bob", "timestamp": "2024-05-01T10:09:00"}"#),
        Inbound::UserLeft { name: "bob".into(), room: None, occupants: None }
    );
    assert_eq!(decode(r#"{"tipo": "error", "mensaje": "La sala ya existe"}"#), Inbound::Error {
        message: "La sala ya existe".into()
    });
}

#[test]
fn unknown_kinds_are_reported_by_name() {
    assert_eq!(
        Schema::Terse.decode(r#"{"type": "typing", "sender": "bob"}"#),
        Err(ProtocolError::UnknownKind { kind: "typing".into() })
    );
    assert_eq!(
        Schema::Verbose.decode(r#"{"tipo": "escribiendo"}"#),
        Err(ProtocolError::UnknownKind { kind: "escribiendo".into() })
    );
}

#[test]
fn server_side_event_encoding() {
    let joined = Inbound::RoomJoined { room: "den".into(), occupants: Some(vec!["alice".into()]) };
    insta::assert_snapshot!(Schema::Verbose.encode_event(&joined).expect("encode"), @r#"{"tipo":"sala_unida","sala":"den","usuarios":["alice"]}"#);

    let listing = Inbound::Occupants { room: "den".into(), names: vec!["alice".into()] };
    insta::assert_snapshot!(Schema::Terse.encode_event(&listing).expect("encode"), @r#"{"type":"user_list","room":"den","users":[{"name":"alice"}]}"#);
}
