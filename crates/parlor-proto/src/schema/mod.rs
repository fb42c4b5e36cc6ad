//! Wire schemas.
//!
//! A deployment speaks exactly one schema end-to-end. Both are one JSON object
//! per frame with a string discriminator; they differ in field names and in
//! which envelopes they can express.
//!
//! Decoding is two-step: the frame is parsed into a JSON value and its
//! discriminator is checked against the schema's known kinds before the typed
//! decode. This keeps "valid JSON, unknown kind" ([`ProtocolError::UnknownKind`])
//! apart from "broken frame" ([`ProtocolError::Malformed`]), which callers
//! handle differently.

mod terse;
mod verbose;

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{Inbound, Outbound, ProtocolError, Result};

/// Wire vocabulary used by a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Schema {
    /// Short English field names, discriminated by `type`.
    #[default]
    Terse,
    /// Spanish field names, discriminated by `tipo`.
    Verbose,
}

impl Schema {
    /// Name of the discriminator field.
    pub fn kind_field(self) -> &'static str {
        match self {
            Self::Terse => terse::KIND_FIELD,
            Self::Verbose => verbose::KIND_FIELD,
        }
    }

    /// Encode a client command to frame text.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::Unsupported`] if the schema has no form for it
    pub fn encode(self, command: &Outbound) -> Result<String> {
        match self {
            Self::Terse => to_text(&terse::Command::from_outbound(command)?),
            Self::Verbose => to_text(&verbose::Command::from_outbound(command)?),
        }
    }

    /// Decode frame text received from the server.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::Malformed`] for non-JSON text or a bad shape
    /// - [`ProtocolError::MissingKind`] if the discriminator is absent
    /// - [`ProtocolError::UnknownKind`] if the kind is not part of the schema
    pub fn decode(self, text: &str) -> Result<Inbound> {
        match self {
            Self::Terse => {
                decode_tagged::<terse::Event>(text, terse::KIND_FIELD, terse::EVENT_KINDS)
                    .map(terse::Event::into_inbound)
            },
            Self::Verbose => {
                decode_tagged::<verbose::Event>(text, verbose::KIND_FIELD, verbose::EVENT_KINDS)
                    .map(verbose::Event::into_inbound)
            },
        }
    }

    /// Encode a server event to frame text (server side).
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::Unsupported`] if the schema has no form for it
    pub fn encode_event(self, event: &Inbound) -> Result<String> {
        match self {
            Self::Terse => to_text(&terse::Event::from_inbound(event)?),
            Self::Verbose => to_text(&verbose::Event::from_inbound(event)?),
        }
    }

    /// Decode frame text received from a client (server side).
    ///
    /// # Errors
    ///
    /// Same as [`Schema::decode`].
    pub fn decode_command(self, text: &str) -> Result<Outbound> {
        match self {
            Self::Terse => {
                decode_tagged::<terse::Command>(text, terse::KIND_FIELD, terse::COMMAND_KINDS)
                    .map(terse::Command::into_outbound)
            },
            Self::Verbose => decode_tagged::<verbose::Command>(
                text,
                verbose::KIND_FIELD,
                verbose::COMMAND_KINDS,
            )
            .map(verbose::Command::into_outbound),
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Terse => write!(f, "terse"),
            Self::Verbose => write!(f, "verbose"),
        }
    }
}

fn to_text<T: serde::Serialize>(wire: &T) -> Result<String> {
    serde_json::to_string(wire).map_err(|e| ProtocolError::Encode(e.to_string()))
}

fn decode_tagged<T: DeserializeOwned>(
    text: &str,
    field: &'static str,
    known: &[&str],
) -> Result<T> {
    let value: Value = serde_json::from_str(text)?;

    let Value::Object(object) = &value else {
        return Err(ProtocolError::Malformed("frame is not a JSON object".to_string()));
    };

    let kind = match object.get(field) {
        Some(Value::String(kind)) => kind,
        _ => return Err(ProtocolError::MissingKind { field }),
    };

    if !known.contains(&kind.as_str()) {
        return Err(ProtocolError::UnknownKind { kind: kind.clone() });
    }

    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_object_json_is_malformed() {
        let err = Schema::Terse.decode("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, ProtocolError::Malformed(_)));
    }

    #[test]
    fn numeric_discriminator_is_missing_kind() {
        let err = Schema::Terse.decode(r#"{"type": 7}"#).unwrap_err();
        assert_eq!(err, ProtocolError::MissingKind { field: "type" });
    }

    #[test]
    fn wrong_discriminator_field_is_missing_kind() {
        let err = Schema::Verbose.decode(r#"{"type": "connected"}"#).unwrap_err();
        assert_eq!(err, ProtocolError::MissingKind { field: "tipo" });
    }

    #[test]
    fn known_kind_with_wrong_shape_is_malformed() {
        let err = Schema::Terse.decode(r#"{"type": "rooms", "rooms": "lobby"}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::Malformed(_)));
    }

    #[test]
    fn every_terse_event_kind_decodes() {
        for kind in terse::EVENT_KINDS {
            let text = match *kind {
                "connected" => r#"{"type":"connected"}"#,
                "rooms" => r#"{"type":"rooms","rooms":[]}"#,
                "notice" => r#"{"type":"notice","message":"hi"}"#,
                "message" => r#"{"type":"message","room":"a","sender":"b","message":"c"}"#,
                "user_list" => r#"{"type":"user_list","room":"a","users":[]}"#,
                "error" => r#"{"type":"error","message":"no"}"#,
                other => panic!("kind {other} has no fixture"),
            };
            assert!(Schema::Terse.decode(text).is_ok(), "{kind} failed to decode");
        }
    }

    #[test]
    fn every_verbose_event_kind_decodes() {
        for kind in verbose::EVENT_KINDS {
            let text = match *kind {
                "conectado" => r#"{"tipo":"conectado","mensaje":"hola"}"#,
                "salas_disponibles" => r#"{"tipo":"salas_disponibles","salas":[]}"#,
                "sala_unida" => r#"{"tipo":"sala_unida","sala":"a","usuarios":[]}"#,
                "mensaje" => r#"{"tipo":"mensaje","nombre":"b","contenido":"c"}"#,
                "usuario_entro" => r#"{"tipo":"usuario_entro","nombre":"b"}"#,
                "usuario_salio" => r#"{"tipo":"usuario_salio","nombre":"b"}"#,
                "error" => r#"{"tipo":"error","mensaje":"no"}"#,
                other => panic!("kind {other} has no fixture"),
            };
            assert!(Schema::Verbose.decode(text).is_ok(), "{kind} failed to decode");
        }
    }

    #[test]
    fn every_command_kind_round_trips_through_server_side() {
        let commands = [
            Outbound::Connect { name: "alice".into() },
            Outbound::JoinRoom { room: "lobby".into() },
            Outbound::SendMessage { text: "hi".into() },
            Outbound::ListRooms,
        ];
        for schema in [Schema::Terse, Schema::Verbose] {
            for command in &commands {
                let text = schema.encode(command).unwrap();
                assert_eq!(&schema.decode_command(&text).unwrap(), command, "{schema}");
            }
        }
    }
}
