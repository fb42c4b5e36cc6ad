//! Fuzz target for frame decoding in both schemas
//!
//! # Strategy
//!
//! - Raw text: arbitrary UTF-8 through client and server decode paths
//! - Both schemas: every input is tried as terse and as verbose
//!
//! # Invariants
//!
//! - Decoding NEVER panics; bad input is an error
//! - A decoded command encodes again in the same schema
//! - A decoded event encodes again unless the schema cannot express it

#![no_main]

use libfuzzer_sys::fuzz_target;
use parlor_proto::{ProtocolError, Schema};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    for schema in [Schema::Terse, Schema::Verbose] {
        if let Ok(event) = schema.decode(text) {
            match schema.encode_event(&event) {
                Ok(_) | Err(ProtocolError::Unsupported { .. }) => {},
                Err(e) => panic!("{schema} event {event:?} failed to re-encode: {e}"),
            }
        }

        if let Ok(command) = schema.decode_command(text) {
            if let Err(e) = schema.encode(&command) {
                panic!("{schema} command {command:?} failed to re-encode: {e}");
            }
        }
    }
});
