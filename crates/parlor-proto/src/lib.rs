//! Parlor wire protocol
//!
//! Schema-independent envelope model and the two JSON wire vocabularies a
//! Parlor deployment can speak.
//!
//! # Components
//!
//! - [`Outbound`]: Commands the client sends to the server
//! - [`Inbound`]: Events the server sends to the client
//! - [`Schema`]: Wire vocabulary (terse or verbose) with encode/decode
//! - [`ProtocolError`]: Encode and decode failures
//!
//! Envelopes are plain values: constructed, encoded or decoded, and dropped.
//! Each frame on the wire is exactly one JSON object whose kind is carried in a
//! string discriminator field (`type` for terse, `tipo` for verbose).

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod envelope;
pub mod errors;
pub mod schema;

pub use envelope::{Inbound, Outbound, RoomInfo};
pub use errors::{ProtocolError, Result};
pub use schema::Schema;
