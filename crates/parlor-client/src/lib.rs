//! Client transport
//!
//! Sans-IO transport adapter for the Parlor chat protocol. Owns the lifecycle
//! of the single duplex connection and the text-frame codec, and nothing else:
//! payload semantics belong to the session layer above.
//!
//! # Architecture
//!
//! [`TransportAdapter`] follows the action pattern. The caller feeds it I/O
//! events ([`TransportEvent`]) and outbound envelopes, and it returns
//! [`TransportAction`]s (dial, transmit) for the caller to execute and
//! [`Delivery`] values for the layer above to consume.
//!
//! # Transport (optional)
//!
//! With the `transport` feature enabled, this crate also provides:
//! - [`transport::ConnectedClient`]: Channels to a spawned WebSocket task
//! - [`transport::spawn`]: Start a connection to a server

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod adapter;
mod error;
mod event;

#[cfg(feature = "transport")]
pub mod transport;

pub use adapter::{ConnectionState, TransportAdapter};
pub use error::{SendError, TransportError};
pub use event::{Delivery, TransportAction, TransportEvent};
pub use parlor_proto::{Inbound, Outbound, ProtocolError, Schema};
