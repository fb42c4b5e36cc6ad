//! Transport adapter state machine.
//!
//! Owns the connection lifecycle and the frame codec for one logical link.
//! Uses the action pattern: [`TransportAdapter::open`] and
//! [`TransportAdapter::send`] return actions for the caller to execute, and
//! [`TransportAdapter::handle`] turns I/O events into deliveries. No I/O is
//! performed here.
//!
//! # State Machine
//!
//! ```text
//! ┌──────────────┐  open   ┌────────────┐  Opened   ┌──────┐
//! │ Disconnected │────────>│ Connecting │──────────>│ Open │
//! └──────────────┘         └────────────┘           └──────┘
//!                                │                     │
//!                                │ Closed              │ Closed
//!                                ↓                     ↓
//!                           ┌────────┐            ┌────────┐
//!                           │ Closed │            │ Closed │
//!                           └────────┘            └────────┘
//! ```
//!
//! An adapter is single-use: once closed it stays closed.

use parlor_proto::{Outbound, Schema};

use crate::{Delivery, SendError, TransportAction, TransportError, TransportEvent};

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Nothing attempted yet
    #[default]
    Disconnected,
    /// Dial issued, waiting for the handshake
    Connecting,
    /// Frames may flow in both directions
    Open,
    /// Link is gone (graceful, refused or failed)
    Closed,
}

/// Sans-IO adapter for a single duplex text-frame connection.
#[derive(Debug, Clone)]
pub struct TransportAdapter {
    schema: Schema,
    state: ConnectionState,
    address: Option<String>,
}

impl TransportAdapter {
    /// Create an adapter in [`ConnectionState::Disconnected`] that speaks
    /// `schema`.
    pub fn new(schema: Schema) -> Self {
        Self { schema, state: ConnectionState::Disconnected, address: None }
    }

    /// Current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Wire schema used for encoding and decoding.
    #[must_use]
    pub fn schema(&self) -> Schema {
        self.schema
    }

    /// Address passed to [`Self::open`], if any.
    #[must_use]
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// Begin connecting.
    ///
    /// Transitions to Connecting and returns the dial action. Completion is
    /// signalled later by [`TransportEvent::Opened`].
    ///
    /// # Errors
    ///
    /// - `TransportError::InvalidState` if not in Disconnected state
    pub fn open(&mut self, address: &str) -> Result<TransportAction, TransportError> {
        if self.state != ConnectionState::Disconnected {
            return Err(TransportError::InvalidState { state: self.state, operation: "open" });
        }

        self.state = ConnectionState::Connecting;
        self.address = Some(address.to_string());
        tracing::debug!(address, schema = %self.schema, "dialing");

        Ok(TransportAction::Dial { address: address.to_string() })
    }

    /// Encode an envelope for transmission.
    ///
    /// # Errors
    ///
    /// - `SendError::NotConnected` if the link is not open
    /// - `SendError::Encode` if the schema has no form for the envelope
    pub fn send(&mut self, command: &Outbound) -> Result<TransportAction, SendError> {
        if self.state != ConnectionState::Open {
            return Err(SendError::NotConnected { state: self.state });
        }

        let text = self.schema.encode(command)?;
        tracing::trace!(kind = command.kind(), %text, "transmit");

        Ok(TransportAction::Transmit(text))
    }

    /// Process one I/O event.
    ///
    /// Returns `None` when the event makes no sense in the current state
    /// (text before open, a second close); such events are logged and dropped.
    pub fn handle(&mut self, event: TransportEvent) -> Option<Delivery> {
        match (self.state, event) {
            (ConnectionState::Connecting, TransportEvent::Opened) => {
                self.state = ConnectionState::Open;
                tracing::debug!(address = self.address.as_deref(), "link open");
                Some(Delivery::Opened)
            },
            (ConnectionState::Open, TransportEvent::Text(text)) => {
                Some(match self.schema.decode(&text) {
                    Ok(envelope) => Delivery::Envelope(envelope),
                    Err(error) => Delivery::Rejected(error),
                })
            },
            (ConnectionState::Connecting | ConnectionState::Open, TransportEvent::Failed { cause }) => {
                tracing::debug!(%cause, "link failed");
                Some(Delivery::Failed { cause })
            },
            (ConnectionState::Connecting | ConnectionState::Open, TransportEvent::Closed { reason }) => {
                self.state = ConnectionState::Closed;
                tracing::debug!(reason = reason.as_deref(), "link closed");
                Some(Delivery::Closed { reason })
            },
            (state, event) => {
                tracing::warn!(?state, ?event, "dropping transport event");
                None
            },
        }
    }
}
