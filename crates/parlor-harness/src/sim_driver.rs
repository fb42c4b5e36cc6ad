//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` provides the same interface as the CLI driver but for
//! deterministic testing. It implements [`Driver`] so the same
//! [`parlor_app::Runtime`] orchestration code runs in both production and
//! simulation.
//!
//! Input ordering: frames the server has queued for this client are always
//! delivered before the next scripted intent, so each intent observes a
//! settled session.

use std::collections::VecDeque;

use parlor_app::{Driver, Input, Intent, Runtime, View};
use parlor_client::TransportEvent;
use thiserror::Error;

use crate::{ClientId, SharedSimServer};

/// Error type for simulation driver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimDriverError {
    /// A frame was transmitted without a dialed connection.
    #[error("transmit without a connection")]
    NotDialed,

    /// The shared server lock was poisoned by a panicking test thread.
    #[error("simulated server is poisoned")]
    Poisoned,
}

/// Simulation driver for deterministic testing.
pub struct SimDriver {
    server: SharedSimServer,
    client: Option<ClientId>,
    script: VecDeque<Intent>,
    events: VecDeque<TransportEvent>,
    transmitted: Vec<String>,
    refuse_connections: bool,
}

impl SimDriver {
    /// Create a driver attached to `server`.
    pub fn new(server: SharedSimServer) -> Self {
        Self {
            server,
            client: None,
            script: VecDeque::new(),
            events: VecDeque::new(),
            transmitted: Vec::new(),
            refuse_connections: false,
        }
    }

    /// Queue intents to be returned by [`Driver::next_input`], in order.
    #[must_use]
    pub fn with_script(mut self, intents: impl IntoIterator<Item = Intent>) -> Self {
        self.script.extend(intents);
        self
    }

    /// Make every dial fail as if the server refused the connection.
    #[must_use]
    pub fn refusing_connections(mut self) -> Self {
        self.refuse_connections = true;
        self
    }

    /// Queue one more intent.
    pub fn push_intent(&mut self, intent: Intent) {
        self.script.push_back(intent);
    }

    /// Inject a raw text frame as if the server sent it.
    pub fn inject_text(&mut self, text: impl Into<String>) {
        self.events.push_back(TransportEvent::Text(text.into()));
    }

    /// Simulate the server dropping this connection.
    pub fn drop_connection(&mut self, reason: Option<&str>) {
        if let Some(id) = self.client.take()
            && let Ok(mut server) = self.server.lock()
        {
            server.disconnect(id);
        }
        self.events.push_back(TransportEvent::Closed { reason: reason.map(str::to_string) });
    }

    /// Server-side id of the current connection.
    pub fn client_id(&self) -> Option<ClientId> {
        self.client
    }

    /// Every frame transmitted so far, oldest first.
    pub fn transmitted(&self) -> &[String] {
        &self.transmitted
    }

    /// Take all transmitted frames.
    pub fn take_transmitted(&mut self) -> Vec<String> {
        std::mem::take(&mut self.transmitted)
    }

    /// Next pending transport event, pulling frames from the server first.
    pub fn poll_transport(&mut self) -> Option<TransportEvent> {
        if let Some(id) = self.client
            && let Ok(mut server) = self.server.lock()
        {
            self.events.extend(server.take_outbox(id).into_iter().map(TransportEvent::Text));
        }
        self.events.pop_front()
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;

    async fn next_input(&mut self) -> Result<Input, Self::Error> {
        if let Some(event) = self.poll_transport() {
            return Ok(Input::Transport(event));
        }
        Ok(self.script.pop_front().map_or(Input::Shutdown, Input::Intent))
    }

    async fn dial(&mut self, address: &str) -> Result<(), Self::Error> {
        if self.refuse_connections {
            tracing::debug!(address, "refusing connection");
            self.events.push_back(TransportEvent::Failed { cause: "connection refused".into() });
            self.events.push_back(TransportEvent::Closed { reason: None });
            return Ok(());
        }

        let id = self.server.lock().map_err(|_| SimDriverError::Poisoned)?.connect();
        self.client = Some(id);
        self.events.push_back(TransportEvent::Opened);
        Ok(())
    }

    async fn transmit(&mut self, text: String) -> Result<(), Self::Error> {
        let id = self.client.ok_or(SimDriverError::NotDialed)?;
        self.server.lock().map_err(|_| SimDriverError::Poisoned)?.receive(id, &text);
        self.transmitted.push(text);
        Ok(())
    }

    fn hang_up(&mut self) {
        if let Some(id) = self.client.take()
            && let Ok(mut server) = self.server.lock()
        {
            server.disconnect(id);
        }
    }
}

/// Feed every pending transport event into `runtime`.
///
/// Used when several clients share a server and the test interleaves them by
/// hand instead of calling [`Runtime::run`].
///
/// # Errors
///
/// Returns an error if the driver fails.
pub async fn settle<V: View>(runtime: &mut Runtime<SimDriver, V>) -> Result<(), SimDriverError> {
    while let Some(event) = runtime.driver_mut().poll_transport() {
        runtime.process(Input::Transport(event)).await?;
    }
    Ok(())
}
