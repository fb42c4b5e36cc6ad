//! Connections the terminal driver can hold.
//!
//! Both kinds expose the same pair of channels, so the driver does not care
//! whether frames travel over a WebSocket or to an in-process server.

use parlor_client::{TransportEvent, transport::ConnectedClient};
use parlor_harness::SharedSimServer;
use tokio::sync::mpsc;

/// Capacity of the channels to and from the simulated server task.
const CHANNEL_CAPACITY: usize = 32;

/// Handle to a connection with an in-process [`parlor_harness::SimServer`].
pub struct SimulatedLink {
    /// Send text frames to the server.
    pub to_server: mpsc::Sender<String>,
    /// Receive transport events.
    pub from_server: mpsc::Receiver<TransportEvent>,
    abort_handle: tokio::task::AbortHandle,
}

impl SimulatedLink {
    /// Stop the server task.
    pub fn stop(&self) {
        self.abort_handle.abort();
    }
}

/// Connect to `server` from a spawned task.
///
/// Reports `Opened` first, then every frame the server addresses to this
/// connection. Dropping the sender side disconnects and reports `Closed`.
pub fn spawn_simulated(server: SharedSimServer) -> SimulatedLink {
    let (to_server_tx, mut to_server_rx) = mpsc::channel::<String>(CHANNEL_CAPACITY);
    let (events_tx, events_rx) = mpsc::channel::<TransportEvent>(CHANNEL_CAPACITY);

    let handle = tokio::spawn(async move {
        let Some(id) = server.lock().ok().map(|mut server| server.connect()) else {
            let _ = events_tx.send(TransportEvent::Failed { cause: "server unavailable".into() }).await;
            let _ = events_tx.send(TransportEvent::Closed { reason: None }).await;
            return;
        };

        if events_tx.send(TransportEvent::Opened).await.is_err() {
            return;
        }

        while let Some(text) = to_server_rx.recv().await {
            let replies = server.lock().ok().map(|mut server| {
                server.receive(id, &text);
                server.take_outbox(id)
            });
            let Some(replies) = replies else {
                tracing::warn!(%id, "simulated server is poisoned");
                break;
            };
            for reply in replies {
                if events_tx.send(TransportEvent::Text(reply)).await.is_err() {
                    return;
                }
            }
        }

        if let Ok(mut server) = server.lock() {
            server.disconnect(id);
        }
        let _ = events_tx.send(TransportEvent::Closed { reason: None }).await;
    });

    SimulatedLink { to_server: to_server_tx, from_server: events_rx, abort_handle: handle.abort_handle() }
}

/// Connection held by the terminal driver.
pub enum Link {
    /// WebSocket connection to a remote server.
    Remote(ConnectedClient),
    /// In-process simulated server.
    Simulated(SimulatedLink),
}

impl Link {
    /// Channel for outgoing text frames.
    pub fn to_server(&self) -> &mpsc::Sender<String> {
        match self {
            Link::Remote(client) => &client.to_server,
            Link::Simulated(link) => &link.to_server,
        }
    }

    /// Channel of transport events.
    pub fn from_server(&mut self) -> &mut mpsc::Receiver<TransportEvent> {
        match self {
            Link::Remote(client) => &mut client.from_server,
            Link::Simulated(link) => &mut link.from_server,
        }
    }

    /// Stop the connection task.
    pub fn stop(&self) {
        match self {
            Link::Remote(client) => client.stop(),
            Link::Simulated(link) => link.stop(),
        }
    }
}
