//! WebSocket transport for the client.
//!
//! Provides [`ConnectedClient`], which runs the socket in a spawned task and
//! exposes it as a pair of channels. This is a thin layer that only moves
//! text frames and lifecycle events; everything else stays in the Sans-IO
//! [`TransportAdapter`](crate::TransportAdapter).

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::{TransportError, TransportEvent};

/// Capacity of both channels between the caller and the socket task.
const CHANNEL_CAPACITY: usize = 32;

/// Handle to a WebSocket connection task.
///
/// Text frames are sent via `to_server`; lifecycle events and received frames
/// arrive on `from_server`. The first event is `Opened`, or `Failed` followed by
/// `Closed` if the connection could not be established. `Closed` is always the
/// last event.
pub struct ConnectedClient {
    /// Send text frames to the server.
    pub to_server: mpsc::Sender<String>,
    /// Receive transport events.
    pub from_server: mpsc::Receiver<TransportEvent>,
    /// Abort handle to stop the connection task.
    abort_handle: tokio::task::AbortHandle,
}

impl ConnectedClient {
    /// Stop the connection.
    pub fn stop(&self) {
        self.abort_handle.abort();
    }
}

/// Start connecting to a WebSocket server at `url`.
///
/// Returns immediately; the outcome of the handshake is reported on
/// [`ConnectedClient::from_server`]. Must be called within a tokio runtime.
pub fn spawn(url: &str) -> ConnectedClient {
    let (to_server_tx, to_server_rx) = mpsc::channel::<String>(CHANNEL_CAPACITY);
    let (from_server_tx, from_server_rx) = mpsc::channel::<TransportEvent>(CHANNEL_CAPACITY);

    let handle = tokio::spawn(run_connection(url.to_string(), to_server_rx, from_server_tx));

    ConnectedClient {
        to_server: to_server_tx,
        from_server: from_server_rx,
        abort_handle: handle.abort_handle(),
    }
}

/// Run the connection, bridging between channels and the socket.
async fn run_connection(
    url: String,
    mut to_server: mpsc::Receiver<String>,
    events: mpsc::Sender<TransportEvent>,
) {
    let stream = match connect_async(url.as_str()).await {
        Ok((stream, _response)) => stream,
        Err(e) => {
            let cause = TransportError::Connection(e.to_string()).to_string();
            tracing::debug!(%url, %cause, "connect failed");
            let _ = events.send(TransportEvent::Failed { cause }).await;
            let _ = events.send(TransportEvent::Closed { reason: None }).await;
            return;
        },
    };

    tracing::debug!(%url, "websocket connected");
    if events.send(TransportEvent::Opened).await.is_err() {
        return;
    }

    let (mut write, mut read) = stream.split();

    let reason = loop {
        tokio::select! {
            outgoing = to_server.recv() => match outgoing {
                Some(text) => {
                    if let Err(e) = write.send(Message::Text(text.into())).await {
                        let cause = TransportError::Stream(e.to_string()).to_string();
                        let _ = events.send(TransportEvent::Failed { cause }).await;
                        break None;
                    }
                },
                None => {
                    // Caller hung up
                    let _ = write.send(Message::Close(None)).await;
                    break None;
                },
            },
            incoming = read.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    if events.send(TransportEvent::Text(text.to_string())).await.is_err() {
                        break None;
                    }
                },
                Some(Ok(Message::Binary(bytes))) => {
                    tracing::debug!(len = bytes.len(), "ignoring binary frame");
                },
                Some(Ok(Message::Close(frame))) => {
                    break frame.map(|f| f.reason.to_string()).filter(|r| !r.is_empty());
                },
                Some(Ok(_)) => {},
                Some(Err(e)) => {
                    let cause = TransportError::Stream(e.to_string()).to_string();
                    let _ = events.send(TransportEvent::Failed { cause }).await;
                    break None;
                },
                None => break None,
            },
        }
    };

    let _ = events.send(TransportEvent::Closed { reason }).await;
}
