//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the runtime from specific I/O
//! implementations. Each front-end implements the trait to provide
//! platform-specific input and socket handling, while the generic
//! [`crate::Runtime`] handles all orchestration.

use std::future::Future;

use parlor_client::TransportEvent;

use crate::Intent;

/// One item from the serialized input stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// The user asked for something.
    Intent(Intent),
    /// The socket reported something.
    Transport(TransportEvent),
    /// Local feedback for the user, such as a usage hint.
    Notice(String),
    /// Input is exhausted; stop the runtime.
    Shutdown,
}

/// Abstracts I/O operations for the runtime.
///
/// Implementations merge user input and socket events into one stream and
/// carry out the socket actions the runtime decides on.
///
/// # Implementations
///
/// - **CLI**: stdin lines and a WebSocket task
/// - **Simulation**: scripted intents and an in-process server
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Wait for the next input.
    ///
    /// # Errors
    ///
    /// Returns an error if the input source fails.
    fn next_input(&mut self) -> impl Future<Output = Result<Input, Self::Error>> + Send;

    /// Start connecting to `address`.
    ///
    /// The outcome is reported later through [`Input::Transport`].
    ///
    /// # Errors
    ///
    /// Returns an error if the attempt cannot even be started.
    fn dial(&mut self, address: &str) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Write one text frame to the open link.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame cannot be handed to the socket.
    fn transmit(&mut self, text: String) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Drop the link and clean up resources.
    fn hang_up(&mut self);
}
