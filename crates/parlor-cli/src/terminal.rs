//! Terminal driver for the CLI.
//!
//! Implements the [`Driver`] trait over stdin lines and a [`Link`]. Uses
//! `tokio::select!` so server frames are shown while the user is typing.

use std::{collections::VecDeque, io};

use parlor_app::{Driver, Input, Intent};
use parlor_client::transport;
use parlor_harness::SharedSimServer;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::{
    command::{self, Command, USAGE},
    link::{self, Link},
};

/// Address shown when running against the in-process server.
pub const SIMULATED_ADDR: &str = "sim://parlor";

/// Terminal driver errors.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// I/O error from the terminal.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Where the driver connects on dial.
#[derive(Clone)]
pub enum ConnectionMode {
    /// WebSocket to the dialed address.
    Remote,
    /// In-process server shared by every dial.
    Simulation(SharedSimServer),
}

enum Source {
    Line(Option<String>),
    Link(Option<parlor_client::TransportEvent>),
}

/// Terminal driver implementing the [`Driver`] trait.
pub struct TerminalDriver {
    lines: Lines<BufReader<Stdin>>,
    link: Option<Link>,
    mode: ConnectionMode,
    queued: VecDeque<Intent>,
}

impl TerminalDriver {
    /// Create a driver reading from stdin.
    pub fn new(mode: ConnectionMode) -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
            link: None,
            mode,
            queued: VecDeque::new(),
        }
    }

    /// Deliver `intent` before reading the first line.
    #[must_use]
    pub fn with_initial(mut self, intent: Intent) -> Self {
        self.queued.push_back(intent);
        self
    }

    async fn next_source(&mut self) -> io::Result<Source> {
        match self.link.as_mut() {
            Some(link) => Ok(tokio::select! {
                line = self.lines.next_line() => Source::Line(line?),
                event = link.from_server().recv() => Source::Link(event),
            }),
            None => Ok(Source::Line(self.lines.next_line().await?)),
        }
    }
}

impl Driver for TerminalDriver {
    type Error = RuntimeError;

    async fn next_input(&mut self) -> Result<Input, Self::Error> {
        loop {
            if let Some(intent) = self.queued.pop_front() {
                return Ok(Input::Intent(intent));
            }

            match self.next_source().await? {
                Source::Line(None) => return Ok(Input::Shutdown),
                Source::Line(Some(line)) => match command::parse(&line) {
                    Command::Intent(intent) => return Ok(Input::Intent(intent)),
                    Command::Help => return Ok(Input::Notice(USAGE.to_string())),
                    Command::Unknown(name) => {
                        return Ok(Input::Notice(format!("unknown command {name}, try /help")));
                    },
                    Command::Empty => {},
                },
                Source::Link(Some(event)) => return Ok(Input::Transport(event)),
                Source::Link(None) => {
                    tracing::debug!("connection task finished");
                    self.link = None;
                },
            }
        }
    }

    async fn dial(&mut self, address: &str) -> Result<(), Self::Error> {
        self.hang_up();
        let link = match &self.mode {
            ConnectionMode::Remote => Link::Remote(transport::spawn(address)),
            ConnectionMode::Simulation(server) => Link::Simulated(link::spawn_simulated(server.clone())),
        };
        tracing::debug!(address, "dialing");
        self.link = Some(link);
        Ok(())
    }

    async fn transmit(&mut self, text: String) -> Result<(), Self::Error> {
        // A finished task has already queued its `Closed` event
        let Some(link) = &self.link else {
            tracing::warn!("transmit without a connection, frame dropped");
            return Ok(());
        };
        if link.to_server().send(text).await.is_err() {
            tracing::warn!("connection task stopped, frame dropped");
        }
        Ok(())
    }

    fn hang_up(&mut self) {
        if let Some(link) = self.link.take() {
            link.stop();
        }
    }
}

impl Drop for TerminalDriver {
    fn drop(&mut self) {
        self.hang_up();
    }
}
