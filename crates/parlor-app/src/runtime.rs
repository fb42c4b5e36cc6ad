//! Generic runtime for session orchestration.
//!
//! The Runtime drives the event loop, coordinating between:
//! - [`Session`]: identity and room state machine
//! - [`TransportAdapter`]: connection lifecycle and frame codec
//! - [`Driver`]: Platform-specific I/O
//! - [`View`]: rendering
//!
//! Inputs are processed one at a time, so all session state is mutated from a
//! single serialized stream.

use parlor_client::{TransportAction, TransportAdapter};

use crate::{
    Driver, Input, Intent, Phase, Session, SessionAction, SessionConfig, View, ViewUpdate,
};

/// Generic runtime that orchestrates Session, TransportAdapter, Driver and
/// View.
///
/// # Type Parameters
///
/// - `D`: Platform-specific I/O driver
/// - `V`: Rendering surface
pub struct Runtime<D, V>
where
    D: Driver,
    V: View,
{
    driver: D,
    view: V,
    config: SessionConfig,
    session: Session,
    adapter: TransportAdapter,
}

impl<D, V> Runtime<D, V>
where
    D: Driver,
    V: View,
{
    /// Create a new runtime with a fresh session.
    pub fn new(driver: D, view: V, config: SessionConfig) -> Self {
        let session = Session::new(config.clone());
        let adapter = TransportAdapter::new(config.schema);
        Self { driver, view, config, session, adapter }
    }

    /// Run the main event loop until the driver shuts down or the user quits.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn run(&mut self) -> Result<(), D::Error> {
        loop {
            let input = self.driver.next_input().await?;
            if self.process(input).await? {
                break;
            }
        }

        self.driver.hang_up();
        Ok(())
    }

    /// Process one input.
    ///
    /// Returns `true` if the runtime should stop.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn process(&mut self, input: Input) -> Result<bool, D::Error> {
        match input {
            Input::Shutdown | Input::Intent(Intent::Quit) => Ok(true),
            Input::Intent(intent) => {
                if matches!(intent, Intent::Connect { .. }) && self.session.phase() == Phase::Ended {
                    self.renew();
                }
                let actions = self.session.handle_intent(intent);
                self.execute(actions).await?;
                Ok(false)
            },
            Input::Notice(text) => {
                let actions = self.session.notify(text);
                self.execute(actions).await?;
                Ok(false)
            },
            Input::Transport(event) => {
                if let Some(delivery) = self.adapter.handle(event) {
                    let actions = self.session.handle(delivery.into());
                    self.execute(actions).await?;
                }
                Ok(false)
            },
        }
    }

    /// Replace an ended session and its spent adapter, and reset the view to
    /// match.
    fn renew(&mut self) {
        tracing::debug!("starting a new session");
        self.driver.hang_up();
        self.session = Session::new(self.config.clone());
        self.adapter = TransportAdapter::new(self.config.schema);

        let reset = [
            ViewUpdate::ClearMessages,
            ViewUpdate::Occupants(Vec::new()),
            ViewUpdate::RoomDirectory { rooms: Vec::new(), active: None },
        ];
        for update in &reset {
            update.apply(&mut self.view);
        }
    }

    /// Execute actions returned by the Session.
    async fn execute(&mut self, actions: Vec<SessionAction>) -> Result<(), D::Error> {
        for action in actions {
            match action {
                SessionAction::Open { address } => match self.adapter.open(&address) {
                    Ok(action) => self.perform(action).await?,
                    Err(error) => tracing::warn!(%error, "cannot open link"),
                },
                SessionAction::Send(command) => match self.adapter.send(&command) {
                    Ok(action) => self.perform(action).await?,
                    Err(error) => tracing::warn!(%error, kind = command.kind(), "command dropped"),
                },
                SessionAction::View(update) => update.apply(&mut self.view),
            }
        }
        Ok(())
    }

    async fn perform(&mut self, action: TransportAction) -> Result<(), D::Error> {
        match action {
            TransportAction::Dial { address } => self.driver.dial(&address).await,
            TransportAction::Transmit(text) => self.driver.transmit(text).await,
        }
    }

    /// Get a reference to the Session
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Get a reference to the View
    pub fn view(&self) -> &V {
        &self.view
    }

    /// Get a reference to the Driver
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Get a mutable reference to the Driver
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }
}
