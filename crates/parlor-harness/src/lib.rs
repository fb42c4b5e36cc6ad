//! Deterministic simulation harness for Parlor.
//!
//! In-process implementations of the server and of the [`parlor_app::Driver`]
//! and [`parlor_app::View`] traits, so the production [`parlor_app::Runtime`]
//! can be exercised end-to-end without sockets or threads.
//!
//! # Components
//!
//! - [`SimServer`]: Chat server speaking either wire schema over text frames
//! - [`SimDriver`]: Driver fed by scripted intents and a shared [`SimServer`]
//! - [`RecordingView`]: View that records every update and the resulting
//!   screen state
//!
//! # Invariant Testing
//!
//! The `invariants` module checks properties of a [`parlor_app::Session`] that
//! must hold after every step, whatever the input sequence.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod invariants;
pub mod recording_view;
pub mod sim_driver;
pub mod sim_server;

pub use invariants::{Invariant, InvariantRegistry, SessionSnapshot, Violation};
pub use recording_view::{RecordingView, ScreenLine};
pub use sim_driver::{SimDriver, SimDriverError, settle};
pub use sim_server::{ClientId, SharedSimServer, SimServer, create_shared_server};
