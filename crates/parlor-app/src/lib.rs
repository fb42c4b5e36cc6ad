//! Application layer for Parlor
//!
//! Pure session state machine and generic runtime for chat clients, so the
//! same orchestration code runs in the terminal front-end and in simulation.
//!
//! # Components
//!
//! - [`Session`]: Identity, room membership and dispatch of server envelopes
//! - [`View`]: Contract implemented by whatever renders the session
//! - [`Driver`]: Trait for platform-specific I/O abstraction
//! - [`Runtime`]: Generic orchestration loop using Driver

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod config;
mod driver;
mod error;
mod event;
mod intent;
mod runtime;
mod session;
mod state;
mod view;

pub use action::SessionAction;
pub use config::SessionConfig;
pub use driver::{Driver, Input};
pub use error::ValidationError;
pub use event::SessionEvent;
pub use intent::Intent;
pub use parlor_client::ConnectionState;
pub use runtime::Runtime;
pub use session::Session;
pub use state::{ChatLine, Identity, Phase, TranscriptLine};
pub use view::{View, ViewUpdate};
