//! Terminal client for Parlor
//!
//! A thin shell over [`parlor_app::Driver`] and [`parlor_app::View`] that
//! reads commands from stdin and prints the session as plain lines. All
//! orchestration logic lives in the generic [`parlor_app::Runtime`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod command;
pub mod link;
pub mod terminal;
pub mod view;

pub use command::{Command, USAGE};
pub use link::{Link, SimulatedLink, spawn_simulated};
pub use terminal::{ConnectionMode, RuntimeError, SIMULATED_ADDR, TerminalDriver};
pub use view::TerminalView;
