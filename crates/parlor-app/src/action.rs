//! Session side-effects.
//!
//! This module defines the [`SessionAction`] enum, which represents
//! instructions produced by the [`crate::Session`] state machine for the
//! runtime to execute.

use parlor_proto::Outbound;

use crate::ViewUpdate;

/// Actions produced by the Session state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Open the link to the server.
    Open {
        /// Server address.
        address: String,
    },

    /// Send a command over the link.
    Send(Outbound),

    /// Update the view.
    View(ViewUpdate),
}
