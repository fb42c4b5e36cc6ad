//! Session configuration.

use parlor_proto::Schema;

/// Default server address.
pub const DEFAULT_SERVER_ADDR: &str = "ws://localhost:8765";

/// Per-deployment session settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Address dialed on connect.
    pub server_addr: String,
    /// Wire schema spoken end-to-end.
    pub schema: Schema,
    /// Switch rooms when the join is requested instead of on confirmation.
    pub optimistic_join: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            server_addr: DEFAULT_SERVER_ADDR.to_string(),
            schema: Schema::default(),
            optimistic_join: false,
        }
    }
}
