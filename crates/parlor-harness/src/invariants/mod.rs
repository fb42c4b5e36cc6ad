//! Invariant checking for simulation testing.
//!
//! Invariants are properties that must hold after every step of a session,
//! whatever inputs led there. Unlike example-based tests that check specific
//! scenarios, they are meant to be asserted inside property tests and
//! scripted runs alike.
//!
//! # Architecture
//!
//! Observable state is copied out of a [`Session`] and a [`RecordingView`]
//! into a [`SessionSnapshot`], and registered [`Invariant`] checks run against
//! the snapshot.

mod checks;

use parlor_app::{Phase, Session, TranscriptLine};

pub use checks::{
    ActiveRoomMatchesMembership, IdentityMatchesPhase, RoomStateRequiresMembership,
    ScreenMirrorsTranscript,
};

use crate::{RecordingView, recording_view::ScreenLine};

/// Invariant check result.
pub type InvariantResult = Result<(), Violation>;

/// Invariant violation with context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Name of the violated invariant.
    pub invariant: &'static str,
    /// Description of what went wrong.
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.invariant, self.message)
    }
}

impl std::error::Error for Violation {}

/// Observable state of one client.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    /// Session lifecycle phase.
    pub phase: Phase,
    /// Acknowledged display name.
    pub identity: Option<String>,
    /// Joined room.
    pub membership: Option<String>,
    /// Occupants known to the session.
    pub occupants: Vec<String>,
    /// Session transcript.
    pub transcript: Vec<TranscriptLine>,
    /// What the view shows in its message area.
    pub screen: Vec<ScreenLine>,
    /// Room the view marks active.
    pub active_room: Option<String>,
}

impl SessionSnapshot {
    /// Capture a session and the view it has been rendering to.
    pub fn capture(session: &Session, view: &RecordingView) -> Self {
        Self {
            phase: session.phase(),
            identity: session.identity().map(ToString::to_string),
            membership: session.membership().map(str::to_string),
            occupants: session.occupants().to_vec(),
            transcript: session.transcript().to_vec(),
            screen: view.screen.clone(),
            active_room: view.active_room.clone(),
        }
    }
}

/// An invariant that can be checked against session state.
pub trait Invariant: Send + Sync {
    /// Invariant name for error reporting.
    fn name(&self) -> &'static str;

    /// Check the invariant against the current state.
    fn check(&self, state: &SessionSnapshot) -> InvariantResult;
}

/// Registry of invariants to check.
pub struct InvariantRegistry {
    invariants: Vec<Box<dyn Invariant>>,
}

impl Default for InvariantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InvariantRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { invariants: Vec::new() }
    }

    /// Create a registry with the standard session invariants.
    ///
    /// Includes:
    /// - [`IdentityMatchesPhase`]: identified iff an identity is known
    /// - [`RoomStateRequiresMembership`]: no chat or occupants outside a room
    /// - [`ScreenMirrorsTranscript`]: the view shows exactly the transcript
    /// - [`ActiveRoomMatchesMembership`]: the directory marks the joined room
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.add(IdentityMatchesPhase);
        registry.add(RoomStateRequiresMembership);
        registry.add(ScreenMirrorsTranscript);
        registry.add(ActiveRoomMatchesMembership);
        registry
    }

    /// Add an invariant to the registry.
    pub fn add<I: Invariant + 'static>(&mut self, invariant: I) {
        self.invariants.push(Box::new(invariant));
    }

    /// Check all invariants against the given state.
    ///
    /// Returns `Ok(())` if all invariants hold, or all violations found.
    pub fn check_all(&self, state: &SessionSnapshot) -> Result<(), Vec<Violation>> {
        let violations: Vec<_> =
            self.invariants.iter().filter_map(|inv| inv.check(state).err()).collect();

        if violations.is_empty() { Ok(()) } else { Err(violations) }
    }

    /// Number of registered invariants.
    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }
}
