//! Standard invariant checks.

use parlor_app::{Phase, TranscriptLine};

use super::{Invariant, InvariantResult, SessionSnapshot, Violation};
use crate::recording_view::ScreenLine;

/// A session is Identified exactly when it knows its identity.
///
/// Ended sessions may have either; the identity outlives the link.
pub struct IdentityMatchesPhase;

impl Invariant for IdentityMatchesPhase {
    fn name(&self) -> &'static str {
        "identity_matches_phase"
    }

    fn check(&self, state: &SessionSnapshot) -> InvariantResult {
        let consistent = match state.phase {
            Phase::Anonymous => state.identity.is_none(),
            Phase::Identified => state.identity.is_some(),
            Phase::Ended => true,
        };
        if consistent {
            return Ok(());
        }
        Err(Violation {
            invariant: self.name(),
            message: format!("phase {:?} with identity {:?}", state.phase, state.identity),
        })
    }
}

/// Without a room there are no occupants and no chat lines.
pub struct RoomStateRequiresMembership;

impl Invariant for RoomStateRequiresMembership {
    fn name(&self) -> &'static str {
        "room_state_requires_membership"
    }

    fn check(&self, state: &SessionSnapshot) -> InvariantResult {
        if state.membership.is_some() {
            return Ok(());
        }
        let has_chat = state.transcript.iter().any(|line| matches!(line, TranscriptLine::Chat(_)));
        if state.occupants.is_empty() && !has_chat {
            return Ok(());
        }
        Err(Violation {
            invariant: self.name(),
            message: format!(
                "no room but {} occupants, chat in transcript: {has_chat}",
                state.occupants.len()
            ),
        })
    }
}

/// The view's message area shows exactly the session transcript.
pub struct ScreenMirrorsTranscript;

impl Invariant for ScreenMirrorsTranscript {
    fn name(&self) -> &'static str {
        "screen_mirrors_transcript"
    }

    fn check(&self, state: &SessionSnapshot) -> InvariantResult {
        let mirrored = state.screen.len() == state.transcript.len()
            && state.screen.iter().zip(&state.transcript).all(|pair| match pair {
                (ScreenLine::System(shown), TranscriptLine::System(kept)) => shown == kept,
                (ScreenLine::Chat(shown), TranscriptLine::Chat(kept)) => shown == kept,
                _ => false,
            });
        if mirrored {
            return Ok(());
        }
        Err(Violation {
            invariant: self.name(),
            message: format!(
                "screen has {} lines, transcript has {}",
                state.screen.len(),
                state.transcript.len()
            ),
        })
    }
}

/// The room the directory marks active is the joined room.
pub struct ActiveRoomMatchesMembership;

impl Invariant for ActiveRoomMatchesMembership {
    fn name(&self) -> &'static str {
        "active_room_matches_membership"
    }

    fn check(&self, state: &SessionSnapshot) -> InvariantResult {
        if state.active_room == state.membership {
            return Ok(());
        }
        Err(Violation {
            invariant: self.name(),
            message: format!(
                "directory marks {:?}, membership is {:?}",
                state.active_room, state.membership
            ),
        })
    }
}
