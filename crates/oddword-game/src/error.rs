//! Error types for the game core.

use oddword_protocol::RoomCode;

use crate::Phase;

/// Errors returned by the registry, round state machine, and vote tally.
///
/// Every variant except [`GameError::Invariant`] is an expected,
/// recoverable condition that the gateway reports back to the client
/// that caused it. None of them leave a room partially modified.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// No live room has this code.
    #[error("room {0} not found")]
    RoomNotFound(RoomCode),

    /// The room has left its lobby and is not accepting players.
    #[error("room {0} is in progress")]
    RoomInProgress(RoomCode),

    /// Another player in the room already uses this display name.
    #[error("name {0:?} is already taken in this room")]
    NameTaken(String),

    /// A display name is blank or too long.
    #[error("invalid display name: {0}")]
    InvalidName(String),

    /// Too few players to start a round.
    #[error("need at least {need} players to start, have {have}")]
    InsufficientPlayers { have: usize, need: usize },

    /// The operation is not valid in the room's current phase.
    #[error("cannot {operation} while {phase}")]
    PhaseViolation {
        operation: &'static str,
        phase: Phase,
    },

    /// The voter is not in the room.
    #[error("voter {0:?} is not in this room")]
    UnknownVoter(String),

    /// The accused player is not in the room.
    #[error("vote target {0:?} is not in this room")]
    UnknownTarget(String),

    /// A word catalog failed validation.
    #[error("invalid word catalog: {0}")]
    InvalidCatalog(String),

    /// Internal state is inconsistent. This is a bug, not a user error.
    #[error("internal invariant violated: {0}")]
    Invariant(String),
}

impl GameError {
    /// HTTP-style status code used on the wire.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::RoomNotFound(_) => 404,
            Self::RoomInProgress(_) | Self::NameTaken(_) | Self::PhaseViolation { .. } => 409,
            Self::InsufficientPlayers { .. } => 422,
            Self::UnknownVoter(_) | Self::UnknownTarget(_) | Self::InvalidName(_) => 400,
            Self::InvalidCatalog(_) | Self::Invariant(_) => 500,
        }
    }
}
