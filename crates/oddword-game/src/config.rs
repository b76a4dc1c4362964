//! Game configuration and the round phase state machine.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// GameConfig
// ---------------------------------------------------------------------------

/// Fewest players a round can be dealt to: one imposter and at least two
/// players holding the regular word.
pub const MIN_PLAYERS: usize = 3;

/// What the registry does with a room once its last player leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EmptyRoomPolicy {
    /// Delete the room; its code becomes free for reuse.
    #[default]
    Delete,
    /// Keep the room registered with an empty roster.
    Retain,
}

/// Tunables for rooms and rounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Minimum roster size to start a round. Values below
    /// [`MIN_PLAYERS`] are raised to it.
    pub min_players: usize,

    /// Number of characters in generated room codes.
    pub code_length: usize,

    /// Applied by [`RoomRegistry::reap`](crate::RoomRegistry::reap).
    pub empty_room_policy: EmptyRoomPolicy,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            min_players: MIN_PLAYERS,
            code_length: 5,
            empty_room_policy: EmptyRoomPolicy::Delete,
        }
    }
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// The stage a room's round is in.
///
/// ```text
///           ┌──────────── play again ─────────────┐
///           ▼                                     │
/// Lobby → Discussing → Voting → Revealed ─────────┤
///   ▲                                             │
///   └────────────── return to lobby (any) ────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Lobby,
    Discussing,
    Voting,
    Revealed,
}

impl Phase {
    /// Returns `true` if the room accepts new players.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Lobby)
    }

    /// Returns `true` if a new round may be dealt from this phase.
    pub fn can_start_round(&self) -> bool {
        matches!(self, Self::Lobby | Self::Revealed)
    }

    /// Returns `true` if moving to `target` is a legal transition.
    pub fn can_transition_to(self, target: Self) -> bool {
        match (self, target) {
            (_, Self::Lobby) => true,
            (Self::Lobby | Self::Revealed, Self::Discussing) => true,
            (Self::Discussing, Self::Voting) => true,
            (Self::Voting, Self::Revealed) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lobby => write!(f, "Lobby"),
            Self::Discussing => write!(f, "Discussing"),
            Self::Voting => write!(f, "Voting"),
            Self::Revealed => write!(f, "Revealed"),
        }
    }
}
