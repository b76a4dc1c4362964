//! The per-room round state machine: dealing words, opening the vote,
//! and returning to the lobby.
//!
//! Discussion timing is not tracked here. Whoever owns the clock calls
//! [`GameSession::begin_voting`] when the countdown expires (or when a
//! player ends discussion early).

use std::collections::HashMap;

use oddword_protocol::PlayerId;

use crate::{
    GameConfig, GameError, MIN_PLAYERS, Phase, RandomSource, Room, Round, WordCatalog,
};

/// One player's secret for the round. Must only ever be delivered to
/// `player`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub player: PlayerId,
    pub word: String,
    pub is_imposter: bool,
}

/// Drives room phases. Owns the word catalog and the randomness used to
/// deal rounds; rooms themselves are passed in by the caller.
pub struct GameSession {
    catalog: WordCatalog,
    rng: Box<dyn RandomSource>,
    min_players: usize,
}

impl GameSession {
    /// A `min_players` below [`MIN_PLAYERS`] is raised to it.
    pub fn new(
        config: &GameConfig,
        catalog: WordCatalog,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        if config.min_players < MIN_PLAYERS {
            tracing::warn!(
                configured = config.min_players,
                using = MIN_PLAYERS,
                "min_players too low, raising it"
            );
        }
        Self {
            catalog,
            rng,
            min_players: config.min_players.max(MIN_PLAYERS),
        }
    }

    pub fn min_players(&self) -> usize {
        self.min_players
    }

    pub fn catalog(&self) -> &WordCatalog {
        &self.catalog
    }

    /// Deals a new round.
    ///
    /// Valid from `Lobby` and from `Revealed` ("play again"). Draws the
    /// word pair first and the imposter second from the random source.
    /// Returns one [`Assignment`] per player, in roster order.
    ///
    /// # Errors
    /// - [`GameError::PhaseViolation`] — a round is already underway
    /// - [`GameError::InsufficientPlayers`] — roster below the minimum
    pub fn start_round(
        &mut self,
        room: &mut Room,
    ) -> Result<Vec<Assignment>, GameError> {
        if !room.phase.can_start_round() {
            return Err(GameError::PhaseViolation {
                operation: "start a round",
                phase: room.phase,
            });
        }
        // Nothing is drawn from the random source until this passes.
        if room.is_empty() || room.len() < self.min_players {
            return Err(GameError::InsufficientPlayers {
                have: room.len(),
                need: self.min_players,
            });
        }

        let pair = self.catalog.pick_pair(self.rng.as_mut()).clone();
        let imposter = room.players[self.rng.pick_index(room.len())].clone();

        let assignment: HashMap<PlayerId, String> = room
            .players
            .iter()
            .map(|p| {
                let word = if p.id == imposter.id {
                    &pair.imposter
                } else {
                    &pair.regular
                };
                (p.id, word.clone())
            })
            .collect();

        let assignments = room
            .players
            .iter()
            .map(|p| Assignment {
                player: p.id,
                word: assignment[&p.id].clone(),
                is_imposter: p.id == imposter.id,
            })
            .collect();

        room.round = Some(Round {
            pair,
            imposter,
            assignment,
        });
        room.votes.clear();
        room.rounds_played += 1;
        room.phase = Phase::Discussing;

        tracing::info!(
            code = %room.code(),
            round = room.rounds_played,
            players = room.len(),
            "round started"
        );
        Ok(assignments)
    }

    /// Closes discussion and opens the vote. Only valid from
    /// `Discussing`; clears any stale votes.
    ///
    /// # Errors
    /// [`GameError::PhaseViolation`] from any other phase.
    pub fn begin_voting(&self, room: &mut Room) -> Result<(), GameError> {
        if !room.phase.can_transition_to(Phase::Voting) {
            return Err(GameError::PhaseViolation {
                operation: "begin voting",
                phase: room.phase,
            });
        }
        room.votes.clear();
        room.phase = Phase::Voting;
        tracing::info!(code = %room.code(), round = room.rounds_played, "voting started");
        Ok(())
    }

    /// Abandons any round in progress. Valid from every phase; the
    /// roster is left untouched.
    pub fn return_to_lobby(&self, room: &mut Room) {
        room.round = None;
        room.votes.clear();
        room.phase = Phase::Lobby;
        tracing::info!(code = %room.code(), "returned to lobby");
    }
}
