//! The `Room` entity: roster, phase, and the state of the current round.
//!
//! Fields are private; only the registry, the round state machine, and
//! the vote tally (all in this crate) mutate a room.

use std::collections::HashMap;

use oddword_protocol::{PlayerId, RoomCode};

use crate::{Phase, WordPair};

/// A player in a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// Connection-assigned identity.
    pub id: PlayerId,
    /// User-chosen display name. Unique within a room, not across rooms.
    pub name: String,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// The secret state of one round: who got which word.
#[derive(Debug, Clone)]
pub struct Round {
    pub(crate) pair: WordPair,
    pub(crate) imposter: Player,
    pub(crate) assignment: HashMap<PlayerId, String>,
}

impl Round {
    pub fn pair(&self) -> &WordPair {
        &self.pair
    }

    /// The imposter as they were when the round was dealt. They may have
    /// left the room since.
    pub fn imposter(&self) -> &Player {
        &self.imposter
    }

    /// The word dealt to `player`, if they were in the room at deal time.
    pub fn word_for(&self, player: PlayerId) -> Option<&str> {
        self.assignment.get(&player).map(String::as_str)
    }

    pub fn assignment(&self) -> &HashMap<PlayerId, String> {
        &self.assignment
    }
}

/// A game room.
#[derive(Debug, Clone)]
pub struct Room {
    code: RoomCode,
    pub(crate) players: Vec<Player>,
    pub(crate) phase: Phase,
    pub(crate) round: Option<Round>,
    /// Voter display name → accused display name.
    pub(crate) votes: HashMap<String, String>,
    pub(crate) rounds_played: u64,
}

impl Room {
    pub(crate) fn new(code: RoomCode, first: Player) -> Self {
        Self {
            code,
            players: vec![first],
            phase: Phase::Lobby,
            round: None,
            votes: HashMap::new(),
            rounds_played: 0,
        }
    }

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    /// The roster in join order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The current round, present in every phase except `Lobby`.
    pub fn round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    pub fn votes(&self) -> &HashMap<String, String> {
        &self.votes
    }

    /// How many rounds have been dealt in this room. Increases by one on
    /// every successful round start and never resets.
    pub fn rounds_played(&self) -> u64 {
        self.rounds_played
    }

    /// The host is whoever has been in the room longest.
    pub fn host(&self) -> Option<&Player> {
        self.players.first()
    }

    /// Display names in roster order.
    pub fn player_names(&self) -> Vec<String> {
        self.players.iter().map(|p| p.name.clone()).collect()
    }

    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|p| p.id).collect()
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.players.iter().any(|p| p.id == id)
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.players.iter().any(|p| p.name == name)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Appends `player` unless their id is already present.
    /// Returns `true` if the roster changed.
    pub(crate) fn add_player(&mut self, player: Player) -> bool {
        if self.contains(player.id) {
            return false;
        }
        self.players.push(player);
        true
    }

    /// Returns `true` if the player was in the roster.
    ///
    /// A departed player's ballot is kept while the vote set still fits
    /// the smaller roster; see [`trim_votes`](Self::trim_votes).
    pub(crate) fn remove_player(&mut self, id: PlayerId) -> bool {
        let Some(index) = self.players.iter().position(|p| p.id == id) else {
            return false;
        };
        let departed = self.players.remove(index);
        self.trim_votes(Some(&departed.name));
        true
    }

    /// Drops ballots cast by players no longer on the roster until the
    /// vote set is no larger than the roster. `prefer` is evicted first;
    /// after that, departed voters go in name order. Ballots of current
    /// members are never dropped.
    pub(crate) fn trim_votes(&mut self, prefer: Option<&str>) {
        while self.votes.len() > self.players.len() {
            let stale = match prefer.filter(|name| {
                self.votes.contains_key(*name) && !self.has_name(name)
            }) {
                Some(name) => name.to_string(),
                None => match self.votes.keys().filter(|v| !self.has_name(v)).min() {
                    Some(name) => name.clone(),
                    None => break,
                },
            };
            self.votes.remove(&stale);
        }
    }
}
