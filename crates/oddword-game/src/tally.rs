//! Vote collection and the final reveal.

use std::collections::{BTreeMap, HashSet};

use crate::{GameError, Phase, Room};

/// The outcome of a completed vote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TallyResult {
    /// Accused display name → number of votes. Players nobody voted for
    /// are absent.
    pub counts_by_name: BTreeMap<String, u32>,
    pub imposter_name: String,
    pub regular_word: String,
    pub imposter_word: String,
}

impl TallyResult {
    /// Votes received by `name` (0 if absent).
    pub fn votes_for(&self, name: &str) -> u32 {
        self.counts_by_name.get(name).copied().unwrap_or(0)
    }

    /// `true` only if the imposter holds the unique highest count. A tie
    /// at the top, even one including the imposter, lets them escape.
    pub fn imposter_caught(&self) -> bool {
        let imposter_votes = self.votes_for(&self.imposter_name);
        imposter_votes > 0
            && self
                .counts_by_name
                .iter()
                .all(|(name, &count)| *name == self.imposter_name || count < imposter_votes)
    }
}

/// Records votes and decides when a round's vote is complete.
///
/// Stateless: all vote data lives on the [`Room`].
pub struct VoteTally;

impl VoteTally {
    /// Records `voter`'s accusation of `voted_for`, replacing any earlier
    /// vote by the same voter.
    ///
    /// Returns `Some(result)` and moves the room to `Revealed` once every
    /// current roster member has voted; `None` while votes are missing.
    ///
    /// # Errors
    /// - [`GameError::PhaseViolation`] — the room is not `Voting`
    /// - [`GameError::UnknownVoter`] / [`GameError::UnknownTarget`] —
    ///   a name is not on the current roster
    /// - [`GameError::Invariant`] — the round's imposter has no word
    pub fn record_vote(
        room: &mut Room,
        voter: &str,
        voted_for: &str,
    ) -> Result<Option<TallyResult>, GameError> {
        if room.phase != Phase::Voting {
            return Err(GameError::PhaseViolation {
                operation: "vote",
                phase: room.phase,
            });
        }
        if !room.has_name(voter) {
            return Err(GameError::UnknownVoter(voter.to_string()));
        }
        if !room.has_name(voted_for) {
            return Err(GameError::UnknownTarget(voted_for.to_string()));
        }
        // Surface a broken round before touching the vote set.
        reveal(room)?;

        room.votes
            .insert(voter.to_string(), voted_for.to_string());
        room.trim_votes(None);
        tracing::debug!(
            code = %room.code(),
            voter,
            voted_for,
            votes = room.votes.len(),
            players = room.len(),
            "vote recorded"
        );

        Self::finalize_if_complete(room)
    }

    /// Finalizes the vote if every current roster member has voted.
    ///
    /// Call this after the roster shrinks during `Voting`: the last
    /// holdout leaving completes the vote just like a final ballot
    /// would. Ballots already cast by departed players still count as
    /// long as the vote set is no larger than the roster.
    /// Outside `Voting` this is a no-op returning `None`.
    ///
    /// # Errors
    /// [`GameError::Invariant`] if the round's imposter has no word.
    pub fn finalize_if_complete(
        room: &mut Room,
    ) -> Result<Option<TallyResult>, GameError> {
        if room.phase != Phase::Voting || !Self::is_complete(room) {
            return Ok(None);
        }

        let (imposter_name, regular_word, imposter_word) = reveal(room)?;
        let result = TallyResult {
            counts_by_name: count(room),
            imposter_name,
            regular_word,
            imposter_word,
        };
        room.phase = Phase::Revealed;

        tracing::info!(
            code = %room.code(),
            round = room.rounds_played,
            caught = result.imposter_caught(),
            "votes revealed"
        );
        Ok(Some(result))
    }

    /// `true` once the number of distinct current-member voters equals
    /// the roster size.
    pub fn is_complete(room: &Room) -> bool {
        let voters: HashSet<&str> = room
            .players
            .iter()
            .map(|p| p.name.as_str())
            .filter(|name| room.votes.contains_key(*name))
            .collect();
        !room.is_empty() && voters.len() == room.len()
    }
}

/// Accused name → count. Order-independent: the same set of ballots
/// always produces the same map.
fn count(room: &Room) -> BTreeMap<String, u32> {
    let mut counts = BTreeMap::new();
    for accused in room.votes.values() {
        *counts.entry(accused.clone()).or_insert(0) += 1;
    }
    counts
}

/// Resolves the imposter's name and both words from the dealt round.
fn reveal(room: &Room) -> Result<(String, String, String), GameError> {
    let round = room.round.as_ref().ok_or_else(|| {
        invariant(room, format!("room {} is voting without a round", room.code()))
    })?;
    let imposter_word = round.word_for(round.imposter.id).ok_or_else(|| {
        invariant(
            room,
            format!("imposter {} has no assigned word", round.imposter.id),
        )
    })?;
    Ok((
        round.imposter.name.clone(),
        round.pair.regular.clone(),
        imposter_word.to_string(),
    ))
}

fn invariant(room: &Room, detail: String) -> GameError {
    tracing::error!(code = %room.code(), %detail, "room state is inconsistent");
    GameError::Invariant(detail)
}
