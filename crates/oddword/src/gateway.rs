//! Translates client events into game operations, and game outcomes into
//! addressed server events.
//!
//! The gateway is synchronous and owns no sockets. Each call returns an
//! [`Outcome`]: the events to deliver, already resolved to individual
//! players, plus an optional discussion countdown to arm. The server
//! applies it while still holding the gateway lock, so deliveries from
//! consecutive events never interleave.

use std::time::Duration;

use oddword_game::{
    GameError, GameSession, Phase, Player, Room, RoomRegistry, TallyResult,
    VoteTally,
};
use oddword_protocol::{ClientEvent, PlayerId, RoomCode, ServerEvent};

/// Longest display name accepted, in characters.
pub const MAX_NAME_CHARS: usize = 20;

/// Ask the server to open voting in `code` once discussion time is up,
/// unless the room has moved past round `round` by then.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownRequest {
    pub code: RoomCode,
    pub round: u64,
}

/// What the server must do after the gateway handled something.
#[derive(Debug, Default)]
pub struct Outcome {
    /// Events in delivery order, one entry per recipient.
    pub deliveries: Vec<(PlayerId, ServerEvent)>,
    pub countdown: Option<CountdownRequest>,
}

impl Outcome {
    /// Events addressed to `player`, in delivery order.
    pub fn for_player(&self, player: PlayerId) -> Vec<&ServerEvent> {
        self.deliveries
            .iter()
            .filter(|(to, _)| *to == player)
            .map(|(_, event)| event)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.deliveries.is_empty() && self.countdown.is_none()
    }

    fn to_player(&mut self, player: PlayerId, event: ServerEvent) {
        self.deliveries.push((player, event));
    }

    fn to_room(&mut self, room: &Room, event: ServerEvent) {
        for id in room.player_ids() {
            self.deliveries.push((id, event.clone()));
        }
    }
}

/// Rooms, the round state machine, and the rules for who hears what.
pub struct Gateway {
    registry: RoomRegistry,
    session: GameSession,
    discussion: Duration,
}

impl Gateway {
    pub fn new(
        registry: RoomRegistry,
        session: GameSession,
        discussion: Duration,
    ) -> Self {
        Self {
            registry,
            session,
            discussion,
        }
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    /// Applies one event from `player`.
    pub fn handle(&mut self, player: PlayerId, event: ClientEvent) -> Outcome {
        tracing::debug!(player_id = %player, ?event, "client event");
        let mut out = Outcome::default();
        match event {
            ClientEvent::CreateRoom { display_name } => {
                self.create_room(player, display_name, &mut out);
            }
            ClientEvent::JoinRoom { code, display_name } => {
                self.join_room(player, code, display_name, &mut out);
            }
            ClientEvent::StartRound { code } | ClientEvent::PlayAgain { code } => {
                self.start_round(player, &code, &mut out);
            }
            ClientEvent::BeginVoting { code } => {
                self.begin_voting(player, &code, &mut out);
            }
            ClientEvent::CastVote {
                code,
                voter,
                voted_for,
            } => {
                self.cast_vote(player, &code, &voter, &voted_for, &mut out);
            }
            ClientEvent::ReturnToLobby { code } => {
                self.return_to_lobby(player, &code, &mut out);
            }
            ClientEvent::LeaveRoom => self.leave(player, &mut out),
            // Answered by the connection handler, which owns the clock.
            ClientEvent::Heartbeat { .. } => {}
        }
        out
    }

    /// Removes a player whose connection is gone.
    ///
    /// Remaining players get the new roster. If the room was voting and
    /// everyone still present has now voted, the results go out too.
    pub fn disconnect(&mut self, player: PlayerId) -> Outcome {
        let mut out = Outcome::default();
        self.leave(player, &mut out);
        out
    }

    /// Opens voting when a discussion countdown runs out.
    ///
    /// Ignored if the room is gone, is no longer discussing, or has
    /// started a newer round since the countdown was armed.
    pub fn countdown_expired(&mut self, request: &CountdownRequest) -> Outcome {
        let mut out = Outcome::default();
        let code = &request.code;
        let Ok(room) = self.registry.get_room_mut(code) else {
            tracing::debug!(%code, "countdown expired for a deleted room");
            return out;
        };
        if room.phase() != Phase::Discussing || room.rounds_played() != request.round {
            tracing::debug!(
                %code,
                round = request.round,
                phase = %room.phase(),
                "stale countdown ignored"
            );
            return out;
        }
        match self.session.begin_voting(room) {
            Ok(()) => out.to_room(room, ServerEvent::VotingStarted),
            Err(e) => tracing::warn!(%code, error = %e, "countdown could not open voting"),
        }
        out
    }

    fn create_room(&mut self, player: PlayerId, name: String, out: &mut Outcome) {
        let name = match display_name(&name) {
            Ok(name) => name,
            Err(e) => return refuse(out, player, e),
        };
        let previous = self.registry.remove_player(player);

        let room = self.registry.create_room(Player::new(player, name));
        out.to_player(
            player,
            ServerEvent::RoomCreated {
                code: room.code().clone(),
            },
        );
        out.to_room(room, player_list(room));

        for code in previous {
            self.after_departure(&code, out);
        }
    }

    fn join_room(
        &mut self,
        player: PlayerId,
        code: RoomCode,
        name: String,
        out: &mut Outcome,
    ) {
        let name = match display_name(&name) {
            Ok(name) => name,
            Err(e) => return refuse(out, player, e),
        };
        let previous = self
            .registry
            .room_of(player)
            .filter(|current| **current != code)
            .cloned();

        match self.registry.join_room(&code, Player::new(player, name)) {
            Ok(room) => {
                out.to_player(player, ServerEvent::ok(Some(room.code().clone())));
                out.to_room(room, player_list(room));
            }
            Err(e) => return refuse(out, player, e),
        }

        if let Some(previous) = previous {
            if let Ok(true) = self.registry.leave_room(&previous, player) {
                self.after_departure(&previous, out);
            }
        }
    }

    fn start_round(&mut self, player: PlayerId, code: &RoomCode, out: &mut Outcome) {
        let dealt = match self.registry.get_room_mut(code) {
            Ok(room) => self
                .session
                .start_round(room)
                .map(|deal| (room.rounds_played(), deal)),
            Err(e) => Err(e),
        };
        let (round, deal) = match dealt {
            Ok(dealt) => dealt,
            Err(e) => return refuse(out, player, e),
        };

        let discussion_secs = self.discussion.as_secs();
        for assignment in deal {
            out.to_player(
                assignment.player,
                ServerEvent::RoundStarted {
                    word: assignment.word,
                    is_imposter: assignment.is_imposter,
                    discussion_secs,
                },
            );
        }
        out.to_player(player, ServerEvent::ok(None));
        out.countdown = Some(CountdownRequest {
            code: code.clone(),
            round,
        });
    }

    fn begin_voting(&mut self, player: PlayerId, code: &RoomCode, out: &mut Outcome) {
        let room = match self.registry.get_room_mut(code) {
            Ok(room) => room,
            Err(e) => return report(out, player, e),
        };
        match self.session.begin_voting(room) {
            Ok(()) => out.to_room(room, ServerEvent::VotingStarted),
            Err(e) => report(out, player, e),
        }
    }

    fn cast_vote(
        &mut self,
        player: PlayerId,
        code: &RoomCode,
        voter: &str,
        voted_for: &str,
        out: &mut Outcome,
    ) {
        let room = match self.registry.get_room_mut(code) {
            Ok(room) => room,
            Err(e) => return report(out, player, e),
        };
        match VoteTally::record_vote(room, voter, voted_for) {
            Ok(Some(result)) => out.to_room(room, revealed(result)),
            Ok(None) => {}
            Err(e) => report(out, player, e),
        }
    }

    fn return_to_lobby(&mut self, player: PlayerId, code: &RoomCode, out: &mut Outcome) {
        match self.registry.get_room_mut(code) {
            Ok(room) => {
                self.session.return_to_lobby(room);
                out.to_room(room, ServerEvent::BackToLobby);
            }
            Err(e) => report(out, player, e),
        }
    }

    fn leave(&mut self, player: PlayerId, out: &mut Outcome) {
        for code in self.registry.remove_player(player) {
            self.after_departure(&code, out);
        }
    }

    /// Reaps the room if it emptied, otherwise re-announces the roster
    /// and re-checks a pending vote.
    fn after_departure(&mut self, code: &RoomCode, out: &mut Outcome) {
        if !self.registry.reap(std::slice::from_ref(code)).is_empty() {
            return;
        }
        let Ok(room) = self.registry.get_room_mut(code) else {
            return;
        };
        if room.is_empty() {
            return;
        }
        out.to_room(room, player_list(room));
        // Invariant failures are logged by the tally itself.
        if let Ok(Some(result)) = VoteTally::finalize_if_complete(room) {
            out.to_room(room, revealed(result));
        }
    }
}

fn player_list(room: &Room) -> ServerEvent {
    ServerEvent::PlayerList {
        players: room.player_names(),
        host: room.host().map(|p| p.name.clone()),
    }
}

fn revealed(result: TallyResult) -> ServerEvent {
    let imposter_caught = result.imposter_caught();
    ServerEvent::VotesRevealed {
        counts_by_name: result.counts_by_name,
        imposter_name: result.imposter_name,
        regular_word: result.regular_word,
        imposter_word: result.imposter_word,
        imposter_caught,
    }
}

/// Trims `raw` and checks it is non-empty and at most
/// [`MAX_NAME_CHARS`] long.
fn display_name(raw: &str) -> Result<String, GameError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(GameError::InvalidName("name is blank".into()));
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(GameError::InvalidName(format!(
            "name is longer than {MAX_NAME_CHARS} characters"
        )));
    }
    Ok(name.to_string())
}

/// Rejects a create, join, or round start with a failed `Reply`.
fn refuse(out: &mut Outcome, player: PlayerId, error: GameError) {
    tracing::debug!(player_id = %player, error = %error, "request refused");
    out.to_player(player, ServerEvent::failed(error.to_string()));
}

/// Rejects an in-round request with an `Error` event.
fn report(out: &mut Outcome, player: PlayerId, error: GameError) {
    tracing::debug!(player_id = %player, error = %error, "request rejected");
    out.to_player(
        player,
        ServerEvent::Error {
            code: error.status_code(),
            message: error.to_string(),
        },
    );
}
