//! Room registry: creates, tracks, and deletes rooms by code.

use std::collections::HashMap;

use oddword_protocol::{PlayerId, RoomCode};

use crate::{EmptyRoomPolicy, GameConfig, GameError, Player, RandomSource, Room};

/// Characters used in generated room codes.
const CODE_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Consecutive collisions tolerated before codes grow by one character.
const COLLISIONS_PER_LENGTH: u32 = 16;

/// The authoritative map of every live room.
///
/// The registry is a plain owned value: the gateway holds one behind
/// its lock, and each test builds its own. It never deletes a room
/// implicitly; callers decide via [`reap`](Self::reap), which applies
/// the configured [`EmptyRoomPolicy`].
pub struct RoomRegistry {
    rooms: HashMap<RoomCode, Room>,
    config: GameConfig,
    rng: Box<dyn RandomSource>,
}

impl RoomRegistry {
    pub fn new(config: GameConfig, rng: Box<dyn RandomSource>) -> Self {
        Self {
            rooms: HashMap::new(),
            config,
            rng,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Creates a room in `Lobby` with `first` as its only player.
    pub fn create_room(&mut self, first: Player) -> &Room {
        let code = self.fresh_code();
        let player_id = first.id;
        tracing::info!(%code, %player_id, "room created");
        self.rooms
            .entry(code.clone())
            .or_insert_with(|| Room::new(code, first))
    }

    /// Adds `player` to the room with `code`.
    ///
    /// Re-joining with an id that is already on the roster succeeds
    /// without adding a duplicate entry.
    ///
    /// Display names are unique within a room, since votes name voters
    /// and targets by display name.
    ///
    /// # Errors
    /// - [`GameError::RoomNotFound`] — no such room
    /// - [`GameError::RoomInProgress`] — the room has left its lobby
    /// - [`GameError::NameTaken`] — another player already uses the name
    pub fn join_room(
        &mut self,
        code: &RoomCode,
        player: Player,
    ) -> Result<&Room, GameError> {
        let room = self
            .rooms
            .get_mut(code)
            .ok_or_else(|| GameError::RoomNotFound(code.clone()))?;

        if !room.phase().is_joinable() {
            return Err(GameError::RoomInProgress(code.clone()));
        }
        if !room.contains(player.id) && room.has_name(&player.name) {
            return Err(GameError::NameTaken(player.name));
        }

        let player_id = player.id;
        if room.add_player(player) {
            tracing::info!(
                %code,
                %player_id,
                players = room.len(),
                "player joined"
            );
        }
        Ok(room)
    }

    /// # Errors
    /// [`GameError::RoomNotFound`] if no room has this code.
    pub fn get_room(&self, code: &RoomCode) -> Result<&Room, GameError> {
        self.rooms
            .get(code)
            .ok_or_else(|| GameError::RoomNotFound(code.clone()))
    }

    /// Mutable lookup for the round state machine and the vote tally.
    ///
    /// # Errors
    /// [`GameError::RoomNotFound`] if no room has this code.
    pub fn get_room_mut(
        &mut self,
        code: &RoomCode,
    ) -> Result<&mut Room, GameError> {
        self.rooms
            .get_mut(code)
            .ok_or_else(|| GameError::RoomNotFound(code.clone()))
    }

    /// Removes the player from every room they appear in.
    ///
    /// Returns the codes of the rooms whose roster changed. Empty rooms
    /// are left in place; pass the result to [`reap`](Self::reap).
    pub fn remove_player(&mut self, player_id: PlayerId) -> Vec<RoomCode> {
        let mut touched = Vec::new();
        for (code, room) in self.rooms.iter_mut() {
            if room.remove_player(player_id) {
                tracing::info!(
                    %code,
                    %player_id,
                    players = room.len(),
                    "player left"
                );
                touched.push(code.clone());
            }
        }
        touched.sort();
        touched
    }

    /// Removes the player from one room only. Returns `true` if they
    /// were on its roster. Like [`remove_player`](Self::remove_player),
    /// an emptied room is left for [`reap`](Self::reap).
    ///
    /// # Errors
    /// [`GameError::RoomNotFound`] if no room has this code.
    pub fn leave_room(
        &mut self,
        code: &RoomCode,
        player_id: PlayerId,
    ) -> Result<bool, GameError> {
        let room = self.get_room_mut(code)?;
        let removed = room.remove_player(player_id);
        if removed {
            tracing::info!(%code, %player_id, players = room.len(), "player left");
        }
        Ok(removed)
    }

    /// Applies the empty-room policy to `codes`, returning the codes of
    /// the rooms that were deleted.
    pub fn reap(&mut self, codes: &[RoomCode]) -> Vec<RoomCode> {
        if self.config.empty_room_policy == EmptyRoomPolicy::Retain {
            return Vec::new();
        }
        let mut deleted = Vec::new();
        for code in codes {
            if self.rooms.get(code).is_some_and(Room::is_empty) {
                self.rooms.remove(code);
                tracing::info!(%code, "empty room deleted");
                deleted.push(code.clone());
            }
        }
        deleted
    }

    /// Unconditionally deletes a room.
    ///
    /// # Errors
    /// [`GameError::RoomNotFound`] if no room has this code.
    pub fn delete_room(&mut self, code: &RoomCode) -> Result<Room, GameError> {
        let room = self
            .rooms
            .remove(code)
            .ok_or_else(|| GameError::RoomNotFound(code.clone()))?;
        tracing::info!(%code, "room deleted");
        Ok(room)
    }

    /// Ordered display names for the room's roster broadcast.
    ///
    /// # Errors
    /// [`GameError::RoomNotFound`] if no room has this code.
    pub fn player_names(&self, code: &RoomCode) -> Result<Vec<String>, GameError> {
        Ok(self.get_room(code)?.player_names())
    }

    /// The code of the room `player_id` is in, if any.
    pub fn room_of(&self, player_id: PlayerId) -> Option<&RoomCode> {
        self.rooms
            .iter()
            .find(|(_, room)| room.contains(player_id))
            .map(|(code, _)| code)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Every live room code, sorted.
    pub fn codes(&self) -> Vec<RoomCode> {
        let mut codes: Vec<RoomCode> = self.rooms.keys().cloned().collect();
        codes.sort();
        codes
    }

    /// Draws codes until one is free. After every
    /// `COLLISIONS_PER_LENGTH` consecutive collisions the code grows by
    /// one character, so a crowded code space cannot spin forever.
    fn fresh_code(&mut self) -> RoomCode {
        let mut length = self.config.code_length.max(1);
        let mut collisions = 0u32;
        loop {
            let code = self.random_code(length);
            if !self.rooms.contains_key(&code) {
                return code;
            }
            collisions += 1;
            tracing::debug!(%code, collisions, "room code collision");
            if collisions % COLLISIONS_PER_LENGTH == 0 {
                length += 1;
            }
        }
    }

    fn random_code(&mut self, length: usize) -> RoomCode {
        let raw: String = (0..length)
            .map(|_| {
                CODE_ALPHABET[self.rng.pick_index(CODE_ALPHABET.len())] as char
            })
            .collect();
        RoomCode::new(raw)
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(GameConfig::default(), Box::new(crate::ThreadRandom))
    }
}
