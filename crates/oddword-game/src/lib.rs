//! Game core for Oddword: rooms, rounds, and votes.
//!
//! Everything here is synchronous and owns no locks. The gateway holds a
//! [`RoomRegistry`] and a [`GameSession`] behind one mutex and applies
//! each client event to completion before the next.
//!
//! # Key types
//!
//! - [`RoomRegistry`] — creates/looks up/deletes rooms by code
//! - [`GameSession`] — deals rounds and moves rooms between phases
//! - [`VoteTally`] — records votes and produces a [`TallyResult`]
//! - [`WordCatalog`] — the fixed list of word pairs
//! - [`RandomSource`] — injectable randomness ([`ThreadRandom`],
//!   [`ScriptedRandom`])
//! - [`Phase`] — `Lobby → Discussing → Voting → Revealed`

mod config;
mod error;
mod random;
mod registry;
mod room;
mod session;
mod tally;
mod words;

pub use config::{EmptyRoomPolicy, GameConfig, MIN_PLAYERS, Phase};
pub use error::GameError;
pub use random::{RandomSource, ScriptedRandom, ThreadRandom};
pub use registry::RoomRegistry;
pub use room::{Player, Room, Round};
pub use session::{Assignment, GameSession};
pub use tally::{TallyResult, VoteTally};
pub use words::{WordCatalog, WordPair};
