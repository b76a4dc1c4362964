//! Core protocol types for Oddword's wire format.
//!
//! Every type here travels "on the wire": the browser sends
//! [`ClientEvent`]s, the server answers with [`ServerEvent`]s, and both
//! are wrapped in an [`Envelope`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The current protocol version, announced in [`ServerEvent::Welcome`].
pub const PROTOCOL_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a connected player.
///
/// Assigned by the transport when the connection is accepted and stable
/// for the lifetime of that connection. Serialized as a plain number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// The short code players type to join a room.
///
/// Codes are case-insensitive: every constructor (including
/// deserialization) trims surrounding whitespace and upper-cases the
/// input, so `"ab12c"` and `" AB12C "` name the same room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct RoomCode(String);

impl RoomCode {
    /// Normalizes `raw` into a room code.
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_ascii_uppercase())
    }

    /// Returns the normalized code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RoomCode {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<&str> for RoomCode {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<RoomCode> for String {
    fn from(code: RoomCode) -> Self {
        code.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// ClientEvent — browser → server
// ---------------------------------------------------------------------------

/// Events a browser sends to the server.
///
/// Internally tagged: `{ "type": "JoinRoom", "code": "AB12C", "display_name": "Ann" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    /// Create a fresh room with the sender as its only player.
    CreateRoom { display_name: String },

    /// Join an existing room that is still in its lobby.
    JoinRoom {
        code: RoomCode,
        display_name: String,
    },

    /// Deal words and pick an imposter.
    StartRound { code: RoomCode },

    /// End discussion early (or on countdown expiry) and open voting.
    BeginVoting { code: RoomCode },

    /// Accuse a player. Names are display names, as shown in the roster.
    CastVote {
        code: RoomCode,
        voter: String,
        voted_for: String,
    },

    /// Start another round straight from the results screen.
    PlayAgain { code: RoomCode },

    /// Abandon the current round and go back to the lobby.
    ReturnToLobby { code: RoomCode },

    /// Leave whatever room the sender is in, keeping the connection open.
    LeaveRoom,

    /// Keep-alive. `client_time` is echoed back for RTT measurement.
    Heartbeat { client_time: u64 },
}

// ---------------------------------------------------------------------------
// ServerEvent — server → browser
// ---------------------------------------------------------------------------

/// Events the server sends to browsers.
///
/// Some are room-wide broadcasts (`PlayerList`, `VotingStarted`,
/// `VotesRevealed`, `BackToLobby`); `RoundStarted` is always addressed
/// to exactly one player because it carries that player's secret word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// First event on every connection.
    Welcome {
        player_id: PlayerId,
        protocol_version: u32,
    },

    /// Answer to `CreateRoom`.
    RoomCreated { code: RoomCode },

    /// Generic success/failure answer to `JoinRoom`, `StartRound` and
    /// `PlayAgain`.
    Reply {
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code: Option<RoomCode>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// The ordered roster of display names. `host` is the first entry.
    PlayerList {
        players: Vec<String>,
        host: Option<String>,
    },

    /// Individually addressed: this player's word for the round.
    RoundStarted {
        word: String,
        is_imposter: bool,
        discussion_secs: u64,
    },

    /// Discussion is over; everyone should vote.
    VotingStarted,

    /// Every player has voted.
    VotesRevealed {
        counts_by_name: BTreeMap<String, u32>,
        imposter_name: String,
        regular_word: String,
        imposter_word: String,
        imposter_caught: bool,
    },

    /// The room went back to its lobby; clear any round state.
    BackToLobby,

    /// Answer to `Heartbeat`.
    HeartbeatAck { client_time: u64, server_time: u64 },

    /// A request failed. `code` follows HTTP conventions (400, 404, 409, ...).
    Error { code: u16, message: String },
}

impl ServerEvent {
    /// A successful `Reply`, optionally echoing the room code.
    pub fn ok(code: Option<RoomCode>) -> Self {
        Self::Reply {
            success: true,
            code,
            message: None,
        }
    }

    /// A failed `Reply` carrying a human-readable reason.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Reply {
            success: false,
            code: None,
            message: Some(message.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// The top-level wire wrapper around every event.
///
/// `seq` and `timestamp` default to 0 when a client omits them, so a
/// minimal browser client can send bare `{ "payload": { ... } }` frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Per-direction sequence number.
    #[serde(default)]
    pub seq: u64,

    /// Milliseconds since the sender's connection started.
    #[serde(default)]
    pub timestamp: u64,

    /// The event itself.
    pub payload: T,
}

// =========================================================================
// Tests
// =========================================================================
